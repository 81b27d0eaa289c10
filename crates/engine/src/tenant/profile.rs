//! Tenant profile: routing table, FAQ bank, business hours, greetings.
//!
//! A profile is immutable for the life of an in-flight session. Adding a
//! tenant is a configuration change, not a code change — behavior that
//! genuinely diverges beyond data goes through the hook registry instead.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::classifier::Intent;
use crate::error::{ReceptionError, Result};
use crate::types::{StaffId, TenantId};

/// One destination in the routing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub staff_id: StaffId,
    /// Dialable contact (E.164 number or SIP URI).
    pub contact_address: String,
    /// Name spoken to the caller ("connecting you with Dana in billing").
    pub display_name: String,
    /// Whether the greeting may advertise this destination.
    pub advertise: bool,
}

/// One ordered FAQ rule. Same ordered-keyword semantics as the classifier
/// but an independent rule set — FAQ patterns are per-tenant data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRule {
    pub keywords: Vec<String>,
    pub answer: String,
}

/// One weekly open window in the tenant's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursWindow {
    pub weekday: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// Greeting templates chosen by the business-hours predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greetings {
    pub in_hours: String,
    pub after_hours: String,
}

/// Everything the engine knows about one business tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantProfile {
    pub tenant_id: TenantId,
    /// Intent → destination. Intents without an explicit entry fall to
    /// `default_route`.
    pub routes: HashMap<Intent, RouteEntry>,
    /// Required: absorbs Unknown and any unmapped intent. Routing never
    /// returns "no destination".
    pub default_route: RouteEntry,
    /// Emergency destination. Missing contact here is the one transfer
    /// fault that fails closed to apology + hangup.
    pub emergency_route: Option<RouteEntry>,
    pub faq: Vec<FaqRule>,
    pub hours: Vec<HoursWindow>,
    /// Offset of the tenant's local clock from UTC, in minutes.
    pub utc_offset_minutes: i32,
    pub greetings: Greetings,
    /// Number presented as caller-id on staff dials; falls back to the
    /// originally dialed number when absent.
    pub published_number: Option<String>,
    /// Default admin recipient for voicemail and summary notifications.
    pub admin_contact: String,
}

impl TenantProfile {
    /// Resolve an intent to a destination. Explicit mapping if present,
    /// else the tenant default — never absent.
    pub fn route(&self, intent: &Intent) -> &RouteEntry {
        self.routes.get(intent).unwrap_or(&self.default_route)
    }

    /// Emergency destination, or a `TransferUnavailable` error when the
    /// tenant never configured one.
    pub fn emergency(&self) -> Result<&RouteEntry> {
        self.emergency_route.as_ref().ok_or_else(|| {
            ReceptionError::TransferUnavailable(format!(
                "tenant {} has no emergency contact configured",
                self.tenant_id
            ))
        })
    }

    /// Ordered-keyword FAQ lookup. First rule with any keyword contained
    /// in the case-folded utterance wins.
    pub fn answer(&self, utterance: &str) -> Option<&str> {
        let folded = utterance.trim().to_lowercase();
        if folded.is_empty() {
            return None;
        }
        self.faq
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| folded.contains(kw.as_str())))
            .map(|rule| rule.answer.as_str())
    }

    /// Business-hours predicate: is the tenant open at this instant?
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        let offset = match FixedOffset::east_opt(self.utc_offset_minutes * 60) {
            Some(o) => o,
            None => return false,
        };
        let local = at.with_timezone(&offset);
        let weekday = local.weekday();
        let time = local.time();
        self.hours
            .iter()
            .any(|w| w.weekday == weekday && time >= w.open && time < w.close)
    }

    /// Greeting selected by the business-hours predicate.
    pub fn greeting_at(&self, at: DateTime<Utc>) -> &str {
        if self.is_open_at(at) {
            &self.greetings.in_hours
        } else {
            &self.greetings.after_hours
        }
    }

    /// Caller-id for an outbound staff dial: the tenant's published number
    /// when set, else the number the caller originally dialed.
    pub fn caller_id_for(&self, dialed_number: &str) -> String {
        self.published_number
            .clone()
            .unwrap_or_else(|| dialed_number.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(staff: &str) -> RouteEntry {
        RouteEntry {
            staff_id: StaffId(staff.into()),
            contact_address: format!("+1503555{:04}", staff.len()),
            display_name: staff.to_string(),
            advertise: true,
        }
    }

    fn profile() -> TenantProfile {
        let mut routes = HashMap::new();
        routes.insert(Intent::Billing, entry("dana"));
        TenantProfile {
            tenant_id: TenantId("dental-a".into()),
            routes,
            default_route: entry("front-desk"),
            emergency_route: Some(entry("dr-patel")),
            faq: vec![
                FaqRule {
                    keywords: vec!["parking".into()],
                    answer: "Free parking is available behind the building.".into(),
                },
                FaqRule {
                    keywords: vec!["insurance".into(), "accept".into()],
                    answer: "We accept most major insurance plans.".into(),
                },
            ],
            hours: vec![HoursWindow {
                weekday: Weekday::Mon,
                open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            }],
            utc_offset_minutes: 0,
            greetings: Greetings {
                in_hours: "Thanks for calling, how can I help?".into(),
                after_hours: "You've reached us after hours.".into(),
            },
            published_number: None,
            admin_contact: "admin@dental-a.example".into(),
        }
    }

    #[test]
    fn route_falls_back_to_default_never_none() {
        let p = profile();
        assert_eq!(p.route(&Intent::Billing).staff_id.0, "dana");
        assert_eq!(p.route(&Intent::Unknown).staff_id.0, "front-desk");
        assert_eq!(p.route(&Intent::Sales).staff_id.0, "front-desk");
    }

    #[test]
    fn faq_first_match_wins() {
        let p = profile();
        assert_eq!(
            p.answer("do you have parking and do you accept insurance"),
            Some("Free parking is available behind the building.")
        );
        assert!(p.answer("do you do house calls").is_none());
        assert!(p.answer("").is_none());
    }

    #[test]
    fn hours_predicate_selects_greeting() {
        let p = profile();
        // Monday 2024-01-01 10:00 UTC is inside the window.
        let open = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert!(p.is_open_at(open));
        assert_eq!(p.greeting_at(open), "Thanks for calling, how can I help?");

        // Monday 20:00 is after close; Tuesday has no window at all.
        let evening = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert!(!p.is_open_at(evening));
        let tuesday = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        assert_eq!(p.greeting_at(tuesday), "You've reached us after hours.");
    }

    #[test]
    fn hours_respect_tenant_offset() {
        let mut p = profile();
        // UTC-8: Monday 18:00 UTC is Monday 10:00 local — open.
        p.utc_offset_minutes = -8 * 60;
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        assert!(p.is_open_at(at));
        // Monday 02:00 UTC is Sunday 18:00 local — closed.
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert!(!p.is_open_at(at));
    }

    #[test]
    fn caller_id_prefers_published_number() {
        let mut p = profile();
        assert_eq!(p.caller_id_for("+15035550111"), "+15035550111");
        p.published_number = Some("+15035550100".into());
        assert_eq!(p.caller_id_for("+15035550111"), "+15035550100");
    }
}
