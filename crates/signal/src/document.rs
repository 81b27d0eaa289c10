//! Signal documents and the dial-plan builder.
//!
//! A [`SignalDocument`] is the declarative answer to one call-control event.
//! Verbs execute top to bottom; the call ends when the document runs out of
//! verbs unless a `Dial` or `Redirect` hands control elsewhere.

use serde::{Deserialize, Serialize};

/// One instruction to the telephony provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Verb {
    /// Speak text to the connected party.
    Say {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        voice: Option<String>,
    },
    /// Dial an outbound leg and bridge it to the caller. The provider
    /// reports the leg's terminal status to `action_url` as callback
    /// parameters (see [`crate::outcome::DialOutcome`]).
    Dial {
        number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caller_id: Option<String>,
        timeout_secs: u32,
        action_url: String,
    },
    /// Hand the call to another control URL.
    Redirect { url: String },
    /// Pause before the next verb.
    Pause { secs: u32 },
    /// Terminate the call leg.
    Hangup,
}

/// An ordered list of verbs answering one control event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalDocument {
    verbs: Vec<Verb>,
}

impl SignalDocument {
    pub fn new() -> Self {
        Self { verbs: Vec::new() }
    }

    /// Document that speaks one line and hangs up. This is the fail-closed
    /// shape: a spoken apology, never an indefinite hold.
    pub fn say_and_hangup(text: impl Into<String>) -> Self {
        Self {
            verbs: vec![
                Verb::Say { text: text.into(), voice: None },
                Verb::Hangup,
            ],
        }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say { text: text.into(), voice: None });
        self
    }

    pub fn pause(mut self, secs: u32) -> Self {
        self.verbs.push(Verb::Pause { secs });
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect { url: url.into() });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn push(&mut self, verb: Verb) {
        self.verbs.push(verb);
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

/// Builder for the transfer document.
///
/// Constructed from exactly the four values a stateless control endpoint
/// has on hand: tenant id, staff number, ring timeout, callback URL. The
/// tenant id is carried into the callback URL as a query parameter so the
/// outcome handler needs no session lookup to find its way back.
#[derive(Debug, Clone)]
pub struct DialPlan {
    tenant_id: String,
    staff_number: String,
    timeout_secs: u32,
    callback_url: String,
    caller_id: Option<String>,
    announcement: Option<String>,
    fallback_url: Option<String>,
    fallback_text: Option<String>,
}

impl DialPlan {
    /// Start a transfer plan. `callback_url` receives the dial outcome.
    pub fn transfer(
        tenant_id: impl Into<String>,
        staff_number: impl Into<String>,
        timeout_secs: u32,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            staff_number: staff_number.into(),
            timeout_secs,
            callback_url: callback_url.into(),
            caller_id: None,
            announcement: None,
            fallback_url: None,
            fallback_text: None,
        }
    }

    /// Caller-id presented on the outbound staff leg. Policy lives with the
    /// caller: tenant's published number when it has one, else the number
    /// the caller originally dialed.
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    /// Line spoken to the caller before the dial starts ringing.
    pub fn with_announcement(mut self, text: impl Into<String>) -> Self {
        self.announcement = Some(text.into());
        self
    }

    /// "else say W and redirect to URL V" — executed only if the dial verb
    /// itself never runs (provider-side rejection of the whole document).
    pub fn with_fallback(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self.fallback_url = Some(url.into());
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn staff_number(&self) -> &str {
        &self.staff_number
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    /// Callback URL with the tenant threaded through as a query parameter.
    pub fn action_url(&self) -> String {
        if self.callback_url.contains('?') {
            format!("{}&tenant={}", self.callback_url, self.tenant_id)
        } else {
            format!("{}?tenant={}", self.callback_url, self.tenant_id)
        }
    }

    /// Render the plan as a signal document.
    pub fn into_document(self) -> SignalDocument {
        let action_url = self.action_url();
        let mut doc = SignalDocument::new();
        if let Some(text) = self.announcement {
            doc.push(Verb::Say { text, voice: None });
        }
        doc.push(Verb::Dial {
            number: self.staff_number,
            caller_id: self.caller_id,
            timeout_secs: self.timeout_secs,
            action_url,
        });
        if let Some(text) = self.fallback_text {
            doc.push(Verb::Say { text, voice: None });
        }
        if let Some(url) = self.fallback_url {
            doc.push(Verb::Redirect { url });
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_plan_needs_no_session_state() {
        // Everything a control endpoint has: tenant, number, timeout, callback.
        let doc = DialPlan::transfer("t-1", "+15035550142", 30, "https://fd.example/outcome")
            .into_document();

        assert_eq!(doc.verbs().len(), 1);
        match &doc.verbs()[0] {
            Verb::Dial { number, timeout_secs, action_url, caller_id } => {
                assert_eq!(number, "+15035550142");
                assert_eq!(*timeout_secs, 30);
                assert_eq!(action_url, "https://fd.example/outcome?tenant=t-1");
                assert!(caller_id.is_none());
            }
            other => panic!("expected Dial, got {other:?}"),
        }
    }

    #[test]
    fn announcement_precedes_dial() {
        let doc = DialPlan::transfer("t-1", "+15035550142", 30, "https://fd.example/outcome")
            .with_announcement("Connecting you now.")
            .with_caller_id("+15035550100")
            .into_document();

        assert!(matches!(doc.verbs()[0], Verb::Say { .. }));
        assert!(matches!(doc.verbs()[1], Verb::Dial { .. }));
    }

    #[test]
    fn action_url_appends_to_existing_query() {
        let plan = DialPlan::transfer("t-2", "+15035550142", 25, "https://fd.example/outcome?leg=abc");
        assert_eq!(plan.action_url(), "https://fd.example/outcome?leg=abc&tenant=t-2");
    }

    #[test]
    fn say_and_hangup_is_terminal() {
        let doc = SignalDocument::say_and_hangup("We are unable to connect your call. Goodbye.");
        assert_eq!(doc.verbs().len(), 2);
        assert!(matches!(doc.verbs()[1], Verb::Hangup));
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = DialPlan::transfer("t-1", "+15035550142", 30, "https://fd.example/outcome")
            .with_fallback("One moment.", "https://fd.example/voicemail")
            .into_document();

        let json = serde_json::to_string(&doc).unwrap();
        let back: SignalDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
