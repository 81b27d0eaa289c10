//! Notification fan-out.
//!
//! Voicemail and call-summary notifications are fire-and-forget: delivery
//! runs on spawned tasks the turn-response path never awaits. A delivery
//! failure is logged and dropped — it is never retried and never blocks
//! call completion. At-most-once per session is enforced upstream by the
//! session store's notification flag.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::session::CollectedFields;
use crate::types::{SessionId, StaffId};

/// One outbound message payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicemailNotification {
    pub session_id: SessionId,
    pub recipient: String,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
    pub intended_staff: StaffId,
    pub reason: Option<String>,
}

/// End-of-call summary, distinct from the voicemail fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    pub session_id: SessionId,
    pub recipient: String,
    pub caller_name: Option<String>,
    pub turns: usize,
}

/// Delivery transport. Out of scope here; the engine ships a logging
/// default.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_voicemail(&self, notification: VoicemailNotification) -> anyhow::Result<()>;
    async fn send_summary(&self, summary: CallSummary) -> anyhow::Result<()>;
}

/// Default transport: logs the payload and succeeds.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_voicemail(&self, n: VoicemailNotification) -> anyhow::Result<()> {
        info!(
            "📨 voicemail for {} → {}: {:?} / {:?} / {:?}",
            n.intended_staff, n.recipient, n.caller_name, n.caller_phone, n.reason
        );
        Ok(())
    }

    async fn send_summary(&self, s: CallSummary) -> anyhow::Result<()> {
        info!("📨 call summary for session {} → {} ({} turns)", s.session_id, s.recipient, s.turns);
        Ok(())
    }
}

/// Fan a voicemail out to every recipient on background tasks.
///
/// Recipients are the tenant's default admin plus the intended staff
/// member's contact when it differs. Exactly-once is the caller's job
/// (the session flag); this function only guarantees the turn path never
/// waits on delivery.
pub fn spawn_voicemail_fanout(
    notifier: Arc<dyn Notifier>,
    session_id: SessionId,
    fields: CollectedFields,
    intended_staff: StaffId,
    recipients: Vec<String>,
) {
    for recipient in recipients {
        let notifier = notifier.clone();
        let notification = VoicemailNotification {
            session_id: session_id.clone(),
            recipient: recipient.clone(),
            caller_name: fields.name.clone(),
            caller_phone: fields.phone.clone(),
            intended_staff: intended_staff.clone(),
            reason: fields.reason.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = notifier.send_voicemail(notification).await {
                error!("Notification delivery to {} failed (not retried): {}", recipient, e);
            }
        });
    }
}

/// Spawn a call-summary delivery in the background.
pub fn spawn_summary(notifier: Arc<dyn Notifier>, summary: CallSummary) {
    let recipient = summary.recipient.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.send_summary(summary).await {
            error!("Summary delivery to {} failed (not retried): {}", recipient, e);
        }
    });
}

/// Build the recipient list: tenant admin plus intended staff contact when
/// different.
pub fn voicemail_recipients(admin_contact: &str, staff_contact: &str) -> Vec<String> {
    let mut recipients = vec![admin_contact.to_string()];
    if staff_contact != admin_contact {
        recipients.push(staff_contact.to_string());
    }
    recipients
}
