//! Transfer attempt bookkeeping types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use frontdesk_signal::DialOutcome;

use crate::types::{CallLegId, SessionId, StaffId};

/// Lifecycle of one staff dial attempt. Created when the dial begins,
/// resolved exactly once, never persisted beyond the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAttempt {
    /// Unique per dial. A leg can carry several attempts over its
    /// lifetime (retry, emergency preemption); the id tells them apart.
    pub attempt_id: Uuid,
    pub call_leg_id: CallLegId,
    pub session_id: SessionId,
    pub staff_id: StaffId,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    /// Set when this attempt targets the tenant's emergency contact.
    pub is_emergency: bool,
}

/// Attempt status. `Pending` until the provider callback (or the local
/// watchdog) resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Pending,
    Completed,
    NoAnswer,
    Busy,
    Failed,
}

impl From<DialOutcome> for AttemptOutcome {
    fn from(outcome: DialOutcome) -> Self {
        match outcome {
            DialOutcome::Completed => AttemptOutcome::Completed,
            DialOutcome::NoAnswer => AttemptOutcome::NoAnswer,
            DialOutcome::Busy => AttemptOutcome::Busy,
            DialOutcome::Failed | DialOutcome::Canceled => AttemptOutcome::Failed,
        }
    }
}

impl AttemptOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptOutcome::Pending)
    }

    /// Every terminal outcome except `Completed` sends the caller back to
    /// the agent for voicemail.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AttemptOutcome::NoAnswer | AttemptOutcome::Busy | AttemptOutcome::Failed)
    }
}

/// What the coordinator decided after resolving an attempt. The
/// orchestrator turns this into spoken lines and state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferResolution {
    /// Staff answered; close out the call.
    Connected,
    /// Staff unavailable; the caller is being reconnected to the agent
    /// for voicemail collection.
    ReturnForVoicemail,
    /// A later (duplicate) resolution arrived for an already-resolved
    /// attempt and was ignored.
    AlreadyResolved,
}
