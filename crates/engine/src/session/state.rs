//! Per-call session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Intent;
use crate::tenant::RouteEntry;
use crate::types::{SessionId, TenantId, TurnMessage, TurnRole};

/// Conversation phase of one call.
///
/// `Routing` is advanced externally only: the transfer coordinator's
/// outcome callback either completes the call or synthesizes the
/// transition into voicemail collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Greeting,
    Classifying,
    Answering,
    Routing,
    CollectingVoicemail(VoicemailStep),
    Completed,
}

/// Strictly ordered voicemail field acquisition: name, then phone, then
/// reason. A failed extraction re-prompts without advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicemailStep {
    Name,
    Phone,
    Reason,
}

/// Caller details collected over the conversation. Each stays `None`
/// until filled; a voicemail pass fills them in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectedFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub reason: Option<String>,
    pub urgency: Option<String>,
    pub email: Option<String>,
}

impl CollectedFields {
    /// Identity is considered collected once we have a name.
    pub fn identity_complete(&self) -> bool {
        self.name.is_some()
    }
}

/// Idempotence and continuation flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFlags {
    /// Set once the voicemail fan-out has fired. Guards at-most-once
    /// delivery even if the final collection step is replayed.
    pub notification_sent: bool,
    /// Set when the agent offered a choice and is waiting on a short
    /// reply ("yes", "the second one").
    pub awaiting_follow_up: bool,
    /// Set on reconnect after a failed staff transfer so the machine
    /// resumes in voicemail collection instead of re-greeting.
    pub post_transfer_return: bool,
    /// Set while the appointment sub-flow owns the conversation.
    pub appointment_active: bool,
}

/// All state for one live call. Exclusively owned by the session store;
/// mutated only through store-issued mutators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub tenant_id: TenantId,
    pub state: ConversationState,
    pub history: Vec<TurnMessage>,
    pub fields: CollectedFields,
    pub last_intent: Option<Intent>,
    pub flags: SessionFlags,
    /// What the pending follow-up offer was about, when
    /// `flags.awaiting_follow_up` is set.
    pub follow_up_topic: Option<FollowUpTopic>,
    /// Re-prompt count for the current voicemail step. Informational; the
    /// re-prompt loop is currently unbounded.
    pub reprompt_count: u32,
    /// Number the caller originally dialed; caller-id fallback.
    pub dialed_number: Option<String>,
    /// Destination of the most recent transfer attempt. Names the
    /// intended staff member in voicemail notifications.
    pub intended_route: Option<RouteEntry>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// The choice a pending follow-up reply is interpreted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpTopic {
    /// "Would you like me to connect you with someone?"
    TransferOffer,
    /// "Is there anything else I can help with?"
    AnythingElse,
}

impl Session {
    pub fn new(id: SessionId, tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            state: ConversationState::Greeting,
            history: Vec::new(),
            fields: CollectedFields::default(),
            last_intent: None,
            flags: SessionFlags::default(),
            follow_up_topic: None,
            reprompt_count: 0,
            dialed_number: None,
            intended_route: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn append(&mut self, message: TurnMessage) {
        self.last_activity = Utc::now();
        self.history.push(message);
    }

    pub fn last_caller_text(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == TurnRole::Caller)
            .map(|m| m.text.as_str())
    }

    pub fn idle_for(&self) -> chrono::Duration {
        Utc::now() - self.last_activity
    }

    pub fn is_terminal(&self) -> bool {
        self.state == ConversationState::Completed
    }
}
