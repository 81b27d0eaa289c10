//! Events consumed and decisions emitted by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::types::{CallLegId, TenantId};

/// Tag delivered when a live media channel connects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaChannelStart {
    pub tenant_id: TenantId,
    pub call_leg_id: CallLegId,
    /// Set when this is a reconnection after a failed staff transfer. The
    /// conversation resumes in voicemail collection, not at the greeting.
    pub is_post_transfer_return: bool,
    /// The number the caller originally dialed; caller-id fallback for
    /// staff dials.
    pub dialed_number: Option<String>,
}

/// One transcribed caller utterance from the media channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtteranceEvent {
    pub tenant_id: TenantId,
    pub call_leg_id: CallLegId,
    pub text: String,
}

/// One discrete in-band digit/tone event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitEvent {
    pub tenant_id: TenantId,
    pub call_leg_id: CallLegId,
    pub digit: char,
}

/// What the media layer should do after this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAction {
    /// Speak the lines and keep listening.
    Continue,
    /// Speak the lines, then terminate the leg.
    Hangup,
    /// The caller's leg is being redirected into a staff dial; this media
    /// channel is done for now.
    TransferInFlight,
}

/// The orchestrator's decision for one turn. `say` is never empty on a
/// failure path — total silence is not acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub say: Vec<String>,
    pub action: TurnAction,
}

impl TurnResponse {
    pub fn speak(lines: Vec<String>) -> Self {
        Self { say: lines, action: TurnAction::Continue }
    }

    pub fn speak_one(line: impl Into<String>) -> Self {
        Self { say: vec![line.into()], action: TurnAction::Continue }
    }

    pub fn hangup(lines: Vec<String>) -> Self {
        Self { say: lines, action: TurnAction::Hangup }
    }

    pub fn silent_continue() -> Self {
        Self { say: Vec::new(), action: TurnAction::Continue }
    }
}
