//! Shared identifier and message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session ID type — one per live call.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("session-{}", uuid::Uuid::new_v4()))
    }

    /// One live session per call leg: signaling callbacks that only know
    /// the leg can always re-derive the session key.
    pub fn for_leg(leg: &CallLegId) -> Self {
        Self(format!("session-{}", leg.0))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant ID type — one per business account.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Call leg ID type — one live telephony connection, addressable for
/// transfer and outcome actions.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallLegId(pub String);

impl CallLegId {
    pub fn new() -> Self {
        Self(format!("leg-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for CallLegId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staff member ID within a tenant.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct StaffId(pub String);

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Caller,
    Agent,
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TurnMessage {
    pub fn caller(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Caller, text: text.into(), timestamp: Utc::now() }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Agent, text: text.into(), timestamp: Utc::now() }
    }
}
