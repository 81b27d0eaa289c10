//! Collaborator traits.
//!
//! Everything the engine needs from the outside world comes through these
//! object-safe traits: the telephony control plane, knowledge-base
//! retrieval, and the identity and appointment sub-flows. The engine ships
//! inert or logging defaults so it runs (and tests) with no external
//! systems attached. Failures crossing these seams are caught at the
//! orchestrator boundary and converted to speakable fallbacks.

use async_trait::async_trait;
use tracing::{debug, info};

use frontdesk_signal::DialPlan;

use crate::dialog::extract;
use crate::session::Session;
use crate::types::{CallLegId, TenantId};

/// Control-plane operations on live call legs.
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Redirect the caller's active leg into the staff dial described by
    /// the plan. The provider reports the outcome to the plan's callback.
    async fn redirect_to_dial(&self, leg: &CallLegId, plan: DialPlan) -> anyhow::Result<()>;

    /// Re-establish the caller's media connection to the agent. When
    /// `post_transfer_return` is set the new channel is tagged so the
    /// conversation resumes in voicemail collection, not at the greeting.
    async fn reconnect_to_agent(&self, leg: &CallLegId, post_transfer_return: bool) -> anyhow::Result<()>;

    /// Speak a final line and terminate the leg. The fail-closed exit.
    async fn say_and_hangup(&self, leg: &CallLegId, text: &str) -> anyhow::Result<()>;
}

/// Knowledge-base retrieval. The engine owns only the decision to call it
/// and the "not found" fallback text.
#[async_trait]
pub trait Retrieval: Send + Sync {
    async fn lookup(&self, tenant_id: &TenantId, question: &str) -> anyhow::Result<Option<String>>;
}

/// One turn of an owned sub-flow.
#[derive(Debug, Clone)]
pub struct SubFlowTurn {
    pub say: String,
    /// `false` once the sub-flow has released the conversation.
    pub active: bool,
}

/// External appointment-booking sub-flow.
#[async_trait]
pub trait AppointmentFlow: Send + Sync {
    /// Whether this utterance should start the sub-flow.
    fn wants_turn(&self, utterance: &str) -> bool;

    async fn handle_turn(&self, session: &Session, utterance: &str) -> anyhow::Result<SubFlowTurn>;

    /// Re-render the active review step after an in-place identity change.
    async fn rerender_review(&self, session: &Session) -> anyhow::Result<Option<String>>;
}

/// Result of one identity-collection turn.
#[derive(Debug, Clone)]
pub struct IdentityTurn {
    pub say: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub complete: bool,
}

/// Identity-collection sub-flow. Runs exclusively until complete.
#[async_trait]
pub trait IdentityFlow: Send + Sync {
    async fn handle_turn(&self, session: &Session, utterance: &str) -> anyhow::Result<IdentityTurn>;
}

/// Logging no-op control plane for tests and dry runs.
pub struct LoggingCallControl;

#[async_trait]
impl CallControl for LoggingCallControl {
    async fn redirect_to_dial(&self, leg: &CallLegId, plan: DialPlan) -> anyhow::Result<()> {
        info!("🔄 [dry-run] redirect {} → dial {} (timeout {}s)", leg, plan.staff_number(), plan.timeout_secs());
        Ok(())
    }

    async fn reconnect_to_agent(&self, leg: &CallLegId, post_transfer_return: bool) -> anyhow::Result<()> {
        info!("🔙 [dry-run] reconnect {} to agent (post_transfer={})", leg, post_transfer_return);
        Ok(())
    }

    async fn say_and_hangup(&self, leg: &CallLegId, text: &str) -> anyhow::Result<()> {
        info!("📴 [dry-run] say+hangup {}: {}", leg, text);
        Ok(())
    }
}

/// Retrieval stub that never finds anything, forcing the fallback text.
pub struct NoRetrieval;

#[async_trait]
impl Retrieval for NoRetrieval {
    async fn lookup(&self, _tenant_id: &TenantId, question: &str) -> anyhow::Result<Option<String>> {
        debug!("Retrieval disabled; no answer for '{}'", question);
        Ok(None)
    }
}

/// Appointment stub: never claims a turn.
pub struct NoAppointments;

#[async_trait]
impl AppointmentFlow for NoAppointments {
    fn wants_turn(&self, _utterance: &str) -> bool {
        false
    }

    async fn handle_turn(&self, _session: &Session, _utterance: &str) -> anyhow::Result<SubFlowTurn> {
        Ok(SubFlowTurn { say: "I'm not able to book appointments right now.".into(), active: false })
    }

    async fn rerender_review(&self, _session: &Session) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// Built-in identity flow: asks for and extracts a name with the same
/// heuristics voicemail collection uses.
pub struct NameOnlyIdentity;

#[async_trait]
impl IdentityFlow for NameOnlyIdentity {
    async fn handle_turn(&self, _session: &Session, utterance: &str) -> anyhow::Result<IdentityTurn> {
        match extract::extract_name(utterance) {
            Some(name) => Ok(IdentityTurn {
                say: format!("Thanks, {name}! How can I help you today?"),
                name: Some(name),
                email: None,
                complete: true,
            }),
            None => Ok(IdentityTurn {
                say: "Before we get started, may I have your name?".into(),
                name: None,
                email: None,
                complete: false,
            }),
        }
    }
}
