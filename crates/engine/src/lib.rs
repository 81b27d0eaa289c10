//! # Frontdesk Engine
//!
//! Multi-tenant orchestration engine for an automated phone receptionist.
//! One engine instance answers calls for many business tenants: it greets
//! the caller, classifies each utterance against the tenant's routing
//! rules, answers FAQs, transfers the caller to staff with a supervised
//! ring timeout, and falls back to structured voicemail collection when
//! nobody picks up. Nothing here touches audio — a transcription/synthesis
//! layer sits in front and a telephony provider sits behind; this crate
//! owns every decision in between.
//!
//! ## Quick start
//!
//! ```no_run
//! use frontdesk_engine::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     frontdesk_engine::server::init_tracing();
//!
//!     let profiles = vec![/* TenantProfile per business */];
//!     let server = ReceptionServerBuilder::new()
//!         .with_config(ReceptionConfig::default())
//!         .with_profiles(profiles)
//!         .build()?;
//!
//!     // The signaling transport drives the engine:
//!     let engine = server.engine();
//!     let _ = engine; // engine.on_channel_start(...), engine.on_utterance(...)
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`orchestrator`] — the per-turn priority ladder; the only module that
//!   sees raw events.
//! - [`session`] — per-call state, keyed by call leg, swept on idle TTL.
//! - [`classifier`] — ordered keyword intent classification.
//! - [`tenant`] — profiles, routing tables, FAQ banks, business hours,
//!   atomic whole-table reload.
//! - [`dialog`] — the conversation state machine and field extraction.
//! - [`transfer`] — the supervised transfer protocol (initiate, await
//!   exactly one outcome, watchdog, fail closed).
//! - [`notify`] — fire-and-forget voicemail and summary fan-out.
//! - [`adapters`] — traits for the control plane and optional sub-flows.

pub mod adapters;
pub mod classifier;
pub mod config;
pub mod dialog;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod server;
pub mod session;
pub mod tenant;
pub mod transfer;
pub mod types;

pub use config::ReceptionConfig;
pub use error::{ReceptionError, Result};
pub use orchestrator::ReceptionEngine;
pub use server::{ReceptionServer, ReceptionServerBuilder};

/// Common imports for embedding the engine.
pub mod prelude {
    pub use crate::adapters::{AppointmentFlow, CallControl, IdentityFlow, Retrieval};
    pub use crate::classifier::{Classification, Intent};
    pub use crate::config::{GeneralConfig, ReceptionConfig, SessionConfig, TransferConfig};
    pub use crate::error::{ReceptionError, Result};
    pub use crate::notify::{CallSummary, Notifier, VoicemailNotification};
    pub use crate::orchestrator::{
        Collaborators, DigitEvent, MediaChannelStart, ReceptionEngine, TurnAction, TurnResponse,
        UtteranceEvent,
    };
    pub use crate::server::{ReceptionServer, ReceptionServerBuilder};
    pub use crate::session::{ConversationState, Session, SessionStore, VoicemailStep};
    pub use crate::tenant::{
        FaqRule, Greetings, HookRegistry, HoursWindow, RouteEntry, TenantHooks, TenantProfile,
        TenantRegistry,
    };
    pub use crate::transfer::{AttemptOutcome, TransferCoordinator, TransferResolution};
    pub use crate::types::{CallLegId, SessionId, StaffId, TenantId, TurnMessage, TurnRole};
    pub use frontdesk_signal::{DialOutcome, DialPlan, SignalDocument, Verb};
}
