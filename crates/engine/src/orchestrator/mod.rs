//! Per-turn orchestration: event types and the engine that dispatches them.

pub mod engine;
pub mod types;

pub use engine::{Collaborators, EngineStats, ReceptionEngine};
pub use types::{DigitEvent, MediaChannelStart, TurnAction, TurnResponse, UtteranceEvent};
