//! Conversation state machine and field-extraction heuristics.

pub mod extract;
pub mod machine;

pub use machine::{ConversationMachine, MachineAction, MachineOutput};
