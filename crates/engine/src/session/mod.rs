//! Per-call session state and the keyed, TTL-evicted store that owns it.

pub mod state;
pub mod store;

pub use state::{
    CollectedFields, ConversationState, FollowUpTopic, Session, SessionFlags, VoicemailStep,
};
pub use store::SessionStore;
