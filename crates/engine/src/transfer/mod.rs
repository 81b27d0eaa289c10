//! Call transfer coordination: the transfer/timeout/fallback protocol.

pub mod coordinator;
pub mod types;

pub use coordinator::TransferCoordinator;
pub use types::{AttemptOutcome, TransferAttempt, TransferResolution};
