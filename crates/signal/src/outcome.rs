//! Dial-outcome parsing.
//!
//! When a `Dial` verb's leg terminates, the provider posts a status string
//! to the verb's `action_url`. [`DialOutcome`] is the typed form. Exactly
//! one terminal outcome arrives per attempt; everything that is not
//! `completed` means the staff member is unavailable and the caller must be
//! routed back to the agent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal status of one outbound dial attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialOutcome {
    /// Staff answered and the bridge completed.
    Completed,
    /// Rang until the timeout without an answer.
    NoAnswer,
    /// Destination was busy.
    Busy,
    /// Provider-side failure (bad number, carrier error).
    Failed,
    /// The dial was canceled before a terminal state (treated as failed).
    Canceled,
}

impl DialOutcome {
    /// `true` for every outcome that leaves the caller without staff.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, DialOutcome::Completed)
    }

    /// Parse a provider callback status string.
    pub fn parse(status: &str) -> Result<Self, OutcomeParseError> {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "answered" => Ok(DialOutcome::Completed),
            "no-answer" | "noanswer" => Ok(DialOutcome::NoAnswer),
            "busy" => Ok(DialOutcome::Busy),
            "failed" => Ok(DialOutcome::Failed),
            "canceled" | "cancelled" => Ok(DialOutcome::Canceled),
            other => Err(OutcomeParseError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for DialOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DialOutcome::Completed => "completed",
            DialOutcome::NoAnswer => "no-answer",
            DialOutcome::Busy => "busy",
            DialOutcome::Failed => "failed",
            DialOutcome::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum OutcomeParseError {
    #[error("unknown dial status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_statuses() {
        assert_eq!(DialOutcome::parse("completed").unwrap(), DialOutcome::Completed);
        assert_eq!(DialOutcome::parse("no-answer").unwrap(), DialOutcome::NoAnswer);
        assert_eq!(DialOutcome::parse("Busy").unwrap(), DialOutcome::Busy);
        assert_eq!(DialOutcome::parse(" failed ").unwrap(), DialOutcome::Failed);
        assert!(DialOutcome::parse("ringing").is_err());
    }

    #[test]
    fn only_completed_is_available() {
        assert!(!DialOutcome::Completed.is_unavailable());
        for o in [DialOutcome::NoAnswer, DialOutcome::Busy, DialOutcome::Failed, DialOutcome::Canceled] {
            assert!(o.is_unavailable(), "{o} should count as unavailable");
        }
    }
}
