//! # frontdesk-signal
//!
//! Declarative call-control signaling documents for the frontdesk stack.
//!
//! The telephony provider drives each call through stateless control events
//! (new call, dial outcome). Every event is answered with a [`SignalDocument`]:
//! an ordered list of verbs such as "say this text", "dial this number with a
//! ring timeout and report the outcome to this callback", or "redirect the
//! call to this URL". The document is the entire answer — the provider holds
//! no conversation state and neither does this crate.
//!
//! ## Design constraints
//!
//! - A transfer document must be producible purely from
//!   `{tenant id, staff number, timeout, callback URL}` with **no session
//!   lookup**. Outcomes are threaded back through callback parameters, not
//!   session memory. [`DialPlan`] enforces that shape.
//! - Documents serialize with serde so the transport layer (out of scope
//!   here) can render them for whichever provider is in front.
//!
//! ## Example
//!
//! ```rust
//! use frontdesk_signal::{DialPlan, SignalDocument, Verb};
//!
//! let doc = DialPlan::transfer("tenant-42", "+15035550142", 30, "https://fd.example/outcome")
//!     .with_caller_id("+15035550100")
//!     .with_announcement("Connecting you now.")
//!     .into_document();
//!
//! assert!(matches!(doc.verbs().last(), Some(Verb::Dial { .. })));
//! ```

pub mod document;
pub mod outcome;

pub use document::{DialPlan, SignalDocument, Verb};
pub use outcome::{DialOutcome, OutcomeParseError};
