//! Intent classification.
//!
//! Pure utterance → `{intent, is_question, confidence}` mapping. The rule
//! table is an ordered list of keyword sets evaluated by case-folded
//! substring containment; the first matching rule wins, ties broken by
//! declaration order, never by score. This semantics is deliberate — the
//! routing tables and test fixtures are written against literal keywords,
//! so fuzzy matching would be a behavior change, not an upgrade.
//!
//! Confidence is informational only. No branch anywhere reads its
//! magnitude; it exists for log-side tuning.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Caller intent categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Urgent situation. Routed to the tenant's emergency contact ahead
    /// of everything else.
    Emergency,
    /// Caller is wrapping up.
    Goodbye,
    /// Explicit request for a human.
    SpeakToHuman,
    Appointment,
    Billing,
    Sales,
    Support,
    Hours,
    /// No rule matched.
    Unknown,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Emergency => "emergency",
            Intent::Goodbye => "goodbye",
            Intent::SpeakToHuman => "speak_to_human",
            Intent::Appointment => "appointment",
            Intent::Billing => "billing",
            Intent::Sales => "sales",
            Intent::Support => "support",
            Intent::Hours => "hours",
            Intent::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub is_question: bool,
    /// Metadata only — no branch depends on this value.
    pub confidence: f32,
}

/// One ordered rule: any keyword hit claims the intent.
struct Rule {
    intent: Intent,
    keywords: &'static [&'static str],
    confidence: f32,
}

/// Declaration order is the tie-break. Emergency first: it must win over
/// any other keyword in the same utterance.
const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Emergency,
        keywords: &["emergency", "urgent", "911", "right away", "bleeding", "severe pain"],
        confidence: 0.95,
    },
    Rule {
        intent: Intent::Goodbye,
        keywords: &["goodbye", "good bye", "bye", "that's all", "thats all", "hang up", "thanks, that's it"],
        confidence: 0.9,
    },
    Rule {
        intent: Intent::SpeakToHuman,
        keywords: &[
            "speak to someone",
            "talk to someone",
            "speak to a person",
            "talk to a person",
            "real person",
            "a human",
            "representative",
            "receptionist",
            "front desk",
            "operator",
        ],
        confidence: 0.9,
    },
    Rule {
        intent: Intent::Appointment,
        keywords: &["appointment", "schedule", "booking", "book a", "reschedule", "cancel my"],
        confidence: 0.85,
    },
    Rule {
        intent: Intent::Billing,
        keywords: &["bill", "billing", "invoice", "payment", "charge", "insurance", "copay"],
        confidence: 0.85,
    },
    Rule {
        intent: Intent::Sales,
        keywords: &["pricing", "price", "quote", "how much", "cost", "new customer", "new patient"],
        confidence: 0.8,
    },
    Rule {
        intent: Intent::Support,
        keywords: &["help with", "problem", "issue", "not working", "broken", "question about"],
        confidence: 0.8,
    },
    Rule {
        intent: Intent::Hours,
        keywords: &["hours", "open", "closed", "what time", "holiday"],
        confidence: 0.8,
    },
];

/// Interrogative markers for the question heuristic when no rule matched.
const QUESTION_MARKERS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "can i", "can you", "do you",
    "does", "is there", "are you", "could", "would", "will you",
];

/// Domain nouns that make an unmatched utterance read like a question even
/// without an interrogative lead-in.
const DOMAIN_NOUNS: &[&str] = &["parking", "location", "address", "directions", "website", "email"];

/// Classify one utterance. Empty or whitespace input is `Unknown` — never
/// an error.
pub fn classify(utterance: &str) -> Classification {
    let folded = utterance.trim().to_lowercase();
    if folded.is_empty() {
        return Classification { intent: Intent::Unknown, is_question: false, confidence: 0.0 };
    }

    let is_question = detect_question(&folded);

    for rule in RULES {
        if rule.keywords.iter().any(|kw| folded.contains(kw)) {
            debug!("Classified '{}' as {} (q={})", utterance, rule.intent, is_question);
            return Classification {
                intent: rule.intent,
                is_question,
                confidence: rule.confidence,
            };
        }
    }

    debug!("No rule matched '{}' — unknown (q={})", utterance, is_question);
    Classification { intent: Intent::Unknown, is_question, confidence: 0.2 }
}

fn detect_question(folded: &str) -> bool {
    if folded.ends_with('?') {
        return true;
    }
    if QUESTION_MARKERS.iter().any(|m| folded.starts_with(m)) {
        return true;
    }
    DOMAIN_NOUNS.iter().any(|n| folded.contains(n))
}

/// Affirmation check for short follow-up replies.
pub fn is_affirmative(utterance: &str) -> bool {
    let folded = utterance.trim().to_lowercase();
    const YES: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay", "please", "that works", "sounds good"];
    YES.iter().any(|y| folded == *y || folded.starts_with(y))
}

/// Negation check for short follow-up replies.
pub fn is_negative(utterance: &str) -> bool {
    let folded = utterance.trim().to_lowercase();
    const NO: &[&str] = &["no", "nope", "nah", "no thanks", "no thank you", "i'm good", "im good", "nothing else"];
    NO.iter().any(|n| folded == *n || folded.starts_with(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_unknown_without_error() {
        let c = classify("");
        assert_eq!(c.intent, Intent::Unknown);
        assert!(!c.is_question);

        let c = classify("   \t ");
        assert_eq!(c.intent, Intent::Unknown);
    }

    #[test]
    fn first_match_wins_in_declaration_order() {
        // "urgent" (Emergency) and "appointment" both present; Emergency is
        // declared first so it must win regardless of keyword position.
        let c = classify("I need an appointment, it's urgent");
        assert_eq!(c.intent, Intent::Emergency);
    }

    #[test]
    fn keyword_rules_map_to_intents() {
        assert_eq!(classify("can I schedule a cleaning").intent, Intent::Appointment);
        assert_eq!(classify("question about my bill").intent, Intent::Billing);
        assert_eq!(classify("I want to talk to a person").intent, Intent::SpeakToHuman);
        assert_eq!(classify("what are your hours").intent, Intent::Hours);
    }

    #[test]
    fn unmatched_question_is_detected() {
        let c = classify("do you validate parking tickets downtown");
        assert_eq!(c.intent, Intent::Unknown);
        assert!(c.is_question);

        let c = classify("where is the office located?");
        assert!(c.is_question);
    }

    #[test]
    fn unmatched_statement_is_unknown_non_question() {
        let c = classify("blue elephants dance at midnight");
        assert_eq!(c.intent, Intent::Unknown);
        assert!(!c.is_question);
    }

    #[test]
    fn short_reply_polarity() {
        assert!(is_affirmative("yes please"));
        assert!(is_affirmative("sure"));
        assert!(is_negative("no thanks"));
        assert!(is_negative("nothing else"));
        assert!(!is_affirmative("maybe"));
        assert!(!is_negative("maybe"));
    }
}
