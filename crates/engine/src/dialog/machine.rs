//! Per-tenant conversation state machine.
//!
//! One data-driven machine parameterized by the tenant profile replaces
//! any notion of per-tenant handler classes. The machine owns the
//! receptionist flow:
//!
//! ```text
//! Greeting → Classifying → { Answering ⇄ Classifying | Routing }
//!                          → [CollectingVoicemail] → Completed
//! ```
//!
//! `Routing` is advanced externally only: the transfer coordinator's
//! outcome callback calls [`ConversationMachine::on_transfer_completed`]
//! or [`ConversationMachine::on_transfer_failed`]. Everything the machine
//! returns is speakable — a turn never produces silence.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::extract;
use crate::classifier::{self, Classification, Intent};
use crate::session::{ConversationState, FollowUpTopic, Session, VoicemailStep};
use crate::tenant::{RouteEntry, TenantProfile};

/// What the orchestrator must do after a machine turn, beyond speaking.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineAction {
    /// Nothing beyond the spoken lines.
    None,
    /// Hand the caller to the transfer coordinator for this destination.
    Transfer(RouteEntry),
    /// Voicemail collection finished: fire the notification fan-out.
    SendVoicemail,
    /// Conversation is over; terminate the leg after speaking.
    EndCall,
}

/// Result of one machine turn.
#[derive(Debug, Clone)]
pub struct MachineOutput {
    pub say: Vec<String>,
    pub action: MachineAction,
}

impl MachineOutput {
    fn say_only(text: impl Into<String>) -> Self {
        Self { say: vec![text.into()], action: MachineAction::None }
    }
}

/// Stateless driver; all state lives on the session, all variation in the
/// tenant profile.
pub struct ConversationMachine;

impl ConversationMachine {
    /// Handle the start of a media channel. A fresh call gets the greeting
    /// selected by the business-hours predicate; a post-transfer return
    /// resumes directly in voicemail collection without re-greeting. The
    /// fresh-call path only applies to a session still in `Greeting`: a
    /// replayed start event for a call already mid-flow must not reset it.
    pub fn on_call_start(
        session: &mut Session,
        profile: &TenantProfile,
        now: DateTime<Utc>,
        is_post_transfer_return: bool,
    ) -> MachineOutput {
        if is_post_transfer_return {
            session.flags.post_transfer_return = true;
            session.state = ConversationState::CollectingVoicemail(VoicemailStep::Name);
            return MachineOutput::say_only(
                "I'm sorry, they weren't able to pick up. I can take a message instead. \
                 May I have your name?",
            );
        }

        if session.state != ConversationState::Greeting {
            debug!(
                "Duplicate channel start for session {} in {:?} — ignored",
                session.id, session.state
            );
            return MachineOutput { say: Vec::new(), action: MachineAction::None };
        }

        session.state = ConversationState::Classifying;
        MachineOutput::say_only(profile.greeting_at(now).to_string())
    }

    /// Drive one caller utterance through the current state.
    pub fn on_utterance(
        session: &mut Session,
        profile: &TenantProfile,
        utterance: &str,
        classification: Classification,
        now: DateTime<Utc>,
    ) -> MachineOutput {
        session.last_intent = Some(classification.intent);

        match session.state {
            ConversationState::Greeting => {
                // Media events can outrun the call-start signal. Greet,
                // advance, and process the utterance in the same turn.
                let mut output = Self::on_call_start(session, profile, now, false);
                let rest = Self::on_utterance(session, profile, utterance, classification, now);
                output.say.extend(rest.say);
                output.action = rest.action;
                output
            }
            ConversationState::Classifying => {
                Self::classify_turn(session, profile, utterance, classification)
            }
            ConversationState::Answering => {
                Self::answering_turn(session, profile, utterance, classification)
            }
            ConversationState::Routing => {
                // Advanced externally by the coordinator; hold the caller.
                MachineOutput::say_only("One moment while I connect you.")
            }
            ConversationState::CollectingVoicemail(step) => {
                Self::voicemail_turn(session, step, utterance)
            }
            ConversationState::Completed => MachineOutput::say_only(
                "Thanks again for calling. Goodbye!",
            ),
        }
    }

    /// Classifying: FAQ-answer questions, route everything else.
    fn classify_turn(
        session: &mut Session,
        profile: &TenantProfile,
        utterance: &str,
        classification: Classification,
    ) -> MachineOutput {
        if classification.is_question {
            if let Some(answer) = profile.answer(utterance) {
                debug!("FAQ hit for session {}", session.id);
                session.state = ConversationState::Answering;
                session.flags.awaiting_follow_up = true;
                session.follow_up_topic = Some(FollowUpTopic::AnythingElse);
                return MachineOutput {
                    say: vec![
                        answer.to_string(),
                        "Is there anything else I can help you with?".to_string(),
                    ],
                    action: MachineAction::None,
                };
            }
            // An unanswered question never gets a silent non-response: it
            // falls through to a transfer offer.
        }

        Self::start_transfer(session, profile, &classification.intent)
    }

    /// Answering: explicit human request and explicit negation are checked
    /// before re-classifying the new utterance.
    fn answering_turn(
        session: &mut Session,
        profile: &TenantProfile,
        utterance: &str,
        classification: Classification,
    ) -> MachineOutput {
        session.flags.awaiting_follow_up = false;
        session.follow_up_topic = None;

        if classification.intent == Intent::SpeakToHuman {
            return Self::start_transfer(session, profile, &Intent::SpeakToHuman);
        }

        if classifier::is_negative(utterance) {
            session.state = ConversationState::Completed;
            return MachineOutput {
                say: vec!["Alright, thanks for calling. Have a great day!".to_string()],
                action: MachineAction::EndCall,
            };
        }

        if classifier::is_affirmative(utterance) {
            // "Yes" against "anything else?" — invite the next request.
            session.state = ConversationState::Classifying;
            return MachineOutput::say_only("Of course — what else can I help you with?");
        }

        // A fresh utterance: re-enter classification.
        session.state = ConversationState::Classifying;
        Self::classify_turn(session, profile, utterance, classification)
    }

    /// Strictly ordered name → phone → reason acquisition. A failed
    /// extraction re-prompts without advancing.
    fn voicemail_turn(session: &mut Session, step: VoicemailStep, utterance: &str) -> MachineOutput {
        match step {
            VoicemailStep::Name => match extract::extract_name(utterance) {
                Some(name) => {
                    session.fields.name = Some(name.clone());
                    session.reprompt_count = 0;
                    session.state = ConversationState::CollectingVoicemail(VoicemailStep::Phone);
                    MachineOutput::say_only(format!(
                        "Thanks, {name}. What's the best phone number to reach you?"
                    ))
                }
                None => {
                    session.reprompt_count += 1;
                    MachineOutput::say_only(
                        "Sorry, I didn't catch that. Could you tell me your name again?",
                    )
                }
            },
            VoicemailStep::Phone => match extract::extract_phone(utterance) {
                Some(phone) => {
                    session.fields.phone = Some(phone);
                    session.reprompt_count = 0;
                    session.state = ConversationState::CollectingVoicemail(VoicemailStep::Reason);
                    MachineOutput::say_only("Got it. And what is the call regarding?")
                }
                None => {
                    session.reprompt_count += 1;
                    MachineOutput::say_only(
                        "I'm sorry, I need a ten digit phone number. What's the best number to reach you?",
                    )
                }
            },
            VoicemailStep::Reason => {
                let reason = utterance.trim();
                if reason.is_empty() {
                    session.reprompt_count += 1;
                    return MachineOutput::say_only(
                        "Could you briefly tell me what the call is about?",
                    );
                }
                session.fields.reason = Some(reason.to_string());
                session.reprompt_count = 0;
                session.state = ConversationState::Completed;
                MachineOutput {
                    say: vec![
                        "Thank you. I'll pass your message along and someone will get back to you \
                         as soon as possible. Goodbye!"
                            .to_string(),
                    ],
                    action: MachineAction::SendVoicemail,
                }
            }
        }
    }

    /// Resolve the route and hand off to the coordinator.
    fn start_transfer(
        session: &mut Session,
        profile: &TenantProfile,
        intent: &Intent,
    ) -> MachineOutput {
        let route = profile.route(intent).clone();
        session.state = ConversationState::Routing;
        MachineOutput {
            say: vec![format!("Connecting you with {} now.", route.display_name)],
            action: MachineAction::Transfer(route),
        }
    }

    /// Coordinator callback: the staff leg completed. Terminal.
    pub fn on_transfer_completed(session: &mut Session) -> MachineOutput {
        session.state = ConversationState::Completed;
        MachineOutput {
            say: vec!["You're connected now. Goodbye!".to_string()],
            action: MachineAction::EndCall,
        }
    }

    /// Coordinator callback: the staff leg was unavailable. Synthesizes
    /// the transition into voicemail collection with the canned prompt.
    pub fn on_transfer_failed(session: &mut Session, route: &RouteEntry) -> MachineOutput {
        session.flags.post_transfer_return = true;
        session.state = ConversationState::CollectingVoicemail(VoicemailStep::Name);
        MachineOutput::say_only(format!(
            "I'm sorry, {} isn't available right now. I'd be happy to take a message. \
             May I have your name?",
            route.display_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::tenant::{FaqRule, Greetings, RouteEntry};
    use crate::types::{SessionId, StaffId, TenantId};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn entry(staff: &str, display: &str) -> RouteEntry {
        RouteEntry {
            staff_id: StaffId(staff.into()),
            contact_address: "+15035550142".into(),
            display_name: display.into(),
            advertise: true,
        }
    }

    fn profile() -> TenantProfile {
        let mut routes = HashMap::new();
        routes.insert(Intent::Billing, entry("dana", "Dana in billing"));
        TenantProfile {
            tenant_id: TenantId("dental-a".into()),
            routes,
            default_route: entry("front-desk", "the front desk"),
            emergency_route: Some(entry("dr-patel", "Dr. Patel")),
            faq: vec![FaqRule {
                keywords: vec!["parking".into()],
                answer: "Free parking is available behind the building.".into(),
            }],
            hours: vec![],
            utc_offset_minutes: 0,
            greetings: Greetings {
                in_hours: "Thanks for calling!".into(),
                after_hours: "You've reached us after hours.".into(),
            },
            published_number: None,
            admin_contact: "admin@dental-a.example".into(),
        }
    }

    fn session() -> Session {
        Session::new(SessionId::new(), TenantId("dental-a".into()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    fn drive(session: &mut Session, profile: &TenantProfile, utterance: &str) -> MachineOutput {
        let c = classify(utterance);
        ConversationMachine::on_utterance(session, profile, utterance, c, now())
    }

    #[test]
    fn greeting_advances_and_processes_same_utterance() {
        let p = profile();
        let mut s = session();
        assert_eq!(s.state, ConversationState::Greeting);

        let out = drive(&mut s, &p, "do you have parking?");
        // Greeting line first, then the FAQ answer.
        assert_eq!(out.say[0], "You've reached us after hours.");
        assert!(out.say[1].contains("Free parking"));
        assert_eq!(s.state, ConversationState::Answering);
    }

    #[test]
    fn question_with_faq_match_answers_and_prompts() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Classifying;

        let out = drive(&mut s, &p, "is there parking nearby?");
        assert!(out.say[0].contains("Free parking"));
        assert!(out.say[1].contains("anything else"));
        assert_eq!(out.action, MachineAction::None);
        assert_eq!(s.state, ConversationState::Answering);
        assert!(s.flags.awaiting_follow_up);
    }

    #[test]
    fn unanswered_question_falls_through_to_transfer() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Classifying;

        let out = drive(&mut s, &p, "do you offer house calls?");
        assert_eq!(s.state, ConversationState::Routing);
        match out.action {
            MachineAction::Transfer(route) => assert_eq!(route.staff_id.0, "front-desk"),
            other => panic!("expected transfer, got {other:?}"),
        }
        assert!(out.say[0].contains("Connecting you"));
    }

    #[test]
    fn non_question_routes_by_intent() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Classifying;

        let out = drive(&mut s, &p, "I need to sort out my bill");
        match out.action {
            MachineAction::Transfer(route) => assert_eq!(route.staff_id.0, "dana"),
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn answering_negation_completes_call() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Answering;

        let out = drive(&mut s, &p, "no thanks");
        assert_eq!(s.state, ConversationState::Completed);
        assert_eq!(out.action, MachineAction::EndCall);
        assert!(!out.say.is_empty());
    }

    #[test]
    fn answering_human_request_beats_reclassification() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Answering;

        let out = drive(&mut s, &p, "can I talk to a person about parking");
        assert_eq!(s.state, ConversationState::Routing);
        assert!(matches!(out.action, MachineAction::Transfer(_)));
    }

    #[test]
    fn voicemail_collects_in_strict_order() {
        let p = profile();
        let mut s = session();
        let route = entry("dana", "Dana in billing");

        let out = ConversationMachine::on_transfer_failed(&mut s, &route);
        assert!(out.say[0].contains("isn't available"));
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Name));

        // Failed name extraction re-prompts without advancing.
        let out = drive(&mut s, &p, "uh the quick brown fox jumped over everything");
        assert!(out.say[0].contains("your name"));
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Name));
        assert_eq!(s.reprompt_count, 1);

        let out = drive(&mut s, &p, "my name is John Smith");
        assert!(out.say[0].contains("John Smith"));
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Phone));

        // Bad phone re-prompts.
        let out = drive(&mut s, &p, "12345");
        assert!(out.say[0].contains("ten digit"));
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Phone));

        let _ = drive(&mut s, &p, "call me at 503-555-0199");
        assert_eq!(s.fields.phone.as_deref(), Some("(503) 555-0199"));
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Reason));

        let out = drive(&mut s, &p, "I need to reschedule my crown appointment");
        assert_eq!(out.action, MachineAction::SendVoicemail);
        assert_eq!(s.state, ConversationState::Completed);
        assert_eq!(s.fields.reason.as_deref(), Some("I need to reschedule my crown appointment"));
    }

    #[test]
    fn completed_gives_canned_closing_only() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::Completed;

        let out = drive(&mut s, &p, "hello? are you still there?");
        assert_eq!(out.action, MachineAction::None);
        assert_eq!(out.say.len(), 1);
    }

    #[test]
    fn post_transfer_return_skips_greeting() {
        let p = profile();
        let mut s = session();
        let out = ConversationMachine::on_call_start(&mut s, &p, now(), true);
        assert!(s.flags.post_transfer_return);
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Name));
        assert!(out.say[0].contains("take a message"));
    }

    #[test]
    fn replayed_call_start_does_not_reset_a_mid_flow_session() {
        let p = profile();
        let mut s = session();
        s.state = ConversationState::CollectingVoicemail(VoicemailStep::Phone);
        let out = ConversationMachine::on_call_start(&mut s, &p, now(), false);
        assert!(out.say.is_empty());
        assert_eq!(out.action, MachineAction::None);
        assert_eq!(s.state, ConversationState::CollectingVoicemail(VoicemailStep::Phone));
    }
}
