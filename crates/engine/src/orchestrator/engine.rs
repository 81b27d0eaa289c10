//! The reception engine: the top-level per-turn dispatcher.
//!
//! One engine instance serves every tenant and every live call. Each turn
//! runs through a fixed priority ladder:
//!
//! 1. Emergency signal — short-circuits everything.
//! 2. Explicit goodbye — ends the call, spawns a summary notification.
//! 3. Identity not yet collected — the identity sub-flow runs exclusively.
//! 4. Active or newly requested appointment sub-flow.
//! 5. Explicit name/email change — applied in place.
//! 6. Pending follow-up continuation — short replies against an offer.
//! 7. Default — the conversation machine (greeting/FAQ/routing/voicemail),
//!    with knowledge-base retrieval consulted for unmatched questions and
//!    the "not found" fallback owned here.
//!
//! The ordering is the contract: new tenant behavior is inserted at the
//! correct tier, never appended, or the safety tiers (1–2) could be
//! shadowed. When the machine is mid-flow in `Routing` or
//! `CollectingVoicemail` the machine owns the turn right after tier 3 —
//! the transfer-safety path must not be hijacked by appointment or
//! follow-up keywords.
//!
//! Every collaborator failure is caught here and converted to speakable
//! text. No error reaches the live call; a dropped call is the worst
//! failure mode and is prevented even at the cost of a degraded response.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use frontdesk_signal::DialOutcome;

use crate::adapters::{
    AppointmentFlow, CallControl, IdentityFlow, LoggingCallControl, NameOnlyIdentity,
    NoAppointments, NoRetrieval, Retrieval,
};
use crate::classifier::{self, Classification, Intent};
use crate::config::ReceptionConfig;
use crate::dialog::{ConversationMachine, MachineAction, MachineOutput};
use crate::error::{ReceptionError, Result};
use crate::notify::{self, CallSummary, LoggingNotifier, Notifier};
use crate::orchestrator::types::{
    DigitEvent, MediaChannelStart, TurnAction, TurnResponse, UtteranceEvent,
};
use crate::session::{ConversationState, FollowUpTopic, Session, SessionStore};
use crate::tenant::{HookRegistry, TenantProfile, TenantRegistry};
use crate::transfer::{TransferCoordinator, TransferResolution};
use crate::types::{CallLegId, SessionId, TenantId, TurnMessage};

/// Spoken when a collaborator fails and no better text exists.
const DEGRADED_FALLBACK: &str =
    "I'm sorry, I'm having a little trouble right now. Could you say that again?";

/// Spoken when the call cannot continue at all.
const APOLOGY_HANGUP: &str =
    "I'm sorry, we're unable to connect your call right now. Please try again later. Goodbye.";

/// External collaborator bundle. Defaults are inert/logging so the engine
/// runs with nothing attached.
pub struct Collaborators {
    pub call_control: Arc<dyn CallControl>,
    pub retrieval: Arc<dyn Retrieval>,
    pub appointments: Arc<dyn AppointmentFlow>,
    pub identity: Arc<dyn IdentityFlow>,
    pub notifier: Arc<dyn Notifier>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            call_control: Arc::new(LoggingCallControl),
            retrieval: Arc::new(NoRetrieval),
            appointments: Arc::new(NoAppointments),
            identity: Arc::new(NameOnlyIdentity),
            notifier: Arc::new(LoggingNotifier),
        }
    }
}

/// Snapshot counters for monitoring.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub live_sessions: usize,
    pub pending_transfers: usize,
    pub tracked_turn_locks: usize,
}

/// In-place caller-detail change requests (tier 5).
#[derive(Debug, PartialEq)]
enum ChangeRequest {
    Name(String),
    Email(String),
}

/// The per-turn orchestrator. Constructed once at process start and
/// shared by handle; there is no ambient singleton.
pub struct ReceptionEngine {
    config: ReceptionConfig,
    store: Arc<SessionStore>,
    registry: Arc<TenantRegistry>,
    hooks: HookRegistry,
    coordinator: Arc<TransferCoordinator>,
    collab: Collaborators,
    /// Per-session turn locks: a session never has two turns in flight.
    turn_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl ReceptionEngine {
    pub fn new(config: ReceptionConfig, registry: Arc<TenantRegistry>) -> Arc<Self> {
        Self::with_collaborators(config, registry, HookRegistry::new(), Collaborators::default())
    }

    pub fn with_collaborators(
        config: ReceptionConfig,
        registry: Arc<TenantRegistry>,
        hooks: HookRegistry,
        collab: Collaborators,
    ) -> Arc<Self> {
        let coordinator = Arc::new(TransferCoordinator::new(
            config.transfer.clone(),
            config.general.clone(),
            collab.call_control.clone(),
        ));
        Arc::new(Self {
            config,
            store: Arc::new(SessionStore::new()),
            registry,
            hooks,
            coordinator,
            collab,
            turn_locks: DashMap::new(),
        })
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<TransferCoordinator> {
        &self.coordinator
    }

    pub fn registry(&self) -> &Arc<TenantRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ReceptionConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            live_sessions: self.store.len(),
            pending_transfers: self.coordinator.pending_count(),
            tracked_turn_locks: self.turn_locks.len(),
        }
    }

    /// Evict sessions idle past the configured TTL, together with their
    /// turn locks and transfer bookkeeping. Sessions swept here never got
    /// a teardown event, so everything `on_call_ended` would have cleaned
    /// up has to go now. Returns the number evicted.
    pub fn sweep_idle(&self) -> usize {
        let swept = self.store.sweep(self.config.session.ttl());
        for session_id in &swept {
            self.turn_locks.remove(session_id);
            // Session keys embed the leg, so transfer bookkeeping for the
            // same call can be cleared without a reverse index.
            let leg = CallLegId(
                session_id
                    .0
                    .strip_prefix("session-")
                    .unwrap_or(&session_id.0)
                    .to_string(),
            );
            self.coordinator.clear(&leg);
        }
        swept.len()
    }

    /// A live media channel connected: greet, or resume voicemail
    /// collection on a post-transfer return.
    pub async fn on_channel_start(&self, start: MediaChannelStart) -> Result<TurnResponse> {
        let profile = match self.profile(&start.tenant_id) {
            Some(p) => p,
            None => return Ok(self.unknown_tenant(&start.tenant_id)),
        };

        let session_id = SessionId::for_leg(&start.call_leg_id);
        let lock = self.turn_lock(&session_id);
        let _guard = lock.lock().await;

        let mut session = self.store.get_or_create(&session_id, &start.tenant_id);
        if session.dialed_number.is_none() {
            session.dialed_number = start.dialed_number.clone();
        }

        let mut output = ConversationMachine::on_call_start(
            &mut session,
            &profile,
            chrono::Utc::now(),
            start.is_post_transfer_return,
        );
        if !start.is_post_transfer_return {
            let hooks = self.hooks.for_tenant(&start.tenant_id);
            output.say = output
                .say
                .into_iter()
                .map(|line| hooks.customize_greeting(&profile, &line))
                .collect();
        }

        for line in &output.say {
            session.append(TurnMessage::agent(line));
        }
        self.write_back(session);

        info!(
            "📞 Channel start: leg {} tenant {} (post_transfer={})",
            start.call_leg_id, start.tenant_id, start.is_post_transfer_return
        );
        Ok(TurnResponse::speak(output.say))
    }

    /// One transcribed caller utterance. Turns for one session are
    /// strictly serialized; the response is computed and appended to
    /// history before the next turn can begin.
    pub async fn on_utterance(&self, event: UtteranceEvent) -> Result<TurnResponse> {
        let profile = match self.profile(&event.tenant_id) {
            Some(p) => p,
            None => return Ok(self.unknown_tenant(&event.tenant_id)),
        };

        let session_id = SessionId::for_leg(&event.call_leg_id);
        let lock = self.turn_lock(&session_id);
        let _guard = lock.lock().await;

        let mut session = self.store.get_or_create(&session_id, &event.tenant_id);
        session.append(TurnMessage::caller(&event.text));

        let classification = classifier::classify(&event.text);
        debug!(
            "Turn: session {} state {:?} intent {} (q={}, conf={:.2})",
            session.id,
            session.state,
            classification.intent,
            classification.is_question,
            classification.confidence
        );

        let response = match self
            .dispatch(&mut session, &profile, &event.call_leg_id, &event.text, classification)
            .await
        {
            Ok(response) => response,
            Err(ReceptionError::TransferUnavailable(why)) => {
                // The coordinator already failed closed on the control
                // plane; mirror the apology on the media channel.
                warn!("Turn failed closed for session {}: {}", session.id, why);
                session.state = ConversationState::Completed;
                TurnResponse::hangup(vec![APOLOGY_HANGUP.to_string()])
            }
            Err(e) => {
                // No error crosses into the live call.
                error!("Turn error for session {} (degraded response): {}", session.id, e);
                TurnResponse::speak_one(DEGRADED_FALLBACK)
            }
        };

        for line in &response.say {
            session.append(TurnMessage::agent(line));
        }
        let voicemail_ready = session.fields.reason.is_some();
        let intended = session.intended_route.clone();
        self.write_back(session);

        // The fan-out claim lives in the store so a replayed final
        // collection step can never fire twice.
        if voicemail_ready && self.store.claim_notification(&session_id) {
            self.fan_out_voicemail(&session_id, &profile, intended.as_ref());
        }

        Ok(response)
    }

    /// The priority ladder. See the module docs; order is the contract.
    async fn dispatch(
        &self,
        session: &mut Session,
        profile: &TenantProfile,
        leg: &CallLegId,
        utterance: &str,
        classification: Classification,
    ) -> Result<TurnResponse> {
        // Tier 1: emergency short-circuits everything, including an
        // in-progress voicemail collection.
        if classification.intent == Intent::Emergency {
            return self.start_emergency(session, profile, leg).await;
        }

        // Tier 2: explicit goodbye.
        if classification.intent == Intent::Goodbye && !session.is_terminal() {
            return Ok(self.finish_with_summary(session, profile));
        }

        // Tier 3: identity runs exclusively until collected. Only the
        // conversational states — voicemail collection gathers its own
        // fields, and Routing is advanced externally.
        if !session.fields.identity_complete()
            && matches!(
                session.state,
                ConversationState::Greeting
                    | ConversationState::Classifying
                    | ConversationState::Answering
            )
        {
            return self.identity_turn(session, profile, utterance).await;
        }

        // Machine-owned flow states: the transfer-safety path owns the
        // turn ahead of tiers 4–6.
        if matches!(
            session.state,
            ConversationState::Routing
                | ConversationState::CollectingVoicemail(_)
                | ConversationState::Completed
        ) {
            let output = ConversationMachine::on_utterance(
                session,
                profile,
                utterance,
                classification,
                chrono::Utc::now(),
            );
            return self.apply_machine_output(session, profile, leg, output).await;
        }

        // Tier 4: appointment sub-flow.
        if session.flags.appointment_active
            || classification.intent == Intent::Appointment
            || self.collab.appointments.wants_turn(utterance)
        {
            return self.appointment_turn(session, utterance).await;
        }

        // Tier 5: explicit name/email change, applied in place.
        if let Some(change) = detect_change(utterance) {
            return self.apply_change(session, change).await;
        }

        // Tier 6: a short reply against a pending orchestrator offer.
        if session.flags.awaiting_follow_up && session.follow_up_topic == Some(FollowUpTopic::TransferOffer)
        {
            if classifier::is_affirmative(utterance) {
                session.flags.awaiting_follow_up = false;
                session.follow_up_topic = None;
                let intent = session.last_intent.unwrap_or(Intent::Unknown);
                let route = profile.route(&intent).clone();
                let output = MachineOutput {
                    say: vec![format!("Connecting you with {} now.", route.display_name)],
                    action: MachineAction::Transfer(route),
                };
                session.state = ConversationState::Routing;
                return self.apply_machine_output(session, profile, leg, output).await;
            }
            if classifier::is_negative(utterance) {
                session.flags.awaiting_follow_up = false;
                session.follow_up_topic = None;
                session.state = ConversationState::Answering;
                session.flags.awaiting_follow_up = true;
                session.follow_up_topic = Some(FollowUpTopic::AnythingElse);
                return Ok(TurnResponse::speak_one(
                    "Okay. Is there anything else I can help you with?",
                ));
            }
            // Not a short reply: fall through and treat it as a fresh
            // utterance.
            session.flags.awaiting_follow_up = false;
            session.follow_up_topic = None;
        }

        // Tier 7: default — drive the conversation machine, consulting
        // knowledge-base retrieval for questions neither the FAQ bank nor
        // a route should swallow.
        let output = ConversationMachine::on_utterance(
            session,
            profile,
            utterance,
            classification,
            chrono::Utc::now(),
        );

        if let MachineAction::Transfer(route) = &output.action {
            if classification.is_question && profile.answer(utterance).is_none() {
                match self.collab.retrieval.lookup(&profile.tenant_id, utterance).await {
                    Ok(Some(answer)) => {
                        // Retrieval knew it: answer instead of transferring.
                        session.state = ConversationState::Answering;
                        session.flags.awaiting_follow_up = true;
                        session.follow_up_topic = Some(FollowUpTopic::AnythingElse);
                        session.intended_route = None;
                        return Ok(TurnResponse::speak(vec![
                            answer,
                            "Is there anything else I can help you with?".to_string(),
                        ]));
                    }
                    Ok(None) => {
                        let mut say = vec!["I'm not sure about that one.".to_string()];
                        say.extend(output.say.clone());
                        let output = MachineOutput { say, action: MachineAction::Transfer(route.clone()) };
                        return self.apply_machine_output(session, profile, leg, output).await;
                    }
                    Err(e) => {
                        warn!("Retrieval failed (degraded to transfer): {}", e);
                    }
                }
            }
        }

        self.apply_machine_output(session, profile, leg, output).await
    }

    /// Translate a machine action into engine side effects.
    async fn apply_machine_output(
        &self,
        session: &mut Session,
        profile: &TenantProfile,
        leg: &CallLegId,
        output: MachineOutput,
    ) -> Result<TurnResponse> {
        match output.action {
            MachineAction::None => Ok(TurnResponse::speak(output.say)),
            MachineAction::EndCall => Ok(TurnResponse::hangup(output.say)),
            MachineAction::SendVoicemail => {
                // The claim itself happens after write-back in
                // `on_utterance`; here we only surface the lines.
                Ok(TurnResponse::hangup(output.say))
            }
            MachineAction::Transfer(route) => {
                session.intended_route = Some(route.clone());
                let dialed = session.dialed_number.clone().unwrap_or_default();
                self.coordinator
                    .initiate(&session.id, leg, profile, &route, &dialed, false)
                    .await?;
                Ok(TurnResponse {
                    say: output.say,
                    action: TurnAction::TransferInFlight,
                })
            }
        }
    }

    /// Tier 1: invoke the coordinator against the emergency contact.
    async fn start_emergency(
        &self,
        session: &mut Session,
        profile: &TenantProfile,
        leg: &CallLegId,
    ) -> Result<TurnResponse> {
        warn!("🚨 Emergency path for session {} (state {:?})", session.id, session.state);
        session.state = ConversationState::Routing;
        if let Ok(route) = profile.emergency() {
            session.intended_route = Some(route.clone());
        }
        let dialed = session.dialed_number.clone().unwrap_or_default();
        self.coordinator
            .emergency(&session.id, leg, profile, &dialed)
            .await?;
        Ok(TurnResponse {
            say: vec!["This sounds urgent — connecting you right now.".to_string()],
            action: TurnAction::TransferInFlight,
        })
    }

    /// Tier 2: close out and spawn the conversation-summary notification
    /// (distinct from the voicemail fan-out).
    fn finish_with_summary(&self, session: &mut Session, profile: &TenantProfile) -> TurnResponse {
        session.state = ConversationState::Completed;
        let summary = CallSummary {
            session_id: session.id.clone(),
            recipient: profile.admin_contact.clone(),
            caller_name: session.fields.name.clone(),
            turns: session.history.len(),
        };
        notify::spawn_summary(self.collab.notifier.clone(), summary);
        TurnResponse::hangup(vec!["Thanks for calling. Have a great day!".to_string()])
    }

    /// Tier 3: identity sub-flow, exclusive until complete.
    async fn identity_turn(
        &self,
        session: &mut Session,
        profile: &TenantProfile,
        utterance: &str,
    ) -> Result<TurnResponse> {
        let mut say = Vec::new();

        // Media events can outrun the channel-start signal: greet first.
        if session.state == ConversationState::Greeting {
            let greeting =
                ConversationMachine::on_call_start(session, profile, chrono::Utc::now(), false);
            say.extend(greeting.say);
        }

        match self.collab.identity.handle_turn(session, utterance).await {
            Ok(turn) => {
                if let Some(name) = turn.name {
                    session.fields.name = Some(name);
                }
                if let Some(email) = turn.email {
                    session.fields.email = Some(email);
                }
                say.push(turn.say);
                Ok(TurnResponse::speak(say))
            }
            Err(e) => {
                // Degrade: accept the call without identity rather than
                // stall it.
                warn!("Identity flow failed for session {} (waived): {}", session.id, e);
                session.fields.name = Some("Caller".to_string());
                say.push("How can I help you today?".to_string());
                Ok(TurnResponse::speak(say))
            }
        }
    }

    /// Tier 4: delegate to the appointment collaborator; a failure
    /// degrades to a transfer offer instead of an error.
    async fn appointment_turn(&self, session: &mut Session, utterance: &str) -> Result<TurnResponse> {
        match self.collab.appointments.handle_turn(session, utterance).await {
            Ok(turn) => {
                session.flags.appointment_active = turn.active;
                if !turn.active {
                    session.state = ConversationState::Answering;
                    session.flags.awaiting_follow_up = true;
                    session.follow_up_topic = Some(FollowUpTopic::AnythingElse);
                }
                Ok(TurnResponse::speak_one(turn.say))
            }
            Err(e) => {
                warn!("Appointment flow failed for session {}: {}", session.id, e);
                session.flags.appointment_active = false;
                session.flags.awaiting_follow_up = true;
                session.follow_up_topic = Some(FollowUpTopic::TransferOffer);
                session.state = ConversationState::Classifying;
                Ok(TurnResponse::speak_one(
                    "I'm having trouble with scheduling right now. \
                     Would you like me to connect you with someone instead?",
                ))
            }
        }
    }

    /// Tier 5: apply a name/email change in place and re-render any
    /// active review step.
    async fn apply_change(&self, session: &mut Session, change: ChangeRequest) -> Result<TurnResponse> {
        let confirmation = match change {
            ChangeRequest::Name(name) => {
                session.fields.name = Some(name.clone());
                format!("Got it — I've updated your name to {name}.")
            }
            ChangeRequest::Email(email) => {
                session.fields.email = Some(email.clone());
                format!("Got it — I've updated your email to {email}.")
            }
        };

        let mut say = vec![confirmation];
        if session.flags.appointment_active {
            match self.collab.appointments.rerender_review(session).await {
                Ok(Some(review)) => say.push(review),
                Ok(None) => {}
                Err(e) => warn!("Review re-render failed (skipped): {}", e),
            }
        }
        Ok(TurnResponse::speak(say))
    }

    /// A discrete in-band digit. The reserved digit preempts everything
    /// and re-invokes the coordinator against the emergency contact; all
    /// others are ignored.
    pub async fn on_digit(&self, event: DigitEvent) -> Result<TurnResponse> {
        if event.digit != self.config.general.emergency_digit {
            return Ok(TurnResponse::silent_continue());
        }

        let profile = match self.profile(&event.tenant_id) {
            Some(p) => p,
            None => return Ok(self.unknown_tenant(&event.tenant_id)),
        };

        let session_id = SessionId::for_leg(&event.call_leg_id);
        let lock = self.turn_lock(&session_id);
        let _guard = lock.lock().await;

        let mut session = self.store.get_or_create(&session_id, &event.tenant_id);
        let response = self.start_emergency(&mut session, &profile, &event.call_leg_id).await;
        match response {
            Ok(response) => {
                for line in &response.say {
                    session.append(TurnMessage::agent(line));
                }
                self.write_back(session);
                Ok(response)
            }
            Err(ReceptionError::TransferUnavailable(why)) => {
                warn!("Emergency failed closed for session {}: {}", session.id, why);
                session.state = ConversationState::Completed;
                self.write_back(session);
                Ok(TurnResponse::hangup(vec![APOLOGY_HANGUP.to_string()]))
            }
            Err(e) => Err(e),
        }
    }

    /// A dial-outcome callback from the provider. Exactly one terminal
    /// outcome advances the session out of `Routing`; duplicates are
    /// ignored by the coordinator.
    pub async fn on_dial_outcome(
        &self,
        tenant_id: &TenantId,
        leg: &CallLegId,
        outcome: DialOutcome,
    ) -> Result<TurnResponse> {
        let resolution = self.coordinator.resolve(leg, outcome.into()).await?;
        if resolution == TransferResolution::AlreadyResolved {
            // Duplicate callback, or one that lost the race with teardown.
            // Nothing to advance, and no session to resurrect.
            return Ok(TurnResponse::silent_continue());
        }

        let session_id = SessionId::for_leg(leg);
        let lock = self.turn_lock(&session_id);
        let _guard = lock.lock().await;

        let mut session = self.store.get_or_create(&session_id, tenant_id);
        match resolution {
            TransferResolution::Connected => {
                let output = ConversationMachine::on_transfer_completed(&mut session);
                for line in &output.say {
                    session.append(TurnMessage::agent(line));
                }
                self.write_back(session);
                Ok(TurnResponse::hangup(output.say))
            }
            TransferResolution::ReturnForVoicemail => {
                let route = session
                    .intended_route
                    .clone()
                    .unwrap_or_else(|| self.default_route_for(tenant_id));
                let output = ConversationMachine::on_transfer_failed(&mut session, &route);
                for line in &output.say {
                    session.append(TurnMessage::agent(line));
                }
                self.write_back(session);
                Ok(TurnResponse::speak(output.say))
            }
            TransferResolution::AlreadyResolved => Ok(TurnResponse::silent_continue()),
        }
    }

    /// Call teardown: destroy the session and attempt bookkeeping.
    pub async fn on_call_ended(&self, leg: &CallLegId) {
        let session_id = SessionId::for_leg(leg);
        self.store.remove(&session_id);
        self.coordinator.clear(leg);
        self.turn_locks.remove(&session_id);
    }

    fn fan_out_voicemail(
        &self,
        session_id: &SessionId,
        profile: &TenantProfile,
        intended: Option<&crate::tenant::RouteEntry>,
    ) {
        let Some(session) = self.store.get(session_id) else { return };
        let route = intended.unwrap_or(&profile.default_route);
        let recipients =
            notify::voicemail_recipients(&profile.admin_contact, &route.contact_address);
        info!(
            "📨 Voicemail fan-out for session {} → {} recipients",
            session_id,
            recipients.len()
        );
        notify::spawn_voicemail_fanout(
            self.collab.notifier.clone(),
            session_id.clone(),
            session.fields.clone(),
            route.staff_id.clone(),
            recipients,
        );
    }

    fn profile(&self, tenant_id: &TenantId) -> Option<Arc<TenantProfile>> {
        let profile = self.registry.get(tenant_id);
        if profile.is_none() {
            error!("No tenant profile for {}", tenant_id);
        }
        profile
    }

    fn default_route_for(&self, tenant_id: &TenantId) -> crate::tenant::RouteEntry {
        self.registry
            .get(tenant_id)
            .map(|p| p.default_route.clone())
            .unwrap_or_else(|| crate::tenant::RouteEntry {
                staff_id: crate::types::StaffId("unknown".into()),
                contact_address: String::new(),
                display_name: "our team".into(),
                advertise: false,
            })
    }

    fn unknown_tenant(&self, tenant_id: &TenantId) -> TurnResponse {
        error!("Rejecting call for unconfigured tenant {}", tenant_id);
        TurnResponse::hangup(vec![APOLOGY_HANGUP.to_string()])
    }

    fn turn_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn write_back(&self, session: Session) {
        let id = session.id.clone();
        // The per-session turn lock serializes read-modify-write, so a
        // whole-entry replace is safe here.
        self.store.update(&id, |s| *s = session);
    }
}

/// Detect an explicit in-place change request.
fn detect_change(utterance: &str) -> Option<ChangeRequest> {
    let folded = utterance.trim().to_lowercase();

    for prefix in ["change my name to ", "update my name to ", "actually my name is "] {
        if let Some(rest) = folded.strip_prefix(prefix) {
            return crate::dialog::extract::extract_name(rest).map(ChangeRequest::Name);
        }
    }

    for prefix in ["change my email to ", "update my email to ", "my email is ", "my email address is "] {
        if let Some(rest) = folded.strip_prefix(prefix) {
            let token = rest.split_whitespace().next()?.trim_matches(|c: char| c == '.' || c == ',');
            if token.contains('@') {
                return Some(ChangeRequest::Email(token.to_string()));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_detection_is_prefix_anchored() {
        assert_eq!(
            detect_change("change my name to John Smith"),
            Some(ChangeRequest::Name("John Smith".into()))
        );
        assert_eq!(
            detect_change("my email is john@example.com"),
            Some(ChangeRequest::Email("john@example.com".into()))
        );
        assert_eq!(detect_change("my email is not important"), None);
        assert_eq!(detect_change("I'd never change my name"), None);
    }
}
