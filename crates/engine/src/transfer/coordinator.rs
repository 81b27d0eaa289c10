//! Call transfer coordinator.
//!
//! Owns the transfer protocol: INITIATE a staff dial with a bounded ring
//! timeout, AWAIT exactly one terminal outcome, and guarantee the caller
//! always ends either connected to staff or safely back with the agent for
//! voicemail — never silently dropped.
//!
//! Three legs fail independently here (caller connection, staff dial,
//! agent reconnection), so the coordinator is defensive in both
//! directions: a duplicate outcome is ignored (first writer wins), and a
//! *missing* outcome is manufactured by a local watchdog that resolves the
//! attempt no-answer shortly after the ring timeout. The provider callback
//! always wins when it arrives first.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use frontdesk_signal::DialPlan;

use super::types::{AttemptOutcome, TransferAttempt, TransferResolution};
use crate::adapters::CallControl;
use crate::config::{GeneralConfig, TransferConfig};
use crate::error::{ReceptionError, Result};
use crate::tenant::{RouteEntry, TenantProfile};
use crate::types::{CallLegId, SessionId};

/// Coordinates staff transfers for all live calls.
pub struct TransferCoordinator {
    config: TransferConfig,
    general: GeneralConfig,
    call_control: Arc<dyn CallControl>,
    attempts: DashMap<CallLegId, TransferAttempt>,
}

impl TransferCoordinator {
    pub fn new(
        config: TransferConfig,
        general: GeneralConfig,
        call_control: Arc<dyn CallControl>,
    ) -> Self {
        Self {
            config,
            general,
            call_control,
            attempts: DashMap::new(),
        }
    }

    /// INITIATE: redirect the caller's leg into a staff dial with the
    /// configured ring timeout.
    ///
    /// Caller-id prefers the tenant's published number, falling back to
    /// the number the caller originally dialed. A missing contact fails
    /// closed: spoken apology, hangup, error — never an indefinite hold.
    ///
    /// Returns the watchdog handle so tests (and the server's shutdown
    /// path) can observe it; production callers drop it.
    pub async fn initiate(
        self: &Arc<Self>,
        session_id: &SessionId,
        leg: &CallLegId,
        profile: &TenantProfile,
        route: &RouteEntry,
        dialed_number: &str,
        is_emergency: bool,
    ) -> Result<JoinHandle<()>> {
        if route.contact_address.trim().is_empty() {
            return self.fail_closed(leg, "destination has no contact address").await;
        }

        let attempt_id = Uuid::new_v4();
        let attempt = TransferAttempt {
            attempt_id,
            call_leg_id: leg.clone(),
            session_id: session_id.clone(),
            staff_id: route.staff_id.clone(),
            started_at: Utc::now(),
            outcome: AttemptOutcome::Pending,
            is_emergency,
        };
        self.attempts.insert(leg.clone(), attempt);

        let plan = DialPlan::transfer(
            profile.tenant_id.0.clone(),
            route.contact_address.clone(),
            self.config.ring_timeout_secs,
            self.general.callback_base_url.clone(),
        )
        .with_caller_id(profile.caller_id_for(dialed_number));

        info!(
            "🔄 Transfer INITIATE: session {} leg {} → {} ({}){}",
            session_id,
            leg,
            route.staff_id,
            route.contact_address,
            if is_emergency { " 🚨 EMERGENCY" } else { "" }
        );

        if let Err(e) = self.call_control.redirect_to_dial(leg, plan).await {
            // The control plane itself is unreachable. Same fail-closed
            // path as a missing contact.
            self.attempts.remove(leg);
            error!("Transfer redirect failed for leg {}: {}", leg, e);
            return self.fail_closed(leg, "call control redirect failed").await;
        }

        // Watchdog: a lost callback must not strand the caller. Resolves
        // no-answer after ring timeout + grace; a real callback that
        // lands first wins and this resolution is ignored. Bound to this
        // attempt's id: if another attempt replaces this one on the same
        // leg before the deadline, the orphaned watchdog does nothing.
        let coordinator = Arc::clone(self);
        let watchdog_leg = leg.clone();
        let deadline = self.config.watchdog_deadline();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            match coordinator
                .resolve_inner(&watchdog_leg, AttemptOutcome::NoAnswer, Some(attempt_id))
                .await
            {
                Ok(TransferResolution::AlreadyResolved) => {}
                Ok(resolution) => {
                    warn!(
                        "⏱️  Watchdog resolved stranded attempt on leg {} → {:?}",
                        watchdog_leg, resolution
                    );
                }
                Err(e) => error!("Watchdog resolution failed for leg {}: {}", watchdog_leg, e),
            }
        });

        Ok(handle)
    }

    /// AWAIT_OUTCOME: apply one terminal outcome to the attempt.
    ///
    /// Exactly-once: the first terminal outcome wins; later resolutions
    /// (including the watchdog's) are logged and ignored. A callback for a
    /// leg with no attempt at all — teardown or the sweep got there
    /// first — is the same non-event as a duplicate. On any unavailable
    /// outcome the caller's media leg is re-established to the agent
    /// flagged as a post-transfer return.
    pub async fn resolve(
        &self,
        leg: &CallLegId,
        outcome: AttemptOutcome,
    ) -> Result<TransferResolution> {
        self.resolve_inner(leg, outcome, None).await
    }

    /// `expected_attempt` is the watchdog's binding: the resolution only
    /// applies while the leg's current attempt is still the one the
    /// watchdog was armed for.
    async fn resolve_inner(
        &self,
        leg: &CallLegId,
        outcome: AttemptOutcome,
        expected_attempt: Option<Uuid>,
    ) -> Result<TransferResolution> {
        debug_assert!(outcome.is_terminal());

        let attempt = {
            let Some(mut entry) = self.attempts.get_mut(leg) else {
                debug!("Outcome {:?} for leg {} with no attempt — ignored", outcome, leg);
                return Ok(TransferResolution::AlreadyResolved);
            };
            if let Some(expected) = expected_attempt {
                if entry.attempt_id != expected {
                    debug!(
                        "Stale watchdog on leg {}: attempt was replaced — ignored",
                        leg
                    );
                    return Ok(TransferResolution::AlreadyResolved);
                }
            }
            if entry.outcome.is_terminal() {
                debug!(
                    "Duplicate outcome {:?} for leg {} (already {:?}) — ignored",
                    outcome, leg, entry.outcome
                );
                return Ok(TransferResolution::AlreadyResolved);
            }
            entry.outcome = outcome;
            entry.clone()
        };

        if outcome == AttemptOutcome::Completed {
            info!(
                "✅ Transfer completed: session {} reached {}",
                attempt.session_id, attempt.staff_id
            );
            return Ok(TransferResolution::Connected);
        }

        info!(
            "↩️  Transfer unavailable ({:?}): returning session {} to the agent for voicemail",
            outcome, attempt.session_id
        );
        self.call_control
            .reconnect_to_agent(leg, true)
            .await
            .map_err(|e| {
                ReceptionError::TransferUnavailable(format!(
                    "reconnect after failed transfer also failed: {e}"
                ))
            })?;

        Ok(TransferResolution::ReturnForVoicemail)
    }

    /// Emergency preemption: abandon whatever is in flight on this leg and
    /// re-invoke the transfer against the tenant's emergency contact. The
    /// highest-priority path in the system.
    pub async fn emergency(
        self: &Arc<Self>,
        session_id: &SessionId,
        leg: &CallLegId,
        profile: &TenantProfile,
        dialed_number: &str,
    ) -> Result<JoinHandle<()>> {
        // Preempt: a pending attempt on this leg is dead to us now.
        if let Some(mut entry) = self.attempts.get_mut(leg) {
            if !entry.outcome.is_terminal() {
                warn!("🚨 Emergency preempts pending transfer on leg {}", leg);
                entry.outcome = AttemptOutcome::Failed;
            }
        }
        self.attempts.remove(leg);

        let route = profile.emergency().map(|r| r.clone());
        match route {
            Ok(route) => {
                self.initiate(session_id, leg, profile, &route, dialed_number, true)
                    .await
            }
            Err(e) => {
                error!("🚨 Emergency requested but {}", e);
                self.fail_closed(leg, "no emergency contact configured").await
            }
        }
    }

    /// Fail closed: spoken apology plus hangup. Never silence, never an
    /// indefinite hold.
    async fn fail_closed(&self, leg: &CallLegId, why: &str) -> Result<JoinHandle<()>> {
        warn!("📴 Failing closed on leg {}: {}", leg, why);
        let spoken = self
            .call_control
            .say_and_hangup(
                leg,
                "I'm sorry, we're unable to connect your call right now. \
                 Please try again later. Goodbye.",
            )
            .await;
        if let Err(e) = spoken {
            // Even the apology failed; nothing further we can do with
            // this leg, but the error must still surface.
            error!("Fail-closed hangup on leg {} also failed: {}", leg, e);
        }
        Err(ReceptionError::TransferUnavailable(why.to_string()))
    }

    /// Current attempt for a leg, if any.
    pub fn attempt(&self, leg: &CallLegId) -> Option<TransferAttempt> {
        self.attempts.get(leg).map(|a| a.clone())
    }

    /// Drop bookkeeping for a finished call leg.
    pub fn clear(&self, leg: &CallLegId) {
        self.attempts.remove(leg);
    }

    /// Evict terminal attempts older than `max_age`. Pending attempts are
    /// never swept — the watchdog owns those.
    pub fn sweep_terminal(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::hours(1));
        let stale: Vec<CallLegId> = self
            .attempts
            .iter()
            .filter(|e| e.outcome.is_terminal() && e.started_at < cutoff)
            .map(|e| e.key().clone())
            .collect();
        let count = stale.len();
        for leg in stale {
            self.attempts.remove(&leg);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|e| !e.outcome.is_terminal())
            .count()
    }
}
