//! Session storage.
//!
//! Keyed, TTL-evicted per-call state. Sessions never share state, so the
//! map's per-shard locking is the only synchronization needed — all writes
//! are single-writer, keyed by session id. Signaling and media events can
//! race on session existence, so lookup is get-or-create rather than an
//! error path.

use chrono::Duration as ChronoDuration;
use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::state::{ConversationState, Session};
use crate::classifier::Intent;
use crate::types::{SessionId, TenantId, TurnMessage};

/// In-memory session store. One live session per call leg.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { sessions: DashMap::new() }
    }

    /// Fetch the session for a call, lazily creating a default one. Auto-
    /// creation is deliberate: a media event may land before the signaling
    /// event that would have created the session.
    pub fn get_or_create(&self, id: &SessionId, tenant_id: &TenantId) -> Session {
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| {
                info!("📞 Created session {} for tenant {}", id, tenant_id);
                Session::new(id.clone(), tenant_id.clone())
            })
            .clone()
    }

    /// Snapshot a session without creating it.
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|s| s.clone())
    }

    pub fn append_message(&self, id: &SessionId, message: TurnMessage) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.append(message);
        }
    }

    pub fn set_state(&self, id: &SessionId, state: ConversationState) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            debug!("Session {} state {:?} -> {:?}", id, session.state, state);
            session.state = state;
            session.last_activity = chrono::Utc::now();
        }
    }

    pub fn set_last_intent(&self, id: &SessionId, intent: Intent) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.last_intent = Some(intent);
        }
    }

    /// Apply an arbitrary mutation under the entry lock. All named
    /// mutators funnel through the same per-entry locking.
    pub fn update<F>(&self, id: &SessionId, f: F)
    where
        F: FnOnce(&mut Session),
    {
        if let Some(mut session) = self.sessions.get_mut(id) {
            f(&mut session);
        }
    }

    /// Check-and-set the notification flag under the entry lock. Returns
    /// `true` exactly once per session — the fan-out idempotence guard.
    pub fn claim_notification(&self, id: &SessionId) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                if session.flags.notification_sent {
                    false
                } else {
                    session.flags.notification_sent = true;
                    true
                }
            }
            None => false,
        }
    }

    /// Destroy a session on call end.
    pub fn remove(&self, id: &SessionId) -> Option<Session> {
        let removed = self.sessions.remove(id).map(|(_, s)| s);
        if removed.is_some() {
            info!("Removed session {}", id);
        }
        removed
    }

    /// Evict sessions idle longer than `max_age`. Returns the evicted ids.
    pub fn sweep(&self, max_age: Duration) -> Vec<SessionId> {
        let max_idle = ChronoDuration::from_std(max_age)
            .unwrap_or_else(|_| ChronoDuration::seconds(i64::MAX / 1000));

        let stale: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.idle_for() > max_idle)
            .map(|entry| entry.key().clone())
            .collect();

        for id in &stale {
            self.sessions.remove(id);
            info!("⏱️  Swept idle session {}", id);
        }
        stale
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (SessionId, TenantId) {
        (SessionId::new(), TenantId("dental-a".into()))
    }

    #[test]
    fn get_or_create_is_lazy_and_stable() {
        let store = SessionStore::new();
        let (sid, tid) = ids();

        let first = store.get_or_create(&sid, &tid);
        assert_eq!(first.state, ConversationState::Greeting);

        store.set_state(&sid, ConversationState::Classifying);
        let second = store.get_or_create(&sid, &tid);
        assert_eq!(second.state, ConversationState::Classifying);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn claim_notification_fires_once() {
        let store = SessionStore::new();
        let (sid, tid) = ids();
        store.get_or_create(&sid, &tid);

        assert!(store.claim_notification(&sid));
        assert!(!store.claim_notification(&sid));
        assert!(!store.claim_notification(&sid));
    }

    #[test]
    fn sweep_evicts_only_idle_sessions() {
        let store = SessionStore::new();
        let (stale_id, tid) = ids();
        store.get_or_create(&stale_id, &tid);
        store.update(&stale_id, |s| {
            s.last_activity = chrono::Utc::now() - ChronoDuration::minutes(45);
        });

        let fresh_id = SessionId::new();
        store.get_or_create(&fresh_id, &tid);

        let swept = store.sweep(Duration::from_secs(30 * 60));
        assert_eq!(swept, vec![stale_id]);
        assert!(store.get(&fresh_id).is_some());
    }

    #[test]
    fn remove_destroys_session() {
        let store = SessionStore::new();
        let (sid, tid) = ids();
        store.get_or_create(&sid, &tid);
        assert!(store.remove(&sid).is_some());
        assert!(store.get(&sid).is_none());
        assert!(store.remove(&sid).is_none());
    }
}
