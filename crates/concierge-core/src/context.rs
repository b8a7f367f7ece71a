//! Per-conversation follow-up slot and the session table that owns it.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// The single clarifying question a conversation may be waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTopic {
    #[default]
    Idle,
    /// We asked which product's covering method the user wants.
    AwaitingCoveringType,
}

/// Conversation state read and written by the cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    pending: PendingTopic,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pending(&self) -> PendingTopic {
        self.pending
    }

    #[inline]
    pub fn set_pending(&mut self, topic: PendingTopic) {
        self.pending = topic;
    }

    /// Clears the slot, returning what was pending.
    pub fn take_pending(&mut self) -> PendingTopic {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug)]
struct Session {
    context: ConversationContext,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            context: ConversationContext::new(),
            last_seen: Instant::now(),
        }
    }
}

/// Conversation contexts keyed by session id.
///
/// A session is created on first use and lives until [`SessionStore::end`] or idle eviction.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the session's context and marks the session as seen.
    ///
    /// The shard lock is held while `f` runs; `f` must not block.
    pub fn with_context<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut ConversationContext) -> R,
    ) -> R {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(target: "concierge::session", session_id, "Session opened");
                Session::new()
            });
        session.last_seen = Instant::now();
        f(&mut session.context)
    }

    /// Pending topic of a session; unknown sessions are idle.
    pub fn pending(&self, session_id: &str) -> PendingTopic {
        self.sessions
            .get(session_id)
            .map(|s| s.context.pending())
            .unwrap_or_default()
    }

    /// Discards a conversation. Returns whether it existed.
    pub fn end(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drops sessions not seen within `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_seen.elapsed() <= ttl);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(target: "concierge::session", removed, "Evicted idle sessions");
        }
        removed
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

    #[test]
    fn new_context_is_idle() {
        let mut ctx = ConversationContext::new();
        assert_eq!(ctx.pending(), PendingTopic::Idle);
        ctx.set_pending(PendingTopic::AwaitingCoveringType);
        assert_eq!(ctx.take_pending(), PendingTopic::AwaitingCoveringType);
        assert_eq!(ctx.pending(), PendingTopic::Idle);
    }

    #[test]
    fn sessions_do_not_share_pending_topic() {
        let store = SessionStore::new();
        store.with_context("alice", |ctx| ctx.set_pending(PendingTopic::AwaitingCoveringType));
        store.with_context("bob", |_| ());

        assert_eq!(store.pending("alice"), PendingTopic::AwaitingCoveringType);
        assert_eq!(store.pending("bob"), PendingTopic::Idle);
        assert_eq!(store.pending("carol"), PendingTopic::Idle);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn end_discards_session() {
        let store = SessionStore::new();
        store.with_context("s1", |ctx| ctx.set_pending(PendingTopic::AwaitingCoveringType));
        assert!(store.end("s1"));
        assert!(!store.end("s1"));
        assert_eq!(store.pending("s1"), PendingTopic::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn evict_idle_drops_only_stale_sessions() {
        let store = SessionStore::new();
        store.with_context("old", |_| ());
        std::thread::sleep(Duration::from_millis(200));
        store.with_context("fresh", |_| ());

        let removed = store.evict_idle(Duration::from_millis(100));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.evict_idle(Duration::from_secs(60)), 0);
    }
}
