//! Request-level coordination: session lookup, cascade, and escalation of unmatched input.

use crate::cascade::IntentEngine;
use crate::compose::{Resolution, ResolvedAnswer};
use crate::context::SessionStore;
use std::fmt;
use std::sync::Arc;

/// Failure of the generative fallback.
#[derive(Debug)]
pub enum FallbackError {
    /// Responder is missing a required setting (e.g. API key).
    NotConfigured(String),
    /// Request could not be sent or the response could not be read.
    Transport(Box<dyn std::error::Error + Send + Sync>),
    /// Upstream answered with a non-success status.
    Status(u16),
    /// Upstream answered without any completion text.
    EmptyCompletion,
}

impl fmt::Display for FallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackError::NotConfigured(what) => write!(f, "fallback not configured: {}", what),
            FallbackError::Transport(e) => write!(f, "fallback request failed: {}", e),
            FallbackError::Status(code) => write!(f, "fallback returned HTTP {}", code),
            FallbackError::EmptyCompletion => write!(f, "fallback returned no text"),
        }
    }
}

impl std::error::Error for FallbackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FallbackError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Generative responder consulted when no cascade stage resolves the input.
#[async_trait::async_trait]
pub trait FallbackResponder: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Produces a free-text answer to the user's message.
    async fn respond(&self, message: &str) -> Result<String, FallbackError>;
}

/// Answers chat messages: resolves them in the caller's conversation and escalates
/// unmatched ones to the fallback responder, if one is configured.
pub struct Concierge {
    engine: IntentEngine,
    sessions: Arc<SessionStore>,
    fallback: Option<Arc<dyn FallbackResponder>>,
}

impl Concierge {
    pub fn new(engine: IntentEngine, sessions: Arc<SessionStore>) -> Self {
        Self {
            engine,
            sessions,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, responder: Arc<dyn FallbackResponder>) -> Self {
        self.fallback = Some(responder);
        self
    }

    pub fn engine(&self) -> &IntentEngine {
        &self.engine
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Runs the cascade in `session_id`'s conversation without escalating.
    pub fn resolve(&self, session_id: &str, message: &str) -> Resolution {
        self.sessions
            .with_context(session_id, |ctx| self.engine.resolve(ctx, message))
    }

    /// Resolves `message`; unmatched input goes to the fallback responder, whose text replaces
    /// the answer text with every other field null. Without a responder the no-match answer is returned.
    pub async fn answer(&self, session_id: &str, message: &str) -> Result<ResolvedAnswer, FallbackError> {
        let resolution = self.resolve(session_id, message);
        let Resolution::Unmatched = resolution else {
            return Ok(resolution.into_answer());
        };
        let Some(responder) = self.fallback.as_ref() else {
            return Ok(ResolvedAnswer::no_match());
        };
        tracing::info!(
            target: "concierge::fallback",
            session_id,
            responder = responder.name(),
            "No stage matched; escalating to fallback"
        );
        let text = responder.respond(message).await.map_err(|e| {
            tracing::warn!(target: "concierge::fallback", error = %e, "Fallback failed");
            e
        })?;
        Ok(ResolvedAnswer::text_only(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{COVERING_PROMPT, NO_MATCH_TEXT};
    use crate::context::PendingTopic;
    use crate::knowledge::{CategoryKind, KnowledgeBase, KnowledgeEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoResponder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl FallbackResponder for EchoResponder {
        fn name(&self) -> &str {
            "echo"
        }

        async fn respond(&self, message: &str) -> Result<String, FallbackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("generated for: {}", message))
        }
    }

    struct FailingResponder;

    #[async_trait::async_trait]
    impl FallbackResponder for FailingResponder {
        fn name(&self) -> &str {
            "failing"
        }

        async fn respond(&self, _message: &str) -> Result<String, FallbackError> {
            Err(FallbackError::Status(503))
        }
    }

    fn concierge() -> Concierge {
        let mut kb = KnowledgeBase::default();
        kb.insert(
            CategoryKind::Covering,
            "맥스 커버링 방법을 알고 싶어",
            KnowledgeEntry {
                answer: Some("맥스 커버링 안내".into()),
                video_url: Some("https://video.example/max".into()),
                ..Default::default()
            },
        );
        Concierge::new(
            IntentEngine::new(Arc::new(kb)),
            Arc::new(SessionStore::new()),
        )
    }

    #[tokio::test]
    async fn matched_answer_skips_fallback() {
        let echo = Arc::new(EchoResponder {
            calls: AtomicUsize::new(0),
        });
        let concierge = concierge().with_fallback(echo.clone());
        let answer = concierge.answer("s1", "커버링 방법 알려줘").await.unwrap();
        assert_eq!(answer.text, COVERING_PROMPT);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_answer_uses_fallback_text_with_null_fields() {
        let echo = Arc::new(EchoResponder {
            calls: AtomicUsize::new(0),
        });
        let concierge = concierge().with_fallback(echo.clone());
        let answer = concierge.answer("s1", "zzzz qqqq wwww").await.unwrap();
        assert_eq!(answer, ResolvedAnswer::text_only("generated for: zzzz qqqq wwww"));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unmatched_without_fallback_returns_no_match_answer() {
        let answer = concierge().answer("s1", "zzzz qqqq wwww").await.unwrap();
        assert_eq!(answer.text, NO_MATCH_TEXT);
    }

    #[tokio::test]
    async fn fallback_failure_is_reported() {
        let concierge = concierge().with_fallback(Arc::new(FailingResponder));
        let err = concierge.answer("s1", "zzzz qqqq wwww").await.unwrap_err();
        assert!(matches!(err, FallbackError::Status(503)));
    }

    #[tokio::test]
    async fn follow_up_is_tracked_per_session() {
        let concierge = concierge();
        concierge.answer("alice", "커버링 방법 알려줘").await.unwrap();
        assert_eq!(concierge.sessions().pending("alice"), PendingTopic::AwaitingCoveringType);

        // Another conversation answering "맥스" is not a follow-up.
        let bob = concierge.answer("bob", "맥스").await.unwrap();
        assert_eq!(bob.text, NO_MATCH_TEXT);

        let alice = concierge.answer("alice", "맥스").await.unwrap();
        assert_eq!(alice.text, "맥스 커버링 안내");
        assert!(alice.video_html.unwrap().starts_with("<iframe width=\"560\""));
        assert_eq!(concierge.sessions().pending("alice"), PendingTopic::Idle);
    }
}
