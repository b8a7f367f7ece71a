//! concierge-core: FAQ intent resolution (knowledge base, rule cascade, session context, answers).
//!
//! Transport-free: the gateway add-on and the fallback responders in concierge-skills build on
//! the public API re-exported here.

mod cascade;
mod compose;
mod context;
mod knowledge;
mod matcher;
mod normalize;
mod orchestrator;
mod shared;

// Shared configuration
pub use shared::{CoreConfig, MatchThresholds};

// Input normalization and edit-distance matching
pub use matcher::{best_match, candidates, edit_distance, BestMatch, Candidate};
pub use normalize::normalize;

// Knowledge base
pub use knowledge::{
    Category, CategoryKind, CategoryStatus, KnowledgeBase, KnowledgeEntry, KnowledgeLoadError,
    Question, CATEGORY_LABELS,
};

// Conversation state
pub use context::{ConversationContext, PendingTopic, SessionStore};

// Answers
pub use compose::{
    summarize, FixedRemark, RandomRemark, RemarkChooser, Resolution, ResolvedAnswer, VideoEmbed,
    BIZ_CLOSING_REMARKS, BIZ_PROMPT, COVERING_PROMPT, COVER_REPLACEMENT_ANSWER,
    HISTORY_SUMMARY_CHARS, INTERNAL_ERROR_TEXT, NO_MATCH_TEXT, SERVICE_UNAVAILABLE_TEXT,
    SIZE_PROMPT,
};

// Cascade and request orchestration
pub use cascade::{IntentEngine, Stage};
pub use orchestrator::{Concierge, FallbackError, FallbackResponder};
