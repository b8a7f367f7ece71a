//! Fallback responders consulted when the intent cascade finds no answer.

pub use concierge_core::{FallbackError, FallbackResponder};

mod model_router;

pub use model_router::{LlmMode, ModelRouter, ENV_LLM_API_KEY};
