//! Shared configuration used across the concierge crates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Edit-distance ceilings for the approximate stages of the cascade.
/// A candidate matches when its distance is `<=` the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub goods: usize,
    pub delivery: usize,
    pub home: usize,
    /// Final pooled comparison over covering and biz entries.
    pub pooled: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            goods: 8,
            delivery: 8,
            home: 6,
            pooled: 7,
        }
    }
}

/// Global application configuration (gateway, knowledge base, fallback). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown in logs and status.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Path of the knowledge-base JSON file.
    pub knowledge_path: String,
    /// Directory served as static files at `/`.
    pub static_dir: String,
    /// If true, the gateway serves `static_dir`. (Config alias: `ui_enabled`)
    #[serde(default, alias = "ui_enabled")]
    pub frontend_enabled: bool,
    /// Fallback mode: "mock", "live" or "off".
    pub llm_mode: String,
    /// Chat-completion endpoint used in live mode.
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_system_prompt: String,
    pub llm_timeout_secs: u64,
    /// Conversations idle longer than this are discarded.
    pub session_ttl_secs: u64,
    #[serde(default)]
    pub thresholds: MatchThresholds,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `CONCIERGE_<KEY>` > `CONCIERGE_CONFIG` path
    /// (default `config/gateway.toml`) > defaults. Nested keys join with `__`, e.g. `CONCIERGE_THRESHOLDS__GOODS`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONCIERGE_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let defaults = MatchThresholds::default();
        let builder = config::Config::builder()
            .set_default("app_name", "Concierge Gateway")?
            .set_default("port", 5000_i64)?
            .set_default("knowledge_path", "./json/companyData.json")?
            .set_default("static_dir", "public")?
            .set_default("frontend_enabled", true)?
            .set_default("llm_mode", "mock")?
            .set_default("llm_api_url", "https://api.openai.com/v1/chat/completions")?
            .set_default("llm_model", "gpt-3.5-turbo")?
            .set_default(
                "llm_system_prompt",
                "You are a friendly customer support assistant for a bean bag furniture brand. Answer briefly in Korean.",
            )?
            .set_default("llm_timeout_secs", 30_i64)?
            .set_default("session_ttl_secs", 1800_i64)?
            .set_default("thresholds.goods", defaults.goods as i64)?
            .set_default("thresholds.delivery", defaults.delivery as i64)?
            .set_default("thresholds.home", defaults.home as i64)?
            .set_default("thresholds.pooled", defaults.pooled as i64)?;

        let path = Path::new(&config_path);
        let toml_path = path.with_extension("toml");
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else if toml_path.exists() {
            builder.add_source(config::File::from(toml_path.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("CONCIERGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        built.try_deserialize()
    }
}
