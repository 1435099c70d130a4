//! Process-wide service settings, read once from the environment.
//!
//! Mirrors the layered env lookup used elsewhere in the crate: explicit
//! `MEDIQ_*` variables first, provider-convention fallbacks second, then
//! built-in defaults. The struct is constructed once at startup and passed
//! by reference into the facade and pipeline constructors — never stored in
//! a global.

use serde::{Deserialize, Serialize};

/// Static settings shared by every pipeline run in the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Model identity passed to the inference backend.
    pub model: String,

    /// API key for the inference backend (`MEDIQ_API_KEY`, falling back to
    /// `OPENAI_API_KEY`). Absent keys only fail once a real HTTP backend is
    /// constructed — catalog and offline tooling work without one.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,

    /// Global agent-invocation ceiling, requests per minute. `0` disables
    /// the ceiling.
    pub max_rpm: u32,

    /// Verbose pipeline logging.
    pub verbose: bool,

    /// Whether agents carry a per-run memory scope.
    pub memory: bool,

    /// Explicit catalog directory; `None` means default search paths plus
    /// built-in fallbacks.
    pub catalog_dir: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            max_rpm: 10,
            verbose: true,
            memory: true,
            catalog_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Read settings from the environment, applying defaults for anything
    /// unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model: std::env::var("MEDIQ_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("MEDIQ_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("MEDIQ_BASE_URL").unwrap_or(defaults.base_url),
            max_rpm: env_u32("MEDIQ_MAX_RPM", defaults.max_rpm),
            verbose: env_bool("MEDIQ_VERBOSE", defaults.verbose),
            memory: env_bool("MEDIQ_MEMORY", defaults.memory),
            catalog_dir: std::env::var("MEDIQ_CATALOG_DIR")
                .ok()
                .filter(|d| !d.is_empty()),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}
