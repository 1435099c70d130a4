//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! mediq-core domain logic through `DiagnosticService`.

pub mod analyze;
pub mod catalog;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use mediq_core::catalog::PromptCatalog;
use mediq_core::{DiagnosticService, HttpBackend, ServiceConfig};

/// Build the service configuration from `.env` files, the process
/// environment, and the CLI catalog override, in rising priority.
pub fn load_config(catalog_dir: Option<&str>) -> ServiceConfig {
    load_dotenv();

    let mut config = ServiceConfig::from_env();
    if let Some(dir) = catalog_dir {
        config.catalog_dir = Some(dir.to_string());
    }
    config
}

/// Build the diagnostic service over the real HTTP inference backend.
pub fn init_service(config: ServiceConfig) -> Result<Arc<DiagnosticService>, String> {
    let backend = HttpBackend::from_config(&config).map_err(|e| e.to_string())?;
    Ok(Arc::new(DiagnosticService::new(config, Arc::new(backend))))
}

/// Open the prompt catalog the way the service would, without needing
/// an API key.
pub fn open_catalog(catalog_dir: Option<&str>) -> PromptCatalog {
    PromptCatalog::new(catalog_dir.map(PathBuf::from))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Load .env and .env.local files for environment variables (API keys, etc.).
fn load_dotenv() {
    // Try .env.local first (higher priority), then .env
    for filename in &[".env.local", ".env"] {
        let path = std::path::Path::new(filename);
        if path.exists() {
            if let Ok(content) = std::fs::read_to_string(path) {
                for line in content.lines() {
                    let line = line.trim();
                    // Skip comments and empty lines
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    // Parse KEY=VALUE
                    if let Some(eq_idx) = line.find('=') {
                        let key = line[..eq_idx].trim();
                        let mut value = line[eq_idx + 1..].trim().to_string();
                        // Strip surrounding quotes
                        if (value.starts_with('"') && value.ends_with('"'))
                            || (value.starts_with('\'') && value.ends_with('\''))
                        {
                            value = value[1..value.len() - 1].to_string();
                        }
                        // Only set if not already present (existing env vars take priority)
                        if std::env::var(key).is_err() {
                            std::env::set_var(key, &value);
                        }
                    }
                }
                tracing::info!("[Cli] Loaded environment from '{}'", filename);
            }
        }
    }
}

/// Truncate a string to `max` characters for table display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
