//! Tracing setup and log formatting helpers

use crate::config::SyncConfig;
use serde::Serialize;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
///
/// Returns false when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(default_filter)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// [`init_tracing`] with the configured `log_filter` as the fallback
pub fn init_tracing_from(config: &SyncConfig) -> bool {
    init_tracing(&config.log_filter)
}

fn directives(default_filter: &str) -> String {
    format!("{},kanban_sync={}", default_filter, default_filter)
}

/// Wrapper for pretty-printing values in logs as YAML
///
/// ```ignore
/// use kanban_sync::logging::Pretty;
/// tracing::debug!("applied {}", Pretty(&message));
/// ```
///
/// Debug formatting is the fallback when YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
