//! Engine configuration loaded with Figment
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `kanban-sync.toml`, `kanban-sync.yaml`, `kanban-sync.json` in the config directory
//! 3. `KANBAN_SYNC_*` environment variables

use crate::error::Result;
use crate::types::ClientId;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "KANBAN_SYNC_";

/// Base name of config files
pub const CONFIG_FILE_STEM: &str = "kanban-sync";

/// Tunables for one client of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Identity stamped on outbound messages; echoes are recognized by it
    pub client_id: ClientId,
    /// Quiet period before a search-term edit re-projects the board
    pub search_debounce_ms: u64,
    /// Reconnect attempts before the board goes out of sync
    pub max_reconnect_attempts: u32,
    /// Delay after the first failed reconnect; doubles per attempt
    pub reconnect_backoff_ms: u64,
    /// Activity entries kept in memory
    pub activity_log_limit: usize,
    /// Where saved templates are written, if anywhere
    pub template_dir: Option<PathBuf>,
    /// Refuse dependency edges that would close a cycle
    pub reject_dependency_cycles: bool,
    /// `tracing-subscriber` env-filter directive
    pub log_filter: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            client_id: ClientId::new(),
            search_debounce_ms: 300,
            max_reconnect_attempts: 5,
            reconnect_backoff_ms: 250,
            activity_log_limit: 500,
            template_dir: None,
            reject_dependency_cycles: false,
            log_filter: "info".to_string(),
        }
    }
}

impl SyncConfig {
    /// Load from the current directory and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load using config files found in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config: Self = Self::figment(dir).extract().map_err(Box::new)?;
        debug!(client = %config.client_id, "loaded sync config");
        Ok(config)
    }

    /// The layered provider stack, exposed so callers can merge more sources
    pub fn figment(dir: &Path) -> Figment {
        let file = |ext: &str| dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file("toml")))
            .merge(Yaml::file(file("yaml")))
            .merge(Json::file(file("json")))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}
