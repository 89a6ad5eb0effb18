//! Runtime configuration for the engine.
//!
//! Configuration is small and process-local: everything has a sensible
//! default and can be overridden through `BOUGH_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Quiet window before a burst of filesystem events collapses into a
/// single reload.
pub const DEFAULT_WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Remote used when an operation does not name one.
pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for ssh private keys when the agent offers none.
    pub ssh_dir: Option<PathBuf>,
    pub watch_debounce: Duration,
    pub default_remote: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssh_dir: dirs::home_dir().map(|home| home.join(".ssh")),
            watch_debounce: DEFAULT_WATCH_DEBOUNCE,
            default_remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

/// Defaults plus environment overrides.
pub fn load() -> Config {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    config
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_env_overrides_inner(config, |key| std::env::var(key).ok());
}

fn apply_env_overrides_inner<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("BOUGH_SSH_DIR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.ssh_dir = Some(PathBuf::from(trimmed));
        }
    }

    if let Some(raw) = lookup("BOUGH_WATCH_DEBOUNCE_MS") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u64>() {
                Ok(ms) => {
                    config.watch_debounce = Duration::from_millis(ms);
                }
                Err(err) => {
                    tracing::warn!("invalid BOUGH_WATCH_DEBOUNCE_MS, ignoring: {err}");
                }
            }
        }
    }

    if let Some(raw) = lookup("BOUGH_DEFAULT_REMOTE") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.default_remote = trimmed.to_string();
        }
    }
}
