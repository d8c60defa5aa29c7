use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const CONFIG_PATH_ENV: &str = "PICKER_CONSOLE_CONFIG";
pub const DB_PATH_ENV: &str = "PICKER_CONSOLE_DB";
pub const TIMEOUT_ENV: &str = "PICKER_CONSOLE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub database_path: PathBuf,
    /// Upper bound on every single store call.
    pub request_timeout_ms: u64,
    /// Extra rounds for the failed subset of a concurrent plan.
    pub propagation_retries: u32,
}

/// Per-user data dir for the console, or the working directory when the
/// platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("picker-console"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            database_path: default_data_dir().join("picker-console.sqlite3"),
            request_timeout_ms: 10_000,
            propagation_retries: 2,
        }
    }
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Apply `PICKER_CONSOLE_DB` and `PICKER_CONSOLE_TIMEOUT_MS` if set.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            self.request_timeout_ms = raw
                .trim()
                .parse()
                .map_err(|err| anyhow!("{TIMEOUT_ENV}={raw:?} is not a number: {err}"))?;
        }
        Ok(self)
    }
}

/// Console configuration persisted as pretty JSON.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<ConsoleConfig>,
}

impl ConfigStore {
    /// Load from `path`, or start from defaults when the file does not exist.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config in {}", path.display()))?
        } else {
            ConsoleConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn config(&self) -> ConsoleConfig {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, config: ConsoleConfig) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("config lock poisoned"))?;
        self.persist(&config)?;
        *guard = config;
        Ok(())
    }

    fn persist(&self, data: &ConsoleConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }
}
