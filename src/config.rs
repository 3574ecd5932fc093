use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Game Roster
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GameRosterConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Where the roster document lives
    pub storage: StorageConfig,
    /// Administrator access
    pub admin: AdminConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:3000`
    pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON roster document
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared administrator PIN
    pub pin: String,
    /// Name of the cookie carrying the trust token
    pub cookie_name: String,
    /// PIN attempts allowed per minute for each client; 0 disables throttling
    pub login_attempts_per_minute: u32,
    /// Minutes an admin session stays valid after login
    pub session_ttl_minutes: u64,
}

impl AdminConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/db.json"),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            pin: "1234".to_string(),
            cookie_name: "admin_session".to_string(),
            login_attempts_per_minute: 10,
            session_ttl_minutes: 720,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl GameRosterConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (game-roster.toml)
    /// 3. Environment variables (prefixed with GAME_ROSTER, nested with `__`)
    /// 4. Legacy ADMIN_PIN and PORT variables
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("game-roster.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load from `path` with an explicit environment map in place of the
    /// process environment. `None` reads the real environment.
    pub fn load_with_env(path: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Values stay strings: a PIN like "0123" must not become the integer 123
        builder = builder.add_source(
            Environment::with_prefix("GAME_ROSTER")
                .prefix_separator("_")
                .separator("__")
                .source(env.clone()),
        );

        let config = builder.build()?;
        let mut game_roster_config: GameRosterConfig = config.try_deserialize()?;

        let lookup = |key: &str| match &env {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        if let Some(pin) = lookup("ADMIN_PIN").filter(|p| !p.trim().is_empty()) {
            game_roster_config.admin.pin = pin;
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            game_roster_config.server.bind_address = format!("0.0.0.0:{}", port.trim());
        }

        if game_roster_config.admin.pin.trim().is_empty() {
            bail!("admin.pin must not be empty");
        }

        Ok(game_roster_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
