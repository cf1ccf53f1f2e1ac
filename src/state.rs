// src/state.rs

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::backend::BackendClient;
use crate::errors::ConfigError;
use crate::session::SessionStore;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_IDLE_MINUTES: u64 = 480;

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub api_base: Url,
    pub api_path: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub bind_addr: SocketAddr,
    pub cookie_secure: bool,
    pub session_idle: Duration,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

impl AppConfig {
    /// Wczytuje konfigurację ze zmiennych środowiskowych (po `dotenvy::dotenv()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = Url::parse(&required("API_BASE")?).map_err(|e| invalid("API_BASE", e))?;
        let api_path = required("API_PATH")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", e))?;

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(value) => value
                .parse::<bool>()
                .map_err(|e| invalid("COOKIE_SECURE", e))?,
            Err(_) => true,
        };

        let idle_minutes = match env::var("SESSION_IDLE_MINUTES") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|e| invalid("SESSION_IDLE_MINUTES", e))?,
            Err(_) => DEFAULT_SESSION_IDLE_MINUTES,
        };

        Ok(Self {
            backend: BackendConfig {
                api_base,
                api_path: api_path.trim().to_string(),
            },
            bind_addr,
            cookie_secure,
            session_idle: Duration::from_secs(idle_minutes * 60),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            backend: BackendClient::new(&config.backend),
            sessions: SessionStore::new(config.session_idle),
            config: Arc::new(config),
        }
    }
}
