use munch_error::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::env;

const DEFAULT_PAGE_SIZE: usize = 15;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// ApiSettings for use with MunchApiClient
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub version_path: String,
    pub auth_token: Option<String>,
    pub client_version: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    /// Root that every route is joined onto, e.g. `http://localhost:8080/v1`
    pub fn base_path(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let version = self.version_path.trim_matches('/');
        if version.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, version)
        }
    }
}

/// Settings consumed by the card paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

/// MunchConfig is the primary configuration struct for the search client.
/// All values are sourced from env variables with development defaults.
#[derive(Debug, Clone)]
pub struct MunchConfig {
    pub app_name: String,
    pub app_env: String,
    pub app_version: String,
    pub munch_api_url: String,
    pub munch_api_version_path: String,
    pub munch_api_token: Option<String>,
    pub munch_page_size: usize,
    pub munch_timeout_secs: u64,
    pub munch_log_level: String,
    pub munch_log_json: bool,
}

impl Default for MunchConfig {
    fn default() -> Self {
        MunchConfig {
            app_name: "munch".to_string(),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            munch_api_url: env::var("MUNCH_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            munch_api_version_path: env::var("MUNCH_API_VERSION_PATH")
                .unwrap_or_else(|_| "v1".to_string()),
            munch_api_token: env::var("MUNCH_API_TOKEN").ok().filter(|t| !t.is_empty()),

            munch_page_size: env::var("MUNCH_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PAGE_SIZE),
            munch_timeout_secs: env::var("MUNCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),

            munch_log_level: env::var("MUNCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            munch_log_json: env::var("MUNCH_LOG_JSON")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }
}

impl MunchConfig {
    /// Create a new MunchConfig instance from the environment
    pub fn new() -> Self {
        MunchConfig::default()
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.munch_api_url.clone(),
            version_path: self.munch_api_version_path.clone(),
            auth_token: self.munch_api_token.clone(),
            client_version: format!("{}/{}", self.app_name, self.app_version),
            timeout_secs: self.munch_timeout_secs,
        }
    }

    pub fn search_settings(&self) -> Result<SearchSettings, SettingsError> {
        if self.munch_page_size == 0 {
            return Err(SettingsError::Error(
                "MUNCH_PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(SearchSettings {
            page_size: self.munch_page_size,
        })
    }

    /// Production always logs JSON regardless of `MUNCH_LOG_JSON`
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.munch_log_level.clone(),
            json: self.munch_log_json || self.is_production(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.trim().eq_ignore_ascii_case("production")
    }
}
