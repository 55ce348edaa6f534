use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub frontend: FrontendConfig,
    pub preferences_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the external analytics backend
    pub base_url: String,
    /// Path prefix for the insights API on the backend
    pub path_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing static dashboard files.
    /// If None, no static files are served.
    pub static_dir: Option<String>,
}

impl BackendConfig {
    /// Full URL for an insights sub-path
    pub fn insights_url(&self, sub_path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path_prefix,
            sub_path.trim_start_matches('/')
        )
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid port number")?;

        let base_url = std::env::var("BACKEND_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let path_prefix =
            std::env::var("BACKEND_PATH_PREFIX").unwrap_or_else(|_| "/api/v1/insights".to_string());

        let preferences_path =
            std::env::var("PREFS_PATH").unwrap_or_else(|_| "./operlens-prefs.json".to_string());

        let static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            server: ServerConfig { host, port },
            backend: BackendConfig {
                base_url,
                path_prefix,
            },
            frontend: FrontendConfig { static_dir },
            preferences_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insights_url_joins_segments() {
        let backend = BackendConfig {
            base_url: "http://localhost:8000/".to_string(),
            path_prefix: "/api/v1/insights".to_string(),
        };
        assert_eq!(
            backend.insights_url("top-operators"),
            "http://localhost:8000/api/v1/insights/top-operators"
        );
        assert_eq!(
            backend.insights_url("/operateur/op-1"),
            "http://localhost:8000/api/v1/insights/operateur/op-1"
        );
    }
}
