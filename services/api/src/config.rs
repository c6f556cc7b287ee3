//! Server configuration
//!
//! Read from the process environment through the `config` crate, e.g.
//! `PORT=8080 CORS_ORIGINS=https://blog.example.com,*.vercel.app`.

use anyhow::Result;
use serde::Deserialize;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed browser origins; an entry like `*.vercel.app` matches any subdomain
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Deployment environment (default: "development")
    #[serde(default = "default_app_env")]
    pub app_env: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            app_env: default_app_env(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: Interface to bind (default: "0.0.0.0")
    /// - `PORT`: Port to listen on (default: 5000)
    /// - `CORS_ORIGINS`: Comma separated allowed origins (default: "http://localhost:3000")
    /// - `APP_ENV`: Deployment environment (default: "development")
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?;

        let mut server_config: ServerConfig = settings.try_deserialize()?;
        server_config.cors_origins = server_config
            .cors_origins
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(server_config)
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Whether a request origin is allowed by the configured list
pub fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    allowed.iter().any(|entry| match entry.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => origin.ends_with(suffix),
        _ => entry == origin,
    })
}
