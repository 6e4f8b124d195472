use std::path::PathBuf;

use serde::Deserialize;

use foodgram_core::config::Config;

/// Foodgram service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodgramConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 secret for auth tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 8000). Env var: `FOODGRAM_PORT`.
    #[serde(default = "default_port")]
    pub foodgram_port: u16,
    /// Absolute origin used in short links, media URLs and page links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Directory uploaded images are written to.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    /// Auth token lifetime in seconds (default 30 days).
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_owned()
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_token_ttl_secs() -> u64 {
    30 * 24 * 60 * 60
}

impl Config for FoodgramConfig {}

impl FoodgramConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }
}
