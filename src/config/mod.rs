//! Configuration module for the FlowHivee service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the community service to
    pub bind_addr: SocketAddr,
    /// Path to the community message JSON file
    pub messages_path: PathBuf,
    /// Path to the SQLite file backing the key-value store
    pub state_db_path: PathBuf,
    /// Base URL of a remote community service; `None` keeps the board local
    pub community_api_base: Option<String>,
    /// Shared teacher portal password
    pub teacher_password: String,
    /// Shared admin portal password
    pub admin_password: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("FLOWHIVEE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
            .parse()
            .map_err(|e| AppError::Validation(format!("Invalid FLOWHIVEE_BIND_ADDR: {}", e)))?;

        let messages_path = env::var("FLOWHIVEE_MESSAGES_PATH")
            .unwrap_or_else(|_| "./data/community-messages.json".to_string())
            .into();

        let state_db_path = env::var("FLOWHIVEE_STATE_DB_PATH")
            .unwrap_or_else(|_| "./data/flowhivee.sqlite".to_string())
            .into();

        let community_api_base = env::var("FLOWHIVEE_COMMUNITY_API")
            .ok()
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty());

        let teacher_password =
            env::var("FLOWHIVEE_TEACHER_PASSWORD").unwrap_or_else(|_| "teacher123".to_string());
        let admin_password =
            env::var("FLOWHIVEE_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let log_level = env::var("FLOWHIVEE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            bind_addr,
            messages_path,
            state_db_path,
            community_api_base,
            teacher_password,
            admin_password,
            log_level,
        })
    }
}
