//! Server configuration from the environment

use crate::llm::LlmConfig;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var("BACKROOMS_DB_PATH").map_or_else(
            |_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".backrooms").join("backrooms.db")
            },
            PathBuf::from,
        );

        Self {
            port: parse_port(std::env::var("BACKROOMS_PORT").ok().as_deref()),
            db_path,
            llm: LlmConfig::from_env(),
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
