use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
            session: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.is_authenticated())
            .unwrap_or(false)
    }
}
