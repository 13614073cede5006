//! Database connection configuration handed to a controller at install time.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection parameters for the tablet's backing database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbConfigs {
    /// Database name the tablet serves
    #[serde(default)]
    pub db_name: String,
    /// Unix socket path, preferred over host/port when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub charset: String,
}

impl DbConfigs {
    pub fn new(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            ..Self::default()
        }
    }
}
