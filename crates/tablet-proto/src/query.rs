//! Query-serving value types.

use serde::{Deserialize, Serialize};

use crate::topodata::TabletType;

/// Identifies what a tablet serves: keyspace, shard and tablet type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Target {
    pub keyspace: String,
    pub shard: String,
    #[serde(default)]
    pub tablet_type: TabletType,
    /// Cell the tablet lives in (empty when not known).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cell: String,
}

impl Target {
    /// Create a target without a cell
    pub fn new(keyspace: impl Into<String>, shard: impl Into<String>, tablet_type: TabletType) -> Self {
        Self {
            keyspace: keyspace.into(),
            shard: shard.into(),
            tablet_type,
            cell: String::new(),
        }
    }

    /// Set the cell
    pub fn with_cell(mut self, cell: impl Into<String>) -> Self {
        self.cell = cell.into();
        self
    }
}

/// Replication and load figures carried by a health broadcast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealtimeStats {
    /// Last health check error, empty when healthy.
    #[serde(default)]
    pub health_error: String,
    #[serde(default)]
    pub replication_lag_seconds: u32,
    #[serde(default)]
    pub filtered_replication_lag_seconds: u32,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub qps: f64,
}
