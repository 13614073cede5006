//! Topology value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a tablet plays inside its shard.
///
/// Serializes as the canonical upper-case name; deserializes through
/// [`FromStr`], so lower-case names and legacy aliases are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TabletType {
    /// Not yet assigned a role.
    #[default]
    Unknown,
    /// Accepts writes for the shard.
    Primary,
    /// Replicates from the primary and serves reads.
    Replica,
    /// Read-only replica used for batch and analytics traffic.
    Rdonly,
    /// Healthy but not serving; available for promotion.
    Spare,
    /// Running experimental workloads.
    Experimental,
    /// Taking a backup.
    Backup,
    /// Restoring from a backup.
    Restore,
    /// Taken out of service by an operator or a workflow.
    Drained,
}

impl TabletType {
    /// Returns the canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TabletType::Unknown => "UNKNOWN",
            TabletType::Primary => "PRIMARY",
            TabletType::Replica => "REPLICA",
            TabletType::Rdonly => "RDONLY",
            TabletType::Spare => "SPARE",
            TabletType::Experimental => "EXPERIMENTAL",
            TabletType::Backup => "BACKUP",
            TabletType::Restore => "RESTORE",
            TabletType::Drained => "DRAINED",
        }
    }
}

impl fmt::Display for TabletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tablet type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tablet type: {0}")]
pub struct ParseTabletTypeError(pub String);

impl FromStr for TabletType {
    type Err = ParseTabletTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UNKNOWN" => Ok(TabletType::Unknown),
            // BATCH is the legacy alias of RDONLY, MASTER of PRIMARY
            "PRIMARY" | "MASTER" => Ok(TabletType::Primary),
            "REPLICA" => Ok(TabletType::Replica),
            "RDONLY" | "BATCH" => Ok(TabletType::Rdonly),
            "SPARE" => Ok(TabletType::Spare),
            "EXPERIMENTAL" => Ok(TabletType::Experimental),
            "BACKUP" => Ok(TabletType::Backup),
            "RESTORE" => Ok(TabletType::Restore),
            "DRAINED" => Ok(TabletType::Drained),
            _ => Err(ParseTabletTypeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for TabletType {
    type Error = ParseTabletTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
