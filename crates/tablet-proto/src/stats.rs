//! Stats exporter handles.
//!
//! Controllers hold a `Stats` value so callers can reach their counters; the
//! exporter only records the name and label it was registered under.

use serde::{Deserialize, Serialize};

/// Named exporter that stats are published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exporter {
    pub name: String,
    pub label: String,
}

impl Exporter {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Stats bundle owned by a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    exporter: Exporter,
}

impl Stats {
    pub fn new(exporter: Exporter) -> Self {
        Self { exporter }
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }
}
