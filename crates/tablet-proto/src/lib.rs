//! Tablet Protocol Types
//!
//! Value types spoken by tablet controllers: tablet types, serving targets,
//! query rule sets, database configuration, and stats exporters.

pub mod dbconfig;
pub mod query;
pub mod rules;
pub mod stats;
pub mod topodata;

pub use dbconfig::DbConfigs;
pub use query::{RealtimeStats, Target};
pub use rules::{QueryRule, QueryRules, RuleAction};
pub use stats::{Exporter, Stats};
pub use topodata::{ParseTabletTypeError, TabletType};
