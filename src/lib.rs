//! Tablet Controller Mock - test double for a tablet's query controller
//!
//! This crate provides an in-memory implementation of the tablet controller
//! contract that records serving-state transitions and health broadcasts on
//! bounded queues, so the components driving a controller can be tested
//! without a query-serving backend.

pub mod config;
pub mod controller;
pub mod mock;
pub mod scenario;

pub use config::{ConfigError, MockConfig};
pub use controller::{Controller, ControllerError, MysqlDaemon, QueryService, SchemaEngine, TopoServer};
pub use mock::{BroadcastData, EventQueue, MockController, StateChange};
pub use scenario::{Scenario, ScenarioError, ScenarioReport, Step};
pub use tablet_proto::{DbConfigs, QueryRule, QueryRules, TabletType, Target};
