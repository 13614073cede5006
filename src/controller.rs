//! Tablet controller contract
//!
//! The capability set a tablet server exposes to the tablet manager: config
//! installation, serving-type transitions, query rule registration, health
//! broadcast, and lameduck entry. The query engine, schema engine, topology
//! server, and database daemon are external collaborators that only show up
//! here as opaque handles.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tablet_proto::{DbConfigs, QueryRules, Stats, TabletType, Target};

/// Query execution engine handle
pub trait QueryService: fmt::Debug + Send + Sync {}

/// Schema engine handle
pub trait SchemaEngine: fmt::Debug + Send + Sync {}

/// Topology service client handle
pub trait TopoServer: fmt::Debug + Send + Sync {}

/// Handle to the database daemon backing the tablet
pub trait MysqlDaemon: fmt::Debug + Send + Sync {}

/// Errors returned by controller operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("Serving type {tablet_type} rejected: {reason}")]
    ServingTypeRejected { tablet_type: TabletType, reason: String },

    #[error("Injected failure: {0}")]
    Injected(String),
}

impl ControllerError {
    /// Convenience constructor for a failure injected by a test
    pub fn injected(message: impl Into<String>) -> Self {
        ControllerError::Injected(message.into())
    }
}

/// Operations a tablet manager drives on its query-serving controller
pub trait Controller: Send + Sync {
    /// Register the controller's HTTP handlers
    fn register(&self);

    /// Add the controller's header to the status page
    fn add_status_header(&self);

    /// Add the controller's sections to the status page
    fn add_status_part(&self);

    /// Stats owned by the controller
    fn stats(&self) -> &Stats;

    /// Install the target and database configuration before serving starts
    fn init_db_config(
        &self,
        target: &Target,
        db_configs: &DbConfigs,
        daemon: Option<Arc<dyn MysqlDaemon>>,
    ) -> Result<(), ControllerError>;

    /// Transition to `tablet_type` and enable or disable query serving.
    ///
    /// `ter_time` is the primary term start time; `reason` is free text for
    /// the status page.
    fn set_serving_type(
        &self,
        tablet_type: TabletType,
        ter_time: DateTime<Utc>,
        serving: bool,
        reason: &str,
    ) -> Result<(), ControllerError>;

    /// Whether the query service is currently enabled
    fn is_serving(&self) -> bool;

    /// Copy of the target currently served
    fn current_target(&self) -> Target;

    /// `Ok(())` when the controller can serve queries
    fn is_healthy(&self) -> Result<(), ControllerError>;

    /// Reload the schema from the database.
    ///
    /// Takes no context or cancellation argument: calls are synchronous and
    /// there is no async runtime to carry one. Implementations that need a
    /// deadline bound the reload themselves.
    fn reload_schema(&self) -> Result<(), ControllerError>;

    /// Drop every cached query plan
    fn clear_query_plan_cache(&self);

    /// Declare a rule source so its rules can be set later
    fn register_query_rule_source(&self, rule_source: &str);

    /// Withdraw a rule source
    fn unregister_query_rule_source(&self, rule_source: &str);

    /// Replace the rule set supplied by `rule_source`
    fn set_query_rules(&self, rule_source: &str, rules: QueryRules) -> Result<(), ControllerError>;

    /// Query service handle, if one is running
    fn query_service(&self) -> Option<Arc<dyn QueryService>>;

    /// Schema engine handle, if one is running
    fn schema_engine(&self) -> Option<Arc<dyn SchemaEngine>>;

    /// Announce the current serving status to topology watchers
    fn broadcast_health(&self);

    /// Topology server the controller was built with
    fn topo_server(&self) -> Option<Arc<dyn TopoServer>>;

    /// Start draining: report not-serving while still answering queries
    fn enter_lameduck(&self);
}
