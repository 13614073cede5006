//! Mock Controller Implementation
//!
//! In-memory `Controller` for tests. State changes and health broadcasts are
//! recorded on bounded queues that tests drain to check what happened.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tablet_proto::{DbConfigs, QueryRules, Stats, TabletType, Target};

use crate::config::MockConfig;
use crate::controller::{
    Controller, ControllerError, MysqlDaemon, QueryService, SchemaEngine, TopoServer,
};

use super::events::{BroadcastData, EventQueue, StateChange};
use super::state::ControllerState;

/// Mock of a tablet query-serving controller.
///
/// All state sits behind one mutex. `set_serving_type` and
/// `broadcast_health` push onto their queue while holding it, so queue
/// order always matches the order state was mutated in. The flip side: once
/// a queue is full every other call waits until a test drains it.
#[derive(Debug)]
pub struct MockController {
    stats: Stats,
    /// Returned verbatim by `topo_server`
    topo_server: Option<Arc<dyn TopoServer>>,
    state: Mutex<ControllerState>,
    /// One entry per `set_serving_type` call
    state_changes: EventQueue<StateChange>,
    /// One entry per `broadcast_health` call
    broadcast_data: EventQueue<BroadcastData>,
}

impl MockController {
    /// Create a mock controller with the default configuration
    pub fn new() -> Self {
        Self::with_config(&MockConfig::default())
    }

    /// Create a mock controller with a custom configuration
    pub fn with_config(config: &MockConfig) -> Self {
        Self {
            stats: config.stats(),
            topo_server: None,
            state: Mutex::new(ControllerState::new()),
            state_changes: EventQueue::new("state_changes", config.queue_capacity),
            broadcast_data: EventQueue::new("broadcast_data", config.queue_capacity),
        }
    }

    /// Set the topology server handed back by `topo_server`
    pub fn with_topo_server(mut self, topo_server: Arc<dyn TopoServer>) -> Self {
        self.topo_server = Some(topo_server);
        self
    }

    // === Test hooks ===

    /// State changes recorded by `set_serving_type`
    pub fn state_changes(&self) -> &EventQueue<StateChange> {
        &self.state_changes
    }

    /// Broadcasts recorded by `broadcast_health`
    pub fn broadcast_data(&self) -> &EventQueue<BroadcastData> {
        &self.broadcast_data
    }

    /// Make `set_serving_type` fail with `err` (or succeed again with `None`)
    pub fn set_serving_type_error(&self, err: Option<ControllerError>) {
        self.lock_state().serving_type_error = err;
    }

    /// Force the query service flag without going through a transition
    pub fn set_query_service_enabled_for_tests(&self, enabled: bool) {
        self.lock_state().query_service_enabled = enabled;
    }

    /// Rule set last stored for `rule_source`
    pub fn get_query_rules(&self, rule_source: &str) -> Option<QueryRules> {
        self.lock_state().query_rules.get(rule_source).cloned()
    }

    /// Whether `enter_lameduck` was called since the last transition
    pub fn is_in_lameduck(&self) -> bool {
        self.lock_state().is_in_lameduck
    }

    // === Internal helpers ===

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        // a test thread that panicked mid-call must not wedge the others
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for MockController {
    fn register(&self) {}

    fn add_status_header(&self) {}

    fn add_status_part(&self) {}

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn init_db_config(
        &self,
        target: &Target,
        db_configs: &DbConfigs,
        _daemon: Option<Arc<dyn MysqlDaemon>>,
    ) -> Result<(), ControllerError> {
        let mut state = self.lock_state();
        state.target = target.clone();
        tracing::debug!(
            keyspace = %target.keyspace,
            shard = %target.shard,
            tablet_type = %target.tablet_type,
            db_name = %db_configs.db_name,
            "Installed target"
        );
        Ok(())
    }

    fn set_serving_type(
        &self,
        tablet_type: TabletType,
        ter_time: DateTime<Utc>,
        serving: bool,
        reason: &str,
    ) -> Result<(), ControllerError> {
        let mut state = self.lock_state();
        let result = state.apply_serving_type(tablet_type, serving);
        self.state_changes.push(StateChange { serving, tablet_type });

        match &result {
            Ok(()) => tracing::debug!(
                %tablet_type,
                serving,
                %ter_time,
                reason,
                "Serving type changed"
            ),
            Err(e) => tracing::debug!(
                %tablet_type,
                serving,
                reason,
                error = %e,
                "Serving type change refused"
            ),
        }
        result
    }

    fn is_serving(&self) -> bool {
        self.lock_state().query_service_enabled
    }

    fn current_target(&self) -> Target {
        self.lock_state().target.clone()
    }

    fn is_healthy(&self) -> Result<(), ControllerError> {
        Ok(())
    }

    fn reload_schema(&self) -> Result<(), ControllerError> {
        Ok(())
    }

    fn clear_query_plan_cache(&self) {}

    // Rule sources are not tracked, and unregistering a source leaves its
    // rules in place.
    fn register_query_rule_source(&self, _rule_source: &str) {}

    fn unregister_query_rule_source(&self, _rule_source: &str) {}

    fn set_query_rules(&self, rule_source: &str, rules: QueryRules) -> Result<(), ControllerError> {
        let mut state = self.lock_state();
        tracing::debug!(rule_source, rules = rules.len(), "Stored query rules");
        state.query_rules.insert(rule_source.to_string(), rules);
        Ok(())
    }

    fn query_service(&self) -> Option<Arc<dyn QueryService>> {
        None
    }

    fn schema_engine(&self) -> Option<Arc<dyn SchemaEngine>> {
        None
    }

    fn broadcast_health(&self) {
        let state = self.lock_state();
        let serving = state.effective_serving();
        self.broadcast_data.push(BroadcastData {
            serving,
            ..BroadcastData::default()
        });
        tracing::debug!(serving, "Broadcast health");
    }

    fn topo_server(&self) -> Option<Arc<dyn TopoServer>> {
        self.topo_server.clone()
    }

    fn enter_lameduck(&self) {
        self.lock_state().is_in_lameduck = true;
        tracing::debug!("Entered lameduck");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablet_proto::QueryRule;

    fn replica_target() -> Target {
        Target::new("ks", "0", TabletType::Replica)
    }

    #[test]
    fn test_new_controller_is_idle() {
        let ctrl = MockController::new();
        assert!(!ctrl.is_serving());
        assert!(!ctrl.is_in_lameduck());
        assert_eq!(ctrl.current_target(), Target::default());
        assert!(ctrl.state_changes().try_next().is_none());
        assert!(ctrl.broadcast_data().try_next().is_none());
        assert_eq!(ctrl.state_changes().capacity(), 10);
        assert_eq!(ctrl.broadcast_data().capacity(), 10);
    }

    #[test]
    fn test_init_then_serve_replica() {
        let ctrl = MockController::new();
        ctrl.init_db_config(&replica_target(), &DbConfigs::default(), None)
            .unwrap();
        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "init")
            .unwrap();

        assert!(ctrl.is_serving());
        assert_eq!(ctrl.current_target().tablet_type, TabletType::Replica);
        assert_eq!(
            ctrl.state_changes().drain(),
            vec![StateChange {
                serving: true,
                tablet_type: TabletType::Replica
            }]
        );
    }

    #[test]
    fn test_init_db_config_overwrites_target() {
        let ctrl = MockController::new();
        ctrl.init_db_config(&replica_target().with_cell("zone1"), &DbConfigs::default(), None)
            .unwrap();
        ctrl.init_db_config(&Target::new("other", "-80", TabletType::Rdonly), &DbConfigs::default(), None)
            .unwrap();

        let target = ctrl.current_target();
        assert_eq!(target, Target::new("other", "-80", TabletType::Rdonly));
        assert!(target.cell.is_empty());
    }

    #[test]
    fn test_injected_error_refuses_transition() {
        let ctrl = MockController::new();
        ctrl.init_db_config(&replica_target(), &DbConfigs::default(), None)
            .unwrap();
        ctrl.set_serving_type_error(Some(ControllerError::injected("ErrX")));

        let err = ctrl
            .set_serving_type(TabletType::Primary, Utc::now(), true, "promote")
            .unwrap_err();

        assert_eq!(err, ControllerError::injected("ErrX"));
        assert!(!ctrl.is_serving());
        assert_eq!(ctrl.current_target().tablet_type, TabletType::Replica);
        assert_eq!(
            ctrl.state_changes().try_next(),
            Some(StateChange {
                serving: true,
                tablet_type: TabletType::Primary
            })
        );
    }

    #[test]
    fn test_clearing_injected_error() {
        let ctrl = MockController::new();
        ctrl.set_serving_type_error(Some(ControllerError::injected("ErrX")));
        assert!(ctrl
            .set_serving_type(TabletType::Replica, Utc::now(), true, "first")
            .is_err());

        ctrl.set_serving_type_error(None);
        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "second")
            .unwrap();
        assert!(ctrl.is_serving());
        assert_eq!(ctrl.state_changes().drain().len(), 2);
    }

    #[test]
    fn test_lameduck_suppresses_broadcast() {
        let ctrl = MockController::new();
        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "init")
            .unwrap();
        ctrl.enter_lameduck();

        assert!(ctrl.is_serving());
        assert!(ctrl.is_in_lameduck());

        ctrl.broadcast_health();
        assert!(!ctrl.broadcast_data().try_next().unwrap().serving);
    }

    #[test]
    fn test_transition_clears_lameduck() {
        let ctrl = MockController::new();
        ctrl.enter_lameduck();
        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "resume")
            .unwrap();
        assert!(!ctrl.is_in_lameduck());

        ctrl.broadcast_health();
        assert!(ctrl.broadcast_data().try_next().unwrap().serving);
    }

    #[test]
    fn test_failed_transition_still_clears_lameduck() {
        let ctrl = MockController::new();
        ctrl.set_query_service_enabled_for_tests(true);
        ctrl.enter_lameduck();
        ctrl.set_serving_type_error(Some(ControllerError::injected("ErrX")));

        assert!(ctrl
            .set_serving_type(TabletType::Drained, Utc::now(), false, "drain")
            .is_err());
        assert!(!ctrl.is_in_lameduck());

        // serving flag untouched by the refused transition
        ctrl.broadcast_health();
        assert!(ctrl.broadcast_data().try_next().unwrap().serving);
    }

    #[test]
    fn test_broadcast_on_fresh_controller() {
        let ctrl = MockController::new();
        ctrl.broadcast_health();

        let data = ctrl.broadcast_data().try_next().unwrap();
        assert_eq!(data, BroadcastData::default());
    }

    #[test]
    fn test_serving_backdoor_leaves_everything_else() {
        let ctrl = MockController::new();
        ctrl.enter_lameduck();
        ctrl.set_query_service_enabled_for_tests(true);

        assert!(ctrl.is_serving());
        assert!(ctrl.is_in_lameduck());
        assert_eq!(ctrl.current_target(), Target::default());
        assert!(ctrl.state_changes().try_next().is_none());
    }

    #[test]
    fn test_query_rules_roundtrip() {
        let ctrl = MockController::new();
        let rules: QueryRules = vec![QueryRule::new("deny_all")].into_iter().collect();

        assert!(ctrl.get_query_rules("blacklist").is_none());
        ctrl.set_query_rules("blacklist", rules.clone()).unwrap();
        assert_eq!(ctrl.get_query_rules("blacklist"), Some(rules));

        ctrl.set_query_rules("blacklist", QueryRules::new()).unwrap();
        assert_eq!(ctrl.get_query_rules("blacklist"), Some(QueryRules::new()));
    }

    #[test]
    fn test_unregister_keeps_rules() {
        let ctrl = MockController::new();
        ctrl.register_query_rule_source("custom");
        let rules: QueryRules = vec![QueryRule::new("r1")].into_iter().collect();
        ctrl.set_query_rules("custom", rules.clone()).unwrap();

        ctrl.unregister_query_rule_source("custom");
        assert_eq!(ctrl.get_query_rules("custom"), Some(rules));
    }

    #[test]
    fn test_stubbed_surface() {
        let ctrl = MockController::new();
        ctrl.register();
        ctrl.add_status_header();
        ctrl.add_status_part();
        ctrl.clear_query_plan_cache();

        assert!(ctrl.is_healthy().is_ok());
        assert!(ctrl.reload_schema().is_ok());
        assert!(ctrl.query_service().is_none());
        assert!(ctrl.schema_engine().is_none());
        assert!(ctrl.topo_server().is_none());
        assert_eq!(ctrl.stats().exporter().name, "MockController");
        assert_eq!(ctrl.stats().exporter().label, "Tablet");
    }

    #[test]
    fn test_topo_server_passthrough() {
        #[derive(Debug)]
        struct FakeTopo;
        impl TopoServer for FakeTopo {}

        let topo: Arc<dyn TopoServer> = Arc::new(FakeTopo);
        let ctrl = MockController::new().with_topo_server(Arc::clone(&topo));

        let returned = ctrl.topo_server().unwrap();
        assert!(Arc::ptr_eq(&returned, &topo));
    }

    #[test]
    fn test_zero_queue_capacity_does_not_block() {
        let ctrl = MockController::with_config(&MockConfig::default().with_queue_capacity(0));
        assert_eq!(ctrl.state_changes().capacity(), 1);

        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "init")
            .unwrap();
        assert!(ctrl.state_changes().try_next().is_some());

        ctrl.broadcast_health();
        assert!(ctrl.broadcast_data().try_next().unwrap().serving);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let ctrl = Arc::new(MockController::new());

        let poisoner = {
            let ctrl = Arc::clone(&ctrl);
            std::thread::spawn(move || {
                let _guard = ctrl.state.lock().unwrap();
                panic!("test thread died holding the lock");
            })
        };
        assert!(poisoner.join().is_err());
        assert!(ctrl.state.is_poisoned());

        ctrl.set_serving_type(TabletType::Replica, Utc::now(), true, "after panic")
            .unwrap();
        assert!(ctrl.is_serving());
        assert_eq!(ctrl.current_target().tablet_type, TabletType::Replica);

        ctrl.broadcast_health();
        assert!(ctrl.broadcast_data().try_next().unwrap().serving);
    }

    #[test]
    fn test_custom_queue_capacity() {
        let config = MockConfig::default().with_queue_capacity(3);
        let ctrl = MockController::with_config(&config);
        assert_eq!(ctrl.state_changes().capacity(), 3);
        assert_eq!(ctrl.broadcast_data().capacity(), 3);
    }
}
