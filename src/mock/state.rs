//! Mutable state of the mock controller.
//!
//! Everything here lives behind the controller's single mutex.

use std::collections::HashMap;

use tablet_proto::{QueryRules, TabletType, Target};

use crate::controller::ControllerError;

/// State guarded by the mock controller's lock
#[derive(Debug, Default)]
pub struct ControllerState {
    /// Target installed by `init_db_config`, retyped by `set_serving_type`
    pub target: Target,
    /// Query service state
    pub query_service_enabled: bool,
    /// Set by `enter_lameduck`, cleared by any `set_serving_type`
    pub is_in_lameduck: bool,
    /// Latest rule set per rule source
    pub query_rules: HashMap<String, QueryRules>,
    /// Returned by `set_serving_type`; when set the transition is refused
    pub serving_type_error: Option<ControllerError>,
}

impl ControllerState {
    /// Create the zero state
    pub fn new() -> Self {
        Self::default()
    }

    /// Serving as seen by health watchers: enabled and not draining
    pub fn effective_serving(&self) -> bool {
        self.query_service_enabled && !self.is_in_lameduck
    }

    /// Apply a serving-type request.
    ///
    /// With an injected error the target and serving flag stay as they
    /// are. Lameduck is cleared either way.
    pub fn apply_serving_type(&mut self, tablet_type: TabletType, serving: bool) -> Result<(), ControllerError> {
        let result = match &self.serving_type_error {
            None => {
                self.target.tablet_type = tablet_type;
                self.query_service_enabled = serving;
                Ok(())
            }
            Some(err) => Err(err.clone()),
        };
        self.is_in_lameduck = false;
        result
    }
}
