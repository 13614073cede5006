//! Scripted scenarios
//!
//! A scenario is a list of steps replayed against a [`MockController`].
//! Both event queues are drained after every step, so scenarios of any
//! length run without stalling on the bounded queues.
//!
//! Scenarios are written in TOML (or JSON when the file ends in `.json`):
//!
//! ```toml
//! name = "promote"
//!
//! [[steps]]
//! op = "install_config"
//! keyspace = "ks"
//! shard = "0"
//! tablet_type = "REPLICA"
//!
//! [[steps]]
//! op = "set_serving_type"
//! tablet_type = "PRIMARY"
//! serving = true
//! reason = "promote"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablet_proto::{DbConfigs, QueryRules, TabletType, Target};

use crate::controller::{Controller, ControllerError};
use crate::mock::{BroadcastData, MockController, StateChange};

/// One action applied to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// `init_db_config` with a fresh target
    InstallConfig {
        keyspace: String,
        shard: String,
        tablet_type: TabletType,
        #[serde(default)]
        db_name: String,
    },
    /// `set_serving_type`; `ter_time` defaults to the time the step runs
    SetServingType {
        tablet_type: TabletType,
        serving: bool,
        #[serde(default)]
        reason: String,
        #[serde(default)]
        ter_time: Option<DateTime<Utc>>,
    },
    /// Make subsequent `set_serving_type` steps fail
    InjectError { message: String },
    /// Undo `inject_error`
    ClearError,
    EnterLameduck,
    BroadcastHealth,
    SetQueryRules {
        source: String,
        #[serde(default)]
        rules: QueryRules,
    },
    /// Force the serving flag through the test backdoor
    SetServingForTests { serving: bool },
}

impl Step {
    /// Snake-case name of the step, as written in scenario files
    pub fn op(&self) -> &'static str {
        match self {
            Step::InstallConfig { .. } => "install_config",
            Step::SetServingType { .. } => "set_serving_type",
            Step::InjectError { .. } => "inject_error",
            Step::ClearError => "clear_error",
            Step::EnterLameduck => "enter_lameduck",
            Step::BroadcastHealth => "broadcast_health",
            Step::SetQueryRules { .. } => "set_query_rules",
            Step::SetServingForTests { .. } => "set_serving_for_tests",
        }
    }

    fn apply(&self, ctrl: &MockController) -> Result<(), ControllerError> {
        match self {
            Step::InstallConfig {
                keyspace,
                shard,
                tablet_type,
                db_name,
            } => ctrl.init_db_config(
                &Target::new(keyspace, shard, *tablet_type),
                &DbConfigs::new(db_name),
                None,
            ),
            Step::SetServingType {
                tablet_type,
                serving,
                reason,
                ter_time,
            } => ctrl.set_serving_type(
                *tablet_type,
                ter_time.unwrap_or_else(Utc::now),
                *serving,
                reason,
            ),
            Step::InjectError { message } => {
                ctrl.set_serving_type_error(Some(ControllerError::injected(message)));
                Ok(())
            }
            Step::ClearError => {
                ctrl.set_serving_type_error(None);
                Ok(())
            }
            Step::EnterLameduck => {
                ctrl.enter_lameduck();
                Ok(())
            }
            Step::BroadcastHealth => {
                ctrl.broadcast_health();
                Ok(())
            }
            Step::SetQueryRules { source, rules } => ctrl.set_query_rules(source, rules.clone()),
            Step::SetServingForTests { serving } => {
                ctrl.set_query_service_enabled_for_tests(*serving);
                Ok(())
            }
        }
    }
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: String,
    /// Error message when the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything observed while running a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepOutcome>,
    pub state_changes: Vec<StateChange>,
    pub broadcasts: Vec<BroadcastData>,
    pub is_serving: bool,
    pub in_lameduck: bool,
    pub target: Target,
    /// Final rules of every source touched by the scenario
    pub query_rules: BTreeMap<String, QueryRules>,
}

impl ScenarioReport {
    /// Number of steps that returned an error
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_some()).count()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Errors loading a scenario
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        toml::from_str(contents).map_err(|e| ScenarioError::ParseError(format!("TOML parse error: {}", e)))
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(contents).map_err(|e| ScenarioError::ParseError(format!("JSON parse error: {}", e)))
    }

    /// Load a scenario file, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Replay every step against `ctrl`.
    ///
    /// A failing step is recorded and the run continues.
    pub fn run(&self, ctrl: &MockController) -> ScenarioReport {
        let mut outcomes = Vec::with_capacity(self.steps.len());
        let mut state_changes = Vec::new();
        let mut broadcasts = Vec::new();
        let mut rule_sources = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            let error = step.apply(ctrl).err().map(|e| e.to_string());
            if let Some(e) = &error {
                tracing::info!(index, op = step.op(), error = %e, "Scenario step failed");
            }
            if let Step::SetQueryRules { source, .. } = step {
                rule_sources.push(source.clone());
            }

            state_changes.extend(ctrl.state_changes().drain());
            broadcasts.extend(ctrl.broadcast_data().drain());
            outcomes.push(StepOutcome {
                index,
                op: step.op().to_string(),
                error,
            });
        }

        let query_rules = rule_sources
            .into_iter()
            .filter_map(|source| ctrl.get_query_rules(&source).map(|rules| (source, rules)))
            .collect();

        ScenarioReport {
            name: self.name.clone(),
            steps: outcomes,
            state_changes,
            broadcasts,
            is_serving: ctrl.is_serving(),
            in_lameduck: ctrl.is_in_lameduck(),
            target: ctrl.current_target(),
            query_rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockConfig;

    const PROMOTE: &str = r#"
name = "promote"

[[steps]]
op = "install_config"
keyspace = "ks"
shard = "0"
tablet_type = "REPLICA"

[[steps]]
op = "set_serving_type"
tablet_type = "REPLICA"
serving = true
reason = "init"

[[steps]]
op = "inject_error"
message = "ErrX"

[[steps]]
op = "set_serving_type"
tablet_type = "PRIMARY"
serving = true
reason = "promote"

[[steps]]
op = "enter_lameduck"

[[steps]]
op = "broadcast_health"
"#;

    #[test]
    fn test_parse_toml() {
        let scenario = Scenario::from_toml_str(PROMOTE).unwrap();
        assert_eq!(scenario.name, "promote");
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.steps[2], Step::InjectError { message: "ErrX".to_string() });
        assert_eq!(scenario.steps[4].op(), "enter_lameduck");
    }

    #[test]
    fn test_unknown_op_rejected() {
        let err = Scenario::from_toml_str("[[steps]]\nop = \"reboot\"\n").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_run_promote_scenario() {
        let scenario = Scenario::from_toml_str(PROMOTE).unwrap();
        let report = scenario.run(&MockController::new());

        assert_eq!(report.failed_steps(), 1);
        assert_eq!(report.steps[3].error.as_deref(), Some("Injected failure: ErrX"));
        assert_eq!(
            report.state_changes,
            vec![
                StateChange { serving: true, tablet_type: TabletType::Replica },
                StateChange { serving: true, tablet_type: TabletType::Primary },
            ]
        );
        assert_eq!(report.broadcasts.len(), 1);
        assert!(!report.broadcasts[0].serving);
        assert!(report.is_serving);
        assert!(report.in_lameduck);
        assert_eq!(report.target, Target::new("ks", "0", TabletType::Replica));
    }

    #[test]
    fn test_long_scenario_does_not_stall() {
        let steps = (0..25).map(|_| Step::BroadcastHealth).collect();
        let scenario = Scenario { name: "flood".to_string(), steps };

        let ctrl = MockController::with_config(&MockConfig::default().with_queue_capacity(1));
        let report = scenario.run(&ctrl);
        assert_eq!(report.broadcasts.len(), 25);
    }

    #[test]
    fn test_report_includes_touched_rule_sources() {
        let scenario = Scenario::from_json_str(
            r#"{
                "steps": [
                    {"op": "set_query_rules", "source": "blacklist", "rules": [{"name": "r1"}]},
                    {"op": "set_serving_for_tests", "serving": true}
                ]
            }"#,
        )
        .unwrap();

        let report = scenario.run(&MockController::new());
        assert_eq!(report.query_rules["blacklist"].len(), 1);
        assert!(report.is_serving);
        assert!(report.state_changes.is_empty());
    }

    #[test]
    fn test_report_json() {
        let report = Scenario::default().run(&MockController::new());
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();
        assert_eq!(json["is_serving"], false);
        assert_eq!(json["target"]["tablet_type"], "UNKNOWN");
    }
}
