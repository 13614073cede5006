//! Query rule sets
//!
//! A rule set is an ordered list of rules supplied by one rule source.
//! Controllers store rule sets keyed by source name and never look inside.

use serde::{Deserialize, Serialize};

/// What happens to a query that matches a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// Reject the query with an error
    #[default]
    Fail,
    /// Reject and ask the client to retry elsewhere
    FailRetry,
    /// Let the query through
    Continue,
}

/// A single query rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRule {
    /// Unique name within its rule set
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Pattern the query text must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Tables the query must touch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
    #[serde(default)]
    pub action: RuleAction,
}

impl QueryRule {
    /// Create a rule with the default (fail) action
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            query: None,
            tables: Vec::new(),
            action: RuleAction::default(),
        }
    }

    pub fn with_query(mut self, pattern: impl Into<String>) -> Self {
        self.query = Some(pattern.into());
        self
    }

    pub fn with_action(mut self, action: RuleAction) -> Self {
        self.action = action;
        self
    }
}

/// Ordered collection of query rules
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRules {
    rules: Vec<QueryRule>,
}

impl QueryRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rule set from its JSON array form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append a rule
    pub fn add(&mut self, rule: QueryRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryRule> {
        self.rules.iter()
    }
}

impl FromIterator<QueryRule> for QueryRules {
    fn from_iter<I: IntoIterator<Item = QueryRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
