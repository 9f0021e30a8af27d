use serde::{Deserialize, Serialize};

/// Configuration options for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcileOptions {
    /// Match children by `key` before falling back to position
    /// When false, every child is matched by position and keys are ignored
    pub keyed_children: bool,

    /// Emit a debug event for every host mutation
    pub trace_mutations: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            keyed_children: true,
            trace_mutations: false,
        }
    }
}

impl ReconcileOptions {
    /// Options that match children strictly by position
    pub fn positional() -> Self {
        Self {
            keyed_children: false,
            ..Default::default()
        }
    }

    pub fn with_trace_mutations(mut self, enabled: bool) -> Self {
        self.trace_mutations = enabled;
        self
    }

    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
