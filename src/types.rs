//! Shared data model for agents, fleets and sessions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Loosely typed field bag used for user data, context and agent output
pub type DataMap = serde_json::Map<String, Value>;

/// Identifier of a counseling session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id
    pub fn new() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a single agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Skipped,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
            ProcessingStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a fleet run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetStatus {
    Completed,
    PartiallyCompleted,
    Failed,
}

impl FleetStatus {
    /// Classify a run from its completed/total agent counts
    pub fn from_counts(completed: usize, total: usize) -> Self {
        if total == 0 || completed == 0 {
            FleetStatus::Failed
        } else if completed == total {
            FleetStatus::Completed
        } else if completed * 2 > total {
            FleetStatus::PartiallyCompleted
        } else {
            FleetStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FleetStatus::Completed => "completed",
            FleetStatus::PartiallyCompleted => "partially_completed",
            FleetStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for FleetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one agent invocation. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    pub agent_name: String,
    pub status: ProcessingStatus,
    pub output: DataMap,
    /// In `[0, 1]`; always `0.0` for failures
    pub confidence: f64,
    /// Seconds
    pub processing_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub metadata: DataMap,
}

impl AgentResult {
    pub fn is_completed(&self) -> bool {
        self.status == ProcessingStatus::Completed
    }
}

/// Everything an agent sees when it runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInput {
    pub user_data: DataMap,
    pub conversation_context: DataMap,
    /// Completed results of earlier agents in the same run
    pub previous_outputs: BTreeMap<String, AgentResult>,
    pub session_metadata: DataMap,
}

impl AgentInput {
    pub fn new(user_data: DataMap) -> Self {
        Self {
            user_data,
            ..Default::default()
        }
    }
}

/// Aggregated outcome of a fleet run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetResult {
    pub fleet_id: String,
    pub fleet_name: String,
    pub status: FleetStatus,
    pub agent_results: BTreeMap<String, AgentResult>,
    pub execution_summary: DataMap,
    pub overall_confidence: f64,
    /// Seconds
    pub total_processing_time: f64,
    pub recommendations: Vec<String>,
    pub next_actions: Vec<String>,
    pub metadata: DataMap,
}

impl FleetResult {
    /// Ids of agents that completed
    pub fn completed_agents(&self) -> Vec<String> {
        self.agent_results
            .values()
            .filter(|r| r.is_completed())
            .map(|r| r.agent_id.clone())
            .collect()
    }
}

/// A field counts as present when it exists, is not null, and is not an
/// empty string, list or object.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
