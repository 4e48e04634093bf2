//! Counseling sessions and where they are kept

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::orchestrator::{ProcessingPlan, Vertical};
use crate::types::{DataMap, FleetResult, FleetStatus, SessionId};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    Initialized,
    Completed,
    Failed,
}

/// Per-session state carried between requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub vertical: Vertical,
    pub started_at: DateTime<Utc>,
    pub current_step: SessionStep,
    pub completed_agents: Vec<String>,
    pub agent_outputs: DataMap,
    pub user_preferences: DataMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_plan: Option<ProcessingPlan>,
}

impl SessionContext {
    pub fn new(session_id: SessionId, vertical: Vertical) -> Self {
        Self {
            session_id,
            vertical,
            started_at: Utc::now(),
            current_step: SessionStep::Initialized,
            completed_agents: Vec::new(),
            agent_outputs: DataMap::new(),
            user_preferences: DataMap::new(),
            processing_plan: None,
        }
    }

    /// Fold a fleet run into the session: completed agents and their outputs
    pub fn record_fleet(&mut self, result: &FleetResult) {
        self.completed_agents = result.completed_agents();
        self.agent_outputs = result
            .agent_results
            .values()
            .filter(|r| r.is_completed())
            .map(|r| (r.agent_id.clone(), Value::Object(r.output.clone())))
            .collect();
        self.current_step = match result.status {
            FleetStatus::Failed => SessionStep::Failed,
            _ => SessionStep::Completed,
        };
    }
}

/// Session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionContext>, StoreError>;

    /// Insert or replace
    async fn put(&self, context: SessionContext) -> Result<(), StoreError>;

    /// Returns whether a session was removed
    async fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionContext>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionContext>, StoreError> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn put(&self, context: SessionContext) -> Result<(), StoreError> {
        debug!(session_id = %context.session_id, step = ?context.current_step, "Storing session");
        self.sessions
            .write()
            .insert(context.session_id.clone(), context);
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }
}
