//! Fleet manager - runs a vertical's agents and aggregates their results
//!
//! A fleet owns its agents and its dependency graph. One run validates the
//! top-level user data, builds a plan, invokes the planned agents and folds
//! their results into a [`FleetResult`]. Only completed results are passed
//! on to later agents; a failed agent never stops the run.

mod college;
mod school;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::agent::{Agent, AgentHandle};
use crate::agents::AgentKind;
use crate::channel::{EventSender, PipelineEvent};
use crate::config::FleetSettings;
use crate::dependency::{AgentDependency, DependencyGraph};
use crate::llm::LanguageModel;
use crate::types::{round2, AgentInput, AgentResult, DataMap, FleetResult, FleetStatus, ProcessingStatus};

/// Fleet runs kept in history
pub const HISTORY_LIMIT: usize = 10;

/// Minutes budgeted per planned agent
pub const MINUTES_PER_AGENT: usize = 2;

pub const GENERIC_NEXT_ACTIONS: &[&str] = &[
    "Review the detailed analysis and recommendations",
    "Ask follow-up questions for clarification",
    "Begin implementing suggested improvements",
];

pub const FAILED_NEXT_ACTION: &str = "Please provide required data and try again";

/// How planned agents are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One agent at a time, in plan order
    #[default]
    Sequential,
    /// Dependency layers in order; agents inside a layer run concurrently
    Layered,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Layered => "layered",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionStrategy::Sequential),
            "layered" => Ok(ExecutionStrategy::Layered),
            other => Err(format!(
                "unknown execution strategy: {other} (expected sequential or layered)"
            )),
        }
    }
}

/// The fleets that exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetKind {
    SchoolStudents,
    CollegeUpskilling,
}

impl FleetKind {
    pub fn id(&self) -> &'static str {
        match self {
            FleetKind::SchoolStudents => school::FLEET_ID,
            FleetKind::CollegeUpskilling => college::FLEET_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FleetKind::SchoolStudents => school::FLEET_NAME,
            FleetKind::CollegeUpskilling => college::FLEET_NAME,
        }
    }

    /// Member agents in canonical order
    pub fn agents(&self) -> &'static [AgentKind] {
        match self {
            FleetKind::SchoolStudents => &AgentKind::SCHOOL,
            FleetKind::CollegeUpskilling => &AgentKind::COLLEGE,
        }
    }

    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            FleetKind::SchoolStudents => school::REQUIRED_INPUTS,
            FleetKind::CollegeUpskilling => college::REQUIRED_INPUTS,
        }
    }

    pub fn optional_inputs(&self) -> &'static [&'static str] {
        match self {
            FleetKind::SchoolStudents => school::OPTIONAL_INPUTS,
            FleetKind::CollegeUpskilling => college::OPTIONAL_INPUTS,
        }
    }

    pub fn dependencies(&self) -> Vec<AgentDependency> {
        match self {
            FleetKind::SchoolStudents => school::dependencies(),
            FleetKind::CollegeUpskilling => college::dependencies(),
        }
    }

    /// Missing or malformed top-level fields
    pub fn validate(&self, user_data: &DataMap) -> Vec<String> {
        match self {
            FleetKind::SchoolStudents => school::validate(user_data),
            FleetKind::CollegeUpskilling => college::validate(user_data),
        }
    }

    /// Hand-authored plan filtered by the data present
    pub fn plan(&self, user_data: &DataMap) -> Vec<AgentKind> {
        match self {
            FleetKind::SchoolStudents => school::plan(user_data),
            FleetKind::CollegeUpskilling => college::plan(user_data),
        }
    }

    /// Canned advice for every completed agent, then the fleet's generic tail
    pub fn recommendations(&self, results: &BTreeMap<String, AgentResult>) -> Vec<String> {
        let general = match self {
            FleetKind::SchoolStudents => school::general_recommendations(),
            FleetKind::CollegeUpskilling => college::general_recommendations(),
        };

        self.agents()
            .iter()
            .filter(|kind| results.get(kind.id()).is_some_and(AgentResult::is_completed))
            .flat_map(|kind| self.agent_recommendations(*kind).iter())
            .chain(general.iter())
            .map(|s| s.to_string())
            .collect()
    }

    fn agent_recommendations(&self, kind: AgentKind) -> &'static [&'static str] {
        match self {
            FleetKind::SchoolStudents => school::agent_recommendations(kind),
            FleetKind::CollegeUpskilling => college::agent_recommendations(kind),
        }
    }

    fn details(&self) -> Value {
        match self {
            FleetKind::SchoolStudents => school::fleet_details(),
            FleetKind::CollegeUpskilling => college::fleet_details(),
        }
    }
}

impl fmt::Display for FleetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One fleet run in history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub status: FleetStatus,
    pub confidence: f64,
    pub processing_time: f64,
    pub successful_agents: usize,
}

/// Runs one vertical's agents
pub struct FleetManager {
    kind: FleetKind,
    /// Registered agents by id
    agents: HashMap<String, AgentHandle>,
    graph: DependencyGraph,
    settings: FleetSettings,
    events: Option<EventSender>,
    history: RwLock<VecDeque<FleetHistoryEntry>>,
}

impl FleetManager {
    /// Create a fleet with its dependency graph but no agents
    pub fn new(kind: FleetKind, settings: FleetSettings) -> Self {
        let mut graph = DependencyGraph::new();
        for dependency in kind.dependencies() {
            graph.add(dependency);
        }

        Self {
            kind,
            agents: HashMap::new(),
            graph,
            settings,
            events: None,
            history: RwLock::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    /// Create a fleet with every member agent backed by `model`
    pub fn with_model(kind: FleetKind, model: Arc<dyn LanguageModel>, settings: FleetSettings) -> Self {
        let mut fleet = Self::new(kind, settings);
        for agent_kind in kind.agents() {
            fleet.add_agent(
                Agent::new(*agent_kind, Arc::clone(&model), settings.llm_timeout),
                None,
            );
        }
        info!(
            fleet_id = kind.id(),
            agents = fleet.agents.len(),
            strategy = %settings.strategy,
            "Fleet initialized"
        );
        fleet
    }

    /// Report progress to `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Register an agent, optionally replacing its dependency entry
    pub fn add_agent(&mut self, agent: Agent, dependency: Option<AgentDependency>) {
        let id = agent.id().to_string();
        if !self.kind.agents().contains(&agent.kind) {
            warn!(fleet_id = self.kind.id(), agent_id = %id, "Agent is not part of this fleet's plan");
        }
        if let Some(dependency) = dependency {
            self.graph.add(dependency);
        }
        debug!(fleet_id = self.kind.id(), agent_id = %id, "Agent registered");
        self.agents.insert(id, AgentHandle::new(agent));
    }

    pub fn kind(&self) -> FleetKind {
        self.kind
    }

    pub fn settings(&self) -> &FleetSettings {
        &self.settings
    }

    pub fn agent(&self, agent_id: &str) -> Option<AgentHandle> {
        self.agents.get(agent_id).cloned()
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Fleet-level input check
    pub fn validate_input(&self, user_data: &DataMap) -> (bool, Vec<String>) {
        let missing = self.kind.validate(user_data);
        let available: Vec<&str> = self
            .kind
            .optional_inputs()
            .iter()
            .copied()
            .filter(|field| user_data.get(*field).is_some_and(|v| !v.is_null()))
            .collect();
        debug!(fleet_id = self.kind.id(), available = ?available, "Available optional data");
        (missing.is_empty(), missing)
    }

    /// Ordered agent ids for this user data
    pub fn create_execution_plan(&self, user_data: &DataMap) -> Vec<String> {
        let plan: Vec<String> = self
            .kind
            .plan(user_data)
            .into_iter()
            .map(|kind| kind.id().to_string())
            .collect();

        for violation in self.graph.order_violations(&plan) {
            warn!(fleet_id = self.kind.id(), "{violation}");
        }
        info!(fleet_id = self.kind.id(), agents = plan.len(), plan = ?plan, "Created execution plan");
        plan
    }

    /// Validate, plan, run and aggregate. Never fails; problems are
    /// reported through the result.
    #[instrument(skip_all, fields(fleet_id = self.kind.id()))]
    pub async fn execute_workflow(&self, user_data: &DataMap, context: &DataMap) -> FleetResult {
        let started = Instant::now();
        let execution_timestamp = Utc::now();

        let (is_valid, missing) = self.validate_input(user_data);
        if !is_valid {
            let reason = format!("Missing required data: {}", missing.join(", "));
            warn!(fleet_id = self.kind.id(), reason = %reason, "Fleet input validation failed");
            let result = self.failed_result(reason, started);
            self.emit_finished(&result);
            return self.record(result);
        }

        let plan = self.create_execution_plan(user_data);
        self.emit(PipelineEvent::FleetStarted {
            fleet_id: self.kind.id().to_string(),
            plan: plan.clone(),
        });

        let agent_results = match self.settings.strategy {
            ExecutionStrategy::Sequential => self.run_sequential(&plan, user_data, context).await,
            ExecutionStrategy::Layered => self.run_layered(&plan, user_data, context).await,
        };

        let completed = agent_results.values().filter(|r| r.is_completed()).count();
        let status = FleetStatus::from_counts(completed, agent_results.len());

        let mut metadata = DataMap::new();
        metadata.insert("execution_plan".into(), json!(plan));
        metadata.insert(
            "successful_agents".into(),
            json!(ids_with_status(&agent_results, ProcessingStatus::Completed)),
        );
        metadata.insert(
            "failed_agents".into(),
            json!(ids_with_status(&agent_results, ProcessingStatus::Failed)),
        );
        metadata.insert("execution_strategy".into(), json!(self.settings.strategy));
        metadata.insert(
            "execution_timestamp".into(),
            json!(execution_timestamp.to_rfc3339()),
        );

        let result = FleetResult {
            fleet_id: self.kind.id().to_string(),
            fleet_name: self.kind.name().to_string(),
            status,
            execution_summary: execution_summary(&agent_results),
            overall_confidence: overall_confidence(&agent_results),
            total_processing_time: started.elapsed().as_secs_f64(),
            recommendations: self.kind.recommendations(&agent_results),
            next_actions: GENERIC_NEXT_ACTIONS.iter().map(|s| s.to_string()).collect(),
            metadata,
            agent_results,
        };

        info!(
            fleet_id = self.kind.id(),
            status = %result.status,
            confidence = result.overall_confidence,
            completed,
            total = result.agent_results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fleet finished"
        );

        self.emit_finished(&result);
        self.record(result)
    }

    async fn run_sequential(
        &self,
        plan: &[String],
        user_data: &DataMap,
        context: &DataMap,
    ) -> BTreeMap<String, AgentResult> {
        let mut results = BTreeMap::new();
        let mut previous = BTreeMap::new();

        for (index, agent_id) in plan.iter().enumerate() {
            let Some(agent) = self.lookup(agent_id) else {
                continue;
            };
            let input = self.agent_input(user_data, context, &previous, index + 1);

            self.emit_started(agent_id, index + 1);
            let result = agent.execute(&input).await;
            self.emit_agent_finished(&result);

            if result.is_completed() {
                previous.insert(agent_id.clone(), result.clone());
            }
            results.insert(agent_id.clone(), result);
        }

        results
    }

    async fn run_layered(
        &self,
        plan: &[String],
        user_data: &DataMap,
        context: &DataMap,
    ) -> BTreeMap<String, AgentResult> {
        let layers = match self.graph.layers(plan) {
            Ok(layers) => layers,
            Err(e) => {
                warn!(fleet_id = self.kind.id(), error = %e, "Falling back to sequential execution");
                return self.run_sequential(plan, user_data, context).await;
            }
        };

        let position = |id: &str| plan.iter().position(|p| p == id).map_or(0, |i| i + 1);
        let mut results = BTreeMap::new();
        let mut previous = BTreeMap::new();

        for layer in layers {
            debug!(fleet_id = self.kind.id(), layer = ?layer, "Running layer");

            let jobs: Vec<(AgentHandle, AgentInput)> = layer
                .iter()
                .filter_map(|id| {
                    let agent = self.lookup(id)?;
                    let input = self.agent_input(user_data, context, &previous, position(id));
                    Some((agent, input))
                })
                .collect();

            for (agent, _) in &jobs {
                self.emit_started(agent.id(), position(agent.id()));
            }

            let finished = join_all(jobs.iter().map(|(agent, input)| agent.execute(input))).await;

            for result in finished {
                self.emit_agent_finished(&result);
                if result.is_completed() {
                    previous.insert(result.agent_id.clone(), result.clone());
                }
                results.insert(result.agent_id.clone(), result);
            }
        }

        results
    }

    fn lookup(&self, agent_id: &str) -> Option<AgentHandle> {
        let agent = self.agents.get(agent_id).cloned();
        if agent.is_none() {
            warn!(fleet_id = self.kind.id(), agent_id, "Agent not found in fleet, skipping");
        }
        agent
    }

    fn agent_input(
        &self,
        user_data: &DataMap,
        context: &DataMap,
        previous: &BTreeMap<String, AgentResult>,
        execution_order: usize,
    ) -> AgentInput {
        let mut session_metadata = DataMap::new();
        session_metadata.insert("fleet_id".into(), json!(self.kind.id()));
        session_metadata.insert("execution_order".into(), json!(execution_order));
        if let Some(session_id) = context.get("session_id") {
            session_metadata.insert("session_id".into(), session_id.clone());
        }

        AgentInput {
            user_data: user_data.clone(),
            conversation_context: context.clone(),
            previous_outputs: previous.clone(),
            session_metadata,
        }
    }

    fn failed_result(&self, reason: String, started: Instant) -> FleetResult {
        let mut execution_summary = DataMap::new();
        execution_summary.insert("error".into(), json!(reason));

        let mut metadata = DataMap::new();
        metadata.insert("failure_reason".into(), json!(reason));
        metadata.insert("timestamp".into(), json!(Utc::now().to_rfc3339()));

        FleetResult {
            fleet_id: self.kind.id().to_string(),
            fleet_name: self.kind.name().to_string(),
            status: FleetStatus::Failed,
            agent_results: BTreeMap::new(),
            execution_summary,
            overall_confidence: 0.0,
            total_processing_time: started.elapsed().as_secs_f64(),
            recommendations: Vec::new(),
            next_actions: vec![FAILED_NEXT_ACTION.to_string()],
            metadata,
        }
    }

    fn record(&self, result: FleetResult) -> FleetResult {
        let mut history = self.history.write();
        if history.len() == HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(FleetHistoryEntry {
            timestamp: Utc::now(),
            status: result.status,
            confidence: result.overall_confidence,
            processing_time: result.total_processing_time,
            successful_agents: result.completed_agents().len(),
        });
        drop(history);
        result
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    fn emit_started(&self, agent_id: &str, position: usize) {
        self.emit(PipelineEvent::AgentStarted {
            fleet_id: self.kind.id().to_string(),
            agent_id: agent_id.to_string(),
            position,
        });
    }

    fn emit_agent_finished(&self, result: &AgentResult) {
        self.emit(PipelineEvent::AgentFinished {
            fleet_id: self.kind.id().to_string(),
            agent_id: result.agent_id.clone(),
            status: result.status,
            confidence: result.confidence,
        });
    }

    fn emit_finished(&self, result: &FleetResult) {
        self.emit(PipelineEvent::FleetFinished {
            fleet_id: self.kind.id().to_string(),
            status: result.status,
            overall_confidence: result.overall_confidence,
        });
    }

    /// Dry run: would this data execute, and what would run
    pub fn can_execute(&self, user_data: &DataMap) -> Value {
        let (is_valid, missing) = self.validate_input(user_data);
        let plan = if is_valid {
            self.create_execution_plan(user_data)
        } else {
            Vec::new()
        };

        let mut info = json!({
            "can_execute": is_valid,
            "missing_data": missing,
            "execution_plan": plan,
            "estimated_agents": plan.len(),
            "estimated_time_minutes": plan.len() * MINUTES_PER_AGENT,
        });

        if self.kind == FleetKind::SchoolStudents {
            info["readiness_assessment"] = school::readiness_assessment(user_data);
            info["guidance_focus"] = if is_valid {
                school::guidance_focus(user_data)
            } else {
                Value::Null
            };
        }
        info
    }

    /// Static description of the fleet
    pub fn fleet_info(&self) -> Value {
        let agents: Vec<&str> = self.kind.agents().iter().map(|k| k.id()).collect();
        let mut registered: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        registered.sort_unstable();

        let mut info = json!({
            "fleet_id": self.kind.id(),
            "fleet_name": self.kind.name(),
            "agent_count": agents.len(),
            "agents": agents,
            "registered_agents": registered,
            "required_inputs": self.kind.required_inputs(),
            "optional_inputs": self.kind.optional_inputs(),
            "execution_strategy": self.settings.strategy,
            "dependencies": self.graph.to_json(),
            "execution_history_count": self.history.read().len(),
        });
        if let (Value::Object(info), Value::Object(details)) = (&mut info, self.kind.details()) {
            info.extend(details);
        }
        info
    }

    /// Recent runs, oldest first
    pub fn history(&self) -> Vec<FleetHistoryEntry> {
        self.history.read().iter().cloned().collect()
    }
}

/// Mean confidence of completed agents scaled by the completion ratio
pub fn overall_confidence(results: &BTreeMap<String, AgentResult>) -> f64 {
    let completed: Vec<f64> = results
        .values()
        .filter(|r| r.is_completed())
        .map(|r| r.confidence)
        .collect();
    if completed.is_empty() {
        return 0.0;
    }
    let mean = completed.iter().sum::<f64>() / completed.len() as f64;
    let completion_rate = completed.len() as f64 / results.len() as f64;
    round2(mean * completion_rate)
}

pub fn execution_summary(results: &BTreeMap<String, AgentResult>) -> DataMap {
    let total = results.len();
    let avg_processing_time = if total == 0 {
        0.0
    } else {
        results.values().map(|r| r.processing_time).sum::<f64>() / total as f64
    };

    let mut summary = DataMap::new();
    summary.insert("total_agents".into(), json!(total));
    summary.insert(
        "successful_agents".into(),
        json!(results.values().filter(|r| r.is_completed()).count()),
    );
    summary.insert(
        "failed_agents".into(),
        json!(results
            .values()
            .filter(|r| r.status == ProcessingStatus::Failed)
            .count()),
    );
    summary.insert("avg_processing_time".into(), json!(avg_processing_time));
    summary.insert(
        "total_warnings".into(),
        json!(results.values().map(|r| r.warnings.len()).sum::<usize>()),
    );
    summary
}

fn ids_with_status(results: &BTreeMap<String, AgentResult>, status: ProcessingStatus) -> Vec<String> {
    results
        .values()
        .filter(|r| r.status == status)
        .map(|r| r.agent_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::EventChannel;
    use crate::testing::{object, ScriptedModel};
    use std::time::Duration;

    fn settings(strategy: ExecutionStrategy) -> FleetSettings {
        FleetSettings {
            llm_timeout: Duration::from_secs(5),
            strategy,
        }
    }

    fn school_data() -> DataMap {
        object(json!({
            "dbda_scores": {"verbal_reasoning": 7, "numerical_ability": 8, "spatial": 6},
            "cii_results": {"investigative": 9, "artistic": 4},
        }))
    }

    fn college_data() -> DataMap {
        object(json!({
            "resume_data": "B.Tech CSE, 3rd year. Rust, Python, one internship.",
            "github_profile": "https://github.com/student",
        }))
    }

    fn result(id: &str, status: ProcessingStatus, confidence: f64) -> AgentResult {
        AgentResult {
            agent_id: id.into(),
            agent_name: id.into(),
            status,
            output: DataMap::new(),
            confidence,
            processing_time: 1.0,
            error_message: None,
            warnings: vec!["w".into()],
            metadata: DataMap::new(),
        }
    }

    // === Aggregation Tests ===

    #[test]
    fn test_overall_confidence_scaled_by_completion() {
        let mut results = BTreeMap::new();
        results.insert("a".into(), result("a", ProcessingStatus::Completed, 0.9));
        results.insert("b".into(), result("b", ProcessingStatus::Completed, 0.7));
        results.insert("c".into(), result("c", ProcessingStatus::Failed, 0.0));
        results.insert("d".into(), result("d", ProcessingStatus::Completed, 0.8));

        // mean 0.8 * 3/4
        assert_eq!(overall_confidence(&results), 0.6);
    }

    #[test]
    fn test_overall_confidence_without_completions() {
        let mut results = BTreeMap::new();
        assert_eq!(overall_confidence(&results), 0.0);
        results.insert("a".into(), result("a", ProcessingStatus::Failed, 0.0));
        assert_eq!(overall_confidence(&results), 0.0);
    }

    #[test]
    fn test_execution_summary() {
        let mut results = BTreeMap::new();
        results.insert("a".into(), result("a", ProcessingStatus::Completed, 0.9));
        results.insert("b".into(), result("b", ProcessingStatus::Failed, 0.0));

        let summary = execution_summary(&results);
        assert_eq!(summary["total_agents"], json!(2));
        assert_eq!(summary["successful_agents"], json!(1));
        assert_eq!(summary["failed_agents"], json!(1));
        assert_eq!(summary["avg_processing_time"], json!(1.0));
        assert_eq!(summary["total_warnings"], json!(2));

        assert_eq!(execution_summary(&BTreeMap::new())["avg_processing_time"], json!(0.0));
    }

    #[test]
    fn test_recommendations_follow_completed_agents() {
        let mut results = BTreeMap::new();
        results.insert(
            "market_intelligence".into(),
            result("market_intelligence", ProcessingStatus::Completed, 0.9),
        );
        results.insert(
            "profile_analysis".into(),
            result("profile_analysis", ProcessingStatus::Failed, 0.0),
        );

        let recs = FleetKind::CollegeUpskilling.recommendations(&results);
        assert_eq!(recs.len(), 6);
        assert_eq!(recs[0], "Stay updated with the latest industry trends and requirements");
        assert_eq!(
            recs.last().unwrap(),
            "Consider gaining practical experience through internships or projects"
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Layered".parse::<ExecutionStrategy>().unwrap(), ExecutionStrategy::Layered);
        assert_eq!(" sequential ".parse::<ExecutionStrategy>().unwrap(), ExecutionStrategy::Sequential);
        assert!("parallel".parse::<ExecutionStrategy>().is_err());
        assert_eq!(ExecutionStrategy::default(), ExecutionStrategy::Sequential);
    }

    // === Workflow Tests ===

    #[tokio::test]
    async fn test_college_fleet_completes() {
        let model = ScriptedModel::complete(&AgentKind::COLLEGE);
        let fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(model),
            settings(ExecutionStrategy::Sequential),
        );

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::Completed);
        assert_eq!(result.agent_results.len(), 5);
        assert_eq!(result.recommendations.len(), 16);
        assert_eq!(result.next_actions, GENERIC_NEXT_ACTIONS);
        assert_eq!(result.execution_summary["successful_agents"], json!(5));
        assert_eq!(
            result.metadata["execution_plan"],
            json!([
                "profile_analysis",
                "market_intelligence",
                "skill_development_strategist",
                "career_optimization_planner",
                "opportunity_matcher"
            ])
        );
        assert_eq!(result.overall_confidence, overall_confidence(&result.agent_results));
        assert_eq!(fleet.history().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failing_agent_gives_partial_completion() {
        let model = ScriptedModel::complete(&AgentKind::SCHOOL)
            .fail("academic_stream_advisor", "model overloaded");
        let invocations = model.invocations();
        let prompts = model.prompts();
        let fleet = FleetManager::with_model(
            FleetKind::SchoolStudents,
            Arc::new(model),
            settings(ExecutionStrategy::Sequential),
        );

        let result = fleet.execute_workflow(&school_data(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::PartiallyCompleted);
        assert_eq!(result.agent_results.len(), 5);
        assert_eq!(invocations.lock().len(), 5);

        let failed = &result.agent_results["academic_stream_advisor"];
        assert_eq!(failed.status, ProcessingStatus::Failed);
        assert_eq!(failed.confidence, 0.0);
        assert_eq!(result.metadata["failed_agents"], json!(["academic_stream_advisor"]));

        let completed: Vec<f64> = result
            .agent_results
            .values()
            .filter(|r| r.is_completed())
            .map(|r| r.confidence)
            .collect();
        assert_eq!(completed.len(), 4);
        let expected = round2(completed.iter().sum::<f64>() / 4.0 * 4.0 / 5.0);
        assert_eq!(result.overall_confidence, expected);

        let prompts = prompts.lock();
        let explorer_prompt = prompts
            .iter()
            .find(|p| p.contains("Agent ID: career_pathway_explorer"))
            .unwrap();
        assert!(explorer_prompt.contains("- test_score_interpreter (Test Score Interpreter Agent)"));
        assert!(!explorer_prompt.contains("- academic_stream_advisor (Academic Stream Advisor Agent)"));
    }

    #[tokio::test]
    async fn test_missing_fleet_data_fails_before_any_agent() {
        let model = ScriptedModel::complete(&AgentKind::SCHOOL);
        let calls = model.call_counter();
        let fleet = FleetManager::with_model(
            FleetKind::SchoolStudents,
            Arc::new(model),
            settings(ExecutionStrategy::Sequential),
        );

        let result = fleet.execute_workflow(&DataMap::new(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::Failed);
        assert_eq!(result.overall_confidence, 0.0);
        assert!(result.agent_results.is_empty());
        assert_eq!(result.next_actions, vec![FAILED_NEXT_ACTION.to_string()]);
        assert_eq!(
            result.metadata["failure_reason"],
            json!("Missing required data: dbda_scores, cii_results")
        );
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_majority_failure_is_failed() {
        let model = ScriptedModel::complete(&AgentKind::COLLEGE)
            .fail("profile_analysis", "down")
            .fail("market_intelligence", "down")
            .fail("skill_development_strategist", "down");
        let fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(model),
            settings(ExecutionStrategy::Sequential),
        );

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::Failed);
        assert!(result.overall_confidence > 0.0);
        assert_eq!(result.completed_agents().len(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_agents_are_skipped() {
        let model: Arc<dyn LanguageModel> = Arc::new(ScriptedModel::complete(&AgentKind::COLLEGE));
        let mut fleet = FleetManager::new(FleetKind::CollegeUpskilling, settings(ExecutionStrategy::Sequential));
        fleet.add_agent(
            Agent::new(AgentKind::ProfileAnalysis, Arc::clone(&model), Duration::from_secs(5)),
            None,
        );
        fleet.add_agent(
            Agent::new(AgentKind::MarketIntelligence, model, Duration::from_secs(5)),
            Some(AgentDependency::root("market_intelligence")),
        );

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;

        assert_eq!(result.agent_results.len(), 2);
        assert_eq!(result.status, FleetStatus::Completed);
    }

    #[tokio::test]
    async fn test_layered_strategy_matches_sequential_outcome() {
        let (tx, mut channel) = EventChannel::new();
        let fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(ScriptedModel::complete(&AgentKind::COLLEGE)),
            settings(ExecutionStrategy::Layered),
        )
        .with_events(tx);

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;
        assert_eq!(result.status, FleetStatus::Completed);
        assert_eq!(result.metadata["execution_strategy"], json!("layered"));

        let sequential = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(ScriptedModel::complete(&AgentKind::COLLEGE)),
            settings(ExecutionStrategy::Sequential),
        )
        .execute_workflow(&college_data(), &DataMap::new())
        .await;
        assert_eq!(result.overall_confidence, sequential.overall_confidence);

        let events = channel.drain();
        assert_eq!(events.len(), 12);
        assert!(matches!(events[0], PipelineEvent::FleetStarted { .. }));
        // profile_analysis and market_intelligence share the first layer
        assert!(matches!(events[1], PipelineEvent::AgentStarted { position: 1, .. }));
        assert!(matches!(events[2], PipelineEvent::AgentStarted { position: 2, .. }));
        assert!(matches!(events[11], PipelineEvent::FleetFinished { status: FleetStatus::Completed, .. }));
    }

    #[tokio::test]
    async fn test_layered_cycle_falls_back_to_sequential() {
        let scripted = ScriptedModel::complete(&AgentKind::COLLEGE);
        let invocations = scripted.invocations();
        let model: Arc<dyn LanguageModel> = Arc::new(scripted);
        let mut fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::clone(&model),
            settings(ExecutionStrategy::Layered),
        );
        // opportunity_matcher already depends on profile_analysis
        fleet.add_agent(
            Agent::new(AgentKind::ProfileAnalysis, model, Duration::from_secs(5)),
            Some(AgentDependency::new("profile_analysis", &["opportunity_matcher"], &[])),
        );
        let plan = fleet.create_execution_plan(&college_data());
        assert!(fleet.dependency_graph().layers(&plan).is_err());

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::Completed);
        assert_eq!(result.agent_results.len(), 5);
        assert_eq!(*invocations.lock(), plan);
    }

    #[tokio::test]
    async fn test_layered_failure_is_not_passed_downstream() {
        let model = ScriptedModel::complete(&AgentKind::COLLEGE).fail("market_intelligence", "down");
        let prompts = model.prompts();
        let fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(model),
            settings(ExecutionStrategy::Layered),
        );

        let result = fleet.execute_workflow(&college_data(), &DataMap::new()).await;

        assert_eq!(result.status, FleetStatus::PartiallyCompleted);
        assert_eq!(
            result.agent_results["market_intelligence"].status,
            ProcessingStatus::Failed
        );

        let prompts = prompts.lock();
        let strategist_prompt = prompts
            .iter()
            .find(|p| p.contains("Agent ID: skill_development_strategist"))
            .unwrap();
        assert!(strategist_prompt.contains("- profile_analysis (Profile Analysis Agent)"));
        assert!(!strategist_prompt.contains("- market_intelligence (Market Intelligence Agent)"));
    }

    #[tokio::test]
    async fn test_sequential_events_interleave() {
        let (tx, mut channel) = EventChannel::new();
        let fleet = FleetManager::with_model(
            FleetKind::CollegeUpskilling,
            Arc::new(ScriptedModel::complete(&AgentKind::COLLEGE)),
            settings(ExecutionStrategy::Sequential),
        )
        .with_events(tx);

        // validation fails without a resume
        fleet.execute_workflow(&DataMap::new(), &DataMap::new()).await;
        let events = channel.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::FleetFinished { status: FleetStatus::Failed, .. }));

        fleet.execute_workflow(&college_data(), &DataMap::new()).await;
        let events = channel.drain();
        assert_eq!(events.len(), 12);
        for (i, pair) in events[1..11].chunks(2).enumerate() {
            match (&pair[0], &pair[1]) {
                (
                    PipelineEvent::AgentStarted { agent_id: started, position, .. },
                    PipelineEvent::AgentFinished { agent_id: finished, status, .. },
                ) => {
                    assert_eq!(started, finished);
                    assert_eq!(*position, i + 1);
                    assert_eq!(*status, ProcessingStatus::Completed);
                }
                other => panic!("unexpected event pair: {other:?}"),
            }
        }
    }

    // === Introspection Tests ===

    #[test]
    fn test_can_execute_school() {
        let fleet = FleetManager::with_model(
            FleetKind::SchoolStudents,
            Arc::new(ScriptedModel::new()),
            FleetSettings::default(),
        );

        let mut data = school_data();
        data.insert("current_grade".into(), json!("11"));
        let info = fleet.can_execute(&data);
        assert_eq!(info["can_execute"], json!(true));
        assert_eq!(info["estimated_agents"], json!(5));
        assert_eq!(info["estimated_time_minutes"], json!(10));
        assert_eq!(info["readiness_assessment"]["readiness_score"], json!(0.9));
        assert_eq!(info["guidance_focus"]["timeline_urgency"], json!("medium"));

        let info = fleet.can_execute(&DataMap::new());
        assert_eq!(info["can_execute"], json!(false));
        assert_eq!(info["estimated_agents"], json!(0));
        assert!(info["guidance_focus"].is_null());
    }

    #[test]
    fn test_can_execute_college_has_no_readiness() {
        let fleet = FleetManager::new(FleetKind::CollegeUpskilling, FleetSettings::default());
        let info = fleet.can_execute(&college_data());
        assert_eq!(info["can_execute"], json!(true));
        assert!(info.get("readiness_assessment").is_none());
    }

    #[test]
    fn test_fleet_info() {
        let fleet = FleetManager::with_model(
            FleetKind::SchoolStudents,
            Arc::new(ScriptedModel::new()),
            FleetSettings::default(),
        );
        let info = fleet.fleet_info();

        assert_eq!(info["fleet_id"], json!("school_students_fleet"));
        assert_eq!(info["agent_count"], json!(5));
        assert_eq!(info["execution_strategy"], json!("sequential"));
        assert_eq!(info["target_audience"], json!("School students in grades 9-12"));
        assert_eq!(
            info["dependencies"]["academic_stream_advisor"]["depends_on"],
            json!(["test_score_interpreter"])
        );
        assert_eq!(info["execution_history_count"], json!(0));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let fleet = FleetManager::with_model(
            FleetKind::SchoolStudents,
            Arc::new(ScriptedModel::new()),
            FleetSettings::default(),
        );
        for _ in 0..HISTORY_LIMIT + 2 {
            fleet.execute_workflow(&DataMap::new(), &DataMap::new()).await;
        }
        assert_eq!(fleet.history().len(), HISTORY_LIMIT);
    }
}
