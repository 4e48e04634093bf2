//! Agent runtime - one prompt, one model call, one parse

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::agents::{build_prompt, AgentKind, AgentProfile, ConfidenceInputs};
use crate::error::{AgentError, LlmError};
use crate::llm::{LanguageModel, TokenUsage};
use crate::parser::parse_model_output;
use crate::types::{is_present, round2, AgentInput, AgentResult, DataMap, ProcessingStatus};

/// Runs kept per agent
pub const HISTORY_LIMIT: usize = 10;

/// Input split by role, as handed to the prompt builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatedInput {
    pub required: DataMap,
    pub optional: DataMap,
    pub context: DataMap,
    pub previous_outputs: BTreeMap<String, AgentResult>,
    pub session_metadata: DataMap,
}

/// Result of [`Agent::validate`]
#[derive(Debug, Clone)]
pub struct Validation {
    pub is_valid: bool,
    pub missing: Vec<String>,
    pub data: ValidatedInput,
}

/// One processed run in an agent's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub status: ProcessingStatus,
    pub confidence: f64,
    pub processing_time: f64,
    pub output_keys: Vec<String>,
}

/// A single LLM-backed worker
pub struct Agent {
    /// Which agent this is
    pub kind: AgentKind,
    /// Text completion backend
    model: Arc<dyn LanguageModel>,
    /// Upper bound for one model call
    timeout: Duration,
    /// Most recent runs, oldest first
    history: RwLock<VecDeque<HistoryEntry>>,
}

impl Agent {
    /// Create a new agent
    pub fn new(kind: AgentKind, model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        debug!(
            agent_id = %kind,
            model = model.model_name(),
            timeout_ms = timeout.as_millis() as u64,
            "Creating agent"
        );

        Self {
            kind,
            model,
            timeout,
            history: RwLock::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn profile(&self) -> &'static AgentProfile {
        self.kind.profile()
    }

    /// Split input into required/optional data and report missing fields
    pub fn validate(&self, input: &AgentInput) -> Validation {
        let profile = self.profile();
        let mut data = ValidatedInput {
            context: input.conversation_context.clone(),
            previous_outputs: input.previous_outputs.clone(),
            session_metadata: input.session_metadata.clone(),
            ..Default::default()
        };
        let mut missing = Vec::new();

        for field in profile.required_inputs {
            match input.user_data.get(*field) {
                Some(value) if is_present(Some(value)) => {
                    data.required.insert((*field).to_string(), value.clone());
                }
                _ => missing.push((*field).to_string()),
            }
        }

        for field in profile.optional_inputs {
            if let Some(value) = input.user_data.get(*field).filter(|v| is_present(Some(*v))) {
                data.optional.insert((*field).to_string(), value.clone());
            }
        }

        Validation {
            is_valid: missing.is_empty(),
            missing,
            data,
        }
    }

    /// Whether `user_data` satisfies this agent's required inputs
    pub fn can_process(&self, user_data: &DataMap) -> (bool, Vec<String>) {
        let missing: Vec<String> = self
            .profile()
            .required_inputs
            .iter()
            .filter(|field| !is_present(user_data.get(**field)))
            .map(|field| field.to_string())
            .collect();
        (missing.is_empty(), missing)
    }

    /// Run the agent. Never fails: every error becomes a `failed` result.
    #[instrument(skip(self, input), fields(agent_id = %self.kind))]
    pub async fn execute(&self, input: &AgentInput) -> AgentResult {
        let started = Instant::now();

        let validation = self.validate(input);
        if !validation.is_valid {
            let err = AgentError::Validation(validation.missing);
            warn!(agent_id = %self.kind, error = %err, "Agent input validation failed");
            return self.record(self.failed(&err, started));
        }

        let result = match self.run_core(&validation.data).await {
            Ok((output, usage)) => self.completed(&validation.data, output, usage, started),
            Err(err) => {
                error!(agent_id = %self.kind, kind = err.kind(), error = %err, "Agent run failed");
                self.failed(&err, started)
            }
        };

        info!(
            agent_id = %self.kind,
            status = %result.status,
            confidence = result.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Agent finished"
        );

        self.record(result)
    }

    /// Prompt, call and parse. Parse failures propagate unchanged.
    async fn run_core(
        &self,
        input: &ValidatedInput,
    ) -> Result<(DataMap, Option<TokenUsage>), AgentError> {
        let profile = self.profile();
        let prompt = build_prompt(profile, input);

        let completion = tokio::time::timeout(self.timeout, self.model.invoke(&prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        let output = parse_model_output(&completion.content, profile.output_schema)?;
        Ok((output, completion.usage))
    }

    fn completed(
        &self,
        input: &ValidatedInput,
        output: DataMap,
        usage: Option<TokenUsage>,
        started: Instant,
    ) -> AgentResult {
        let profile = self.profile();

        let confidence = profile.confidence.score(&ConfidenceInputs {
            optional_count: input.optional.len(),
            output: &output,
            schema: profile.output_schema,
            previous_outputs: &input.previous_outputs,
        });

        let warnings = profile
            .output_schema
            .iter()
            .filter(|key| !output.contains_key(**key))
            .map(|key| format!("Output missing expected field: {key}"))
            .collect();

        let mut metadata = DataMap::new();
        metadata.insert("input_summary".into(), input_summary(input));
        metadata.insert(
            "data_quality_assessment".into(),
            data_quality(profile, input),
        );
        metadata.insert("model".into(), json!(self.model.model_name()));
        if let Some(usage) = usage {
            metadata.insert("token_usage".into(), json!(usage));
        }
        metadata.insert("completed_at".into(), json!(Utc::now().to_rfc3339()));

        AgentResult {
            agent_id: self.id().to_string(),
            agent_name: self.name().to_string(),
            status: ProcessingStatus::Completed,
            output,
            confidence,
            processing_time: started.elapsed().as_secs_f64(),
            error_message: None,
            warnings,
            metadata,
        }
    }

    fn failed(&self, err: &AgentError, started: Instant) -> AgentResult {
        let mut metadata = DataMap::new();
        metadata.insert("failure_timestamp".into(), json!(Utc::now().to_rfc3339()));
        metadata.insert("error_kind".into(), json!(err.kind()));
        if let AgentError::Validation(missing) = err {
            metadata.insert("missing_fields".into(), json!(missing));
        }

        AgentResult {
            agent_id: self.id().to_string(),
            agent_name: self.name().to_string(),
            status: ProcessingStatus::Failed,
            output: DataMap::new(),
            confidence: 0.0,
            processing_time: started.elapsed().as_secs_f64(),
            error_message: Some(err.to_string()),
            warnings: Vec::new(),
            metadata,
        }
    }

    fn record(&self, result: AgentResult) -> AgentResult {
        let mut history = self.history.write();
        if history.len() == HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(HistoryEntry {
            timestamp: Utc::now(),
            status: result.status,
            confidence: result.confidence,
            processing_time: result.processing_time,
            output_keys: result.output.keys().cloned().collect(),
        });
        drop(history);
        result
    }

    /// Recent runs, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().iter().cloned().collect()
    }

    /// Static description plus run count
    pub fn agent_info(&self) -> Value {
        let profile = self.profile();
        json!({
            "agent_id": profile.id,
            "agent_name": profile.name,
            "required_inputs": profile.required_inputs,
            "optional_inputs": profile.optional_inputs,
            "output_schema": profile.output_schema,
            "model": self.model.model_name(),
            "timeout_secs": self.timeout.as_secs_f64(),
            "processing_history_count": self.history.read().len(),
        })
    }
}

fn input_summary(input: &ValidatedInput) -> Value {
    json!({
        "required_fields_count": input.required.len(),
        "optional_fields_count": input.optional.len(),
        "has_previous_outputs": !input.previous_outputs.is_empty(),
        "context_available": !input.context.is_empty(),
    })
}

fn data_quality(profile: &AgentProfile, input: &ValidatedInput) -> Value {
    let required_total = profile.required_inputs.len().max(1);
    let data_completeness = if profile.required_inputs.is_empty() {
        1.0
    } else {
        input.required.len() as f64 / required_total as f64
    };

    let optional_coverage = if profile.optional_inputs.is_empty() {
        0.0
    } else {
        input.optional.len() as f64 / profile.optional_inputs.len() as f64
    };

    let overall_quality = if optional_coverage >= 0.5 || !input.previous_outputs.is_empty() {
        "good"
    } else if optional_coverage > 0.0 {
        "fair"
    } else {
        "poor"
    };

    let mut notes = Vec::new();
    if input.optional.is_empty() {
        notes.push("No optional context supplied".to_string());
    }
    if input.previous_outputs.is_empty() {
        notes.push("No earlier agent outputs available".to_string());
    }

    json!({
        "overall_quality": overall_quality,
        "data_completeness": round2(data_completeness),
        "optional_coverage": round2(optional_coverage),
        "quality_notes": notes,
    })
}

/// Shared handle to an agent
#[derive(Clone)]
pub struct AgentHandle {
    inner: Arc<Agent>,
}

impl AgentHandle {
    pub fn new(agent: Agent) -> Self {
        Self {
            inner: Arc::new(agent),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.inner.kind
    }

    pub fn inner(&self) -> &Agent {
        &self.inner
    }
}

impl std::ops::Deref for AgentHandle {
    type Target = Agent;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{object, ScriptedModel};
    use serde_json::json;

    fn school_input() -> AgentInput {
        AgentInput::new(object(json!({
            "dbda_scores": {"verbal": 7, "numerical": 8},
            "cii_results": {"investigative": 9},
            "current_grade": "10",
        })))
    }

    fn agent(kind: AgentKind, model: ScriptedModel) -> Agent {
        Agent::new(kind, Arc::new(model), Duration::from_secs(5))
    }

    // === Validation Tests ===

    #[test]
    fn test_validate_splits_required_and_optional() {
        let agent = agent(AgentKind::TestScoreInterpreter, ScriptedModel::new());
        let validation = agent.validate(&school_input());

        assert!(validation.is_valid);
        assert!(validation.missing.is_empty());
        assert_eq!(validation.data.required.len(), 2);
        assert_eq!(validation.data.optional.len(), 1);
        assert!(validation.data.optional.contains_key("current_grade"));
    }

    #[test]
    fn test_validate_treats_empty_values_as_missing() {
        let agent = agent(AgentKind::TestScoreInterpreter, ScriptedModel::new());
        let input = AgentInput::new(object(json!({
            "dbda_scores": {},
            "cii_results": null,
            "age": "",
        })));
        let validation = agent.validate(&input);

        assert!(!validation.is_valid);
        assert_eq!(validation.missing, vec!["dbda_scores", "cii_results"]);
        assert!(validation.data.optional.is_empty());
    }

    #[test]
    fn test_can_process() {
        let agent = agent(AgentKind::ProfileAnalysis, ScriptedModel::new());
        assert_eq!(
            agent.can_process(&DataMap::new()),
            (false, vec!["resume_data".to_string()])
        );
        assert!(agent.can_process(&object(json!({"resume_data": "text"}))).0);
    }

    // === Execution Tests ===

    #[tokio::test]
    async fn test_missing_required_never_calls_model() {
        let model = ScriptedModel::new();
        let calls = model.call_counter();
        let agent = agent(AgentKind::TestScoreInterpreter, model);

        let result = agent.execute(&AgentInput::default()).await;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert_eq!(result.confidence, 0.0);
        let message = result.error_message.unwrap();
        assert!(message.starts_with("Missing required inputs:"));
        assert!(message.contains("dbda_scores"));
        assert_eq!(result.metadata["error_kind"], json!("validation"));
        assert!(result.metadata.contains_key("failure_timestamp"));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_run() {
        let model = ScriptedModel::new().respond(
            "test_score_interpreter",
            "```json\n{\"executive_summary\": \"strong numerical aptitude\", \"aptitude_analysis\": {\"numerical\": \"high\"},}\n```",
        );
        let agent = agent(AgentKind::TestScoreInterpreter, model);

        let result = agent.execute(&school_input()).await;

        assert_eq!(result.status, ProcessingStatus::Completed);
        assert_eq!(result.output["executive_summary"], json!("strong numerical aptitude"));
        // 0.7 + 1 * 0.05 + (2/8) * 0.2
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.warnings.len(), 6);
        assert!(result.error_message.is_none());
        assert_eq!(
            result.metadata["input_summary"]["optional_fields_count"],
            json!(1)
        );
        assert_eq!(
            result.metadata["data_quality_assessment"]["data_completeness"],
            json!(1.0)
        );
    }

    #[tokio::test]
    async fn test_unparseable_output_fails_with_parse_error() {
        let model = ScriptedModel::new().respond(
            "test_score_interpreter",
            r#"{"executive_summary": "say "hi" first"}"#,
        );
        let agent = agent(AgentKind::TestScoreInterpreter, model);

        let result = agent.execute(&school_input()).await;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert_eq!(result.confidence, 0.0);
        assert!(result.output.is_empty());
        assert_eq!(result.metadata["error_kind"], json!("parse"));
        assert!(result
            .error_message
            .unwrap()
            .contains("Failed to parse model response"));
    }

    #[tokio::test]
    async fn test_model_error_becomes_failed_result() {
        let model = ScriptedModel::new().fail("market_intelligence", "quota exceeded");
        let agent = agent(AgentKind::MarketIntelligence, model);

        let result = agent.execute(&AgentInput::default()).await;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert_eq!(result.metadata["error_kind"], json!("model"));
        assert!(result.error_message.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let model = ScriptedModel::new()
            .respond("market_intelligence", "{\"industry_trends\": []}")
            .delay(Duration::from_millis(200));
        let agent = Agent::new(
            AgentKind::MarketIntelligence,
            Arc::new(model),
            Duration::from_millis(20),
        );

        let result = agent.execute(&AgentInput::default()).await;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(result.error_message.unwrap().contains("timed out"));
    }

    // === History Tests ===

    #[tokio::test]
    async fn test_history_keeps_last_ten_runs() {
        let agent = agent(AgentKind::TestScoreInterpreter, ScriptedModel::new());
        for _ in 0..12 {
            agent.execute(&AgentInput::default()).await;
        }
        assert_eq!(agent.history().len(), HISTORY_LIMIT);
        assert_eq!(agent.agent_info()["processing_history_count"], json!(10));
    }

    #[test]
    fn test_handle_derefs_to_agent() {
        let handle = AgentHandle::new(agent(AgentKind::OpportunityMatcher, ScriptedModel::new()));
        assert_eq!(handle.id(), "opportunity_matcher");
        assert_eq!(handle.kind(), AgentKind::OpportunityMatcher);
    }
}
