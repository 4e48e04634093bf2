//! Main orchestrator - routes a counseling request to its vertical's fleet
//!
//! Every request walks the same stages:
//!
//! ```text
//! validate_input ─┬─ valid ─────▶ initialize_vertical ─▶ execute_vertical_workflow ─┐
//!                 ├─ follow_up ─▶ handle_follow_up ─────────────────────────────────┤
//!                 └─ error ─────▶ handle_error                                      ▼
//!                                                               generate_final_response
//! ```
//!
//! Nothing here returns `Err` to the caller; every outcome is a
//! [`CounselResponse`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::channel::EventSender;
use crate::config::{Config, FleetSettings};
use crate::error::CounselError;
use crate::fleet::{FleetKind, FleetManager, MINUTES_PER_AGENT};
use crate::llm::{GeminiClient, LanguageModel};
use crate::session::{InMemorySessionStore, SessionContext, SessionStore};
use crate::types::{DataMap, FleetResult, FleetStatus, SessionId};

/// A counseling audience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    SchoolStudents,
    CollegeUpskilling,
    CareerTransition,
}

/// What a vertical needs and which agents serve it
#[derive(Debug, Clone, Serialize)]
pub struct VerticalRequirements {
    pub name: &'static str,
    pub description: &'static str,
    pub required_fields: &'static [&'static str],
    pub optional_fields: &'static [&'static str],
    pub workflow_agents: &'static [&'static str],
}

static SCHOOL_STUDENTS: VerticalRequirements = VerticalRequirements {
    name: "School Students (Grades 9-12)",
    description: "Career exploration and academic stream guidance for high school students",
    required_fields: &["dbda_scores", "cii_results"],
    optional_fields: &["demographic_info"],
    workflow_agents: &[
        "test_score_interpreter",
        "academic_stream_advisor",
        "career_pathway_explorer",
        "educational_roadmap_planner",
        "college_scholarship_navigator",
    ],
};

static COLLEGE_UPSKILLING: VerticalRequirements = VerticalRequirements {
    name: "College Students (Upskilling & Career Optimization)",
    description: "Profile analysis and career optimization for current students",
    required_fields: &["resume_data"],
    optional_fields: &["github_profile", "linkedin_profile", "academic_status"],
    workflow_agents: &[
        "profile_analysis",
        "market_intelligence",
        "skill_development_strategist",
        "career_optimization_planner",
        "opportunity_matcher",
    ],
};

static CAREER_TRANSITION: VerticalRequirements = VerticalRequirements {
    name: "Career Transition/Switch",
    description: "Comprehensive analysis for career change with constraints consideration",
    required_fields: &["dbda_scores", "cii_results", "current_profession"],
    optional_fields: &["financial_constraints", "timeline_flexibility", "family_obligations"],
    workflow_agents: &[
        "transition_feasibility_analyzer",
        "transferable_skills_mapper",
        "financial_impact_calculator",
        "alternative_pathway_designer",
        "timeline_optimization",
    ],
};

const BASE_NEXT_ACTIONS: &[&str] = &[
    "Review the detailed recommendations provided",
    "Ask follow-up questions for clarification",
    "Save this analysis for future reference",
];

impl Vertical {
    pub const ALL: [Vertical; 3] = [
        Vertical::SchoolStudents,
        Vertical::CollegeUpskilling,
        Vertical::CareerTransition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vertical::SchoolStudents => "school_students",
            Vertical::CollegeUpskilling => "college_upskilling",
            Vertical::CareerTransition => "career_transition",
        }
    }

    pub fn requirements(&self) -> &'static VerticalRequirements {
        match self {
            Vertical::SchoolStudents => &SCHOOL_STUDENTS,
            Vertical::CollegeUpskilling => &COLLEGE_UPSKILLING,
            Vertical::CareerTransition => &CAREER_TRANSITION,
        }
    }

    /// The fleet serving this vertical, if one exists
    pub fn fleet_kind(&self) -> Option<FleetKind> {
        match self {
            Vertical::SchoolStudents => Some(FleetKind::SchoolStudents),
            Vertical::CollegeUpskilling => Some(FleetKind::CollegeUpskilling),
            Vertical::CareerTransition => None,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Vertical::SchoolStudents => {
                "Comprehensive career exploration analysis completed for high school student."
            }
            Vertical::CollegeUpskilling => {
                "Profile analysis and career optimization strategy developed."
            }
            Vertical::CareerTransition => {
                "Career transition feasibility and planning analysis completed."
            }
        }
    }

    fn next_actions(&self) -> &'static [&'static str] {
        match self {
            Vertical::SchoolStudents => &[
                "Discuss findings with parents/guardians",
                "Meet with school counselor",
                "Research recommended colleges and courses",
            ],
            Vertical::CollegeUpskilling => &[
                "Update your resume and LinkedIn profile",
                "Start working on recommended skill development",
                "Begin networking in target industries",
            ],
            Vertical::CareerTransition => &[
                "Create a detailed transition timeline",
                "Start building skills for target career",
                "Assess financial preparation needs",
            ],
        }
    }

    /// Missing required fields and available optional ones. Null counts as
    /// missing.
    pub fn check_user_data(&self, user_data: &DataMap) -> (Vec<String>, Vec<String>) {
        let requirements = self.requirements();

        let missing = requirements
            .required_fields
            .iter()
            .filter(|f| !provided(user_data, f))
            .map(|f| f.to_string())
            .collect();
        let available = requirements
            .optional_fields
            .iter()
            .filter(|f| provided(user_data, f))
            .map(|f| f.to_string())
            .collect();
        (missing, available)
    }
}

fn provided(user_data: &DataMap, field: &str) -> bool {
    user_data.get(field).is_some_and(|v| !v.is_null())
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vertical {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vertical::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CounselError::UnknownVertical(s.to_string()))
    }
}

/// Every vertical with its requirement table, keyed by name
pub fn available_verticals() -> Value {
    let map: serde_json::Map<String, Value> = Vertical::ALL
        .iter()
        .map(|v| (v.as_str().to_string(), json!(v.requirements())))
        .collect();
    Value::Object(map)
}

/// Canned advice for an error category
pub fn error_suggestions(error: &CounselError) -> &'static [&'static str] {
    match error {
        CounselError::MissingData { .. } => &[
            "Please provide all required assessment data",
            "Complete the necessary tests/evaluations",
            "Contact support if you need help gathering data",
        ],
        CounselError::NoVertical => &[
            "Choose School Students for grades 9-12 guidance",
            "Choose College Upskilling for current students",
            "Choose Career Transition for career change analysis",
        ],
        _ => &[
            "Try again with complete information",
            "Contact technical support if the problem persists",
        ],
    }
}

/// What will run for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    pub planned_agents: Vec<String>,
    /// Non-null user data fields
    pub available_data: Vec<String>,
    pub estimated_duration: String,
    pub processing_order: Vec<String>,
}

impl ProcessingPlan {
    fn new(vertical: Vertical, user_data: &DataMap) -> Self {
        let agents: Vec<String> = vertical
            .requirements()
            .workflow_agents
            .iter()
            .map(|a| a.to_string())
            .collect();
        let available_data = user_data
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.clone())
            .collect();

        Self {
            estimated_duration: format!("{} minutes", agents.len() * MINUTES_PER_AGENT),
            processing_order: agents.clone(),
            planned_agents: agents,
            available_data,
        }
    }
}

/// Reply to a counseling request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounselResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<Vertical>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// `{fleet_summary, agent_outputs}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_metadata: Option<DataMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl CounselResponse {
    fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            ..Default::default()
        }
    }

    /// Error reply with the vertical table and category-specific suggestions
    pub fn failure(error: &CounselError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            vertical_options: Some(available_verticals()),
            suggested_actions: error_suggestions(error).iter().map(|s| s.to_string()).collect(),
            ..Self::now()
        }
    }
}

/// Where `validate_input` sends a request
#[derive(Debug)]
enum Route {
    Valid {
        vertical: Vertical,
        available_optional: Vec<String>,
    },
    FollowUp(SessionId),
    Error(CounselError),
}

/// Fleet output as the orchestrator exposes it
#[derive(Debug)]
struct WorkflowOutcome {
    outputs: Value,
    agent_count: usize,
    completed_count: usize,
    fleet_status: FleetStatus,
    processing_complete: bool,
    execution_metadata: DataMap,
}

impl WorkflowOutcome {
    /// No agent ran, or every agent that ran failed
    fn has_no_results(&self) -> bool {
        self.completed_count == 0
    }

    fn from_fleet(result: &FleetResult) -> Self {
        let agent_outputs: serde_json::Map<String, Value> = result
            .agent_results
            .iter()
            .map(|(id, r)| {
                (
                    id.clone(),
                    json!({
                        "status": r.status,
                        "confidence": r.confidence,
                        "data": r.output,
                        "warnings": r.warnings,
                    }),
                )
            })
            .collect();

        Self {
            agent_count: agent_outputs.len(),
            completed_count: result.completed_agents().len(),
            fleet_status: result.status,
            outputs: json!({
                "fleet_summary": {
                    "status": result.status,
                    "confidence": result.overall_confidence,
                    "processing_time": result.total_processing_time,
                    "recommendations": result.recommendations,
                    "next_actions": result.next_actions,
                },
                "agent_outputs": agent_outputs,
            }),
            processing_complete: true,
            execution_metadata: result.metadata.clone(),
        }
    }
}

/// Entry point of the counseling system
pub struct Orchestrator {
    /// One fixed fleet per vertical that has one
    fleets: HashMap<FleetKind, FleetManager>,
    store: Arc<dyn SessionStore>,
}

impl Orchestrator {
    /// Orchestrator with an in-memory session store
    pub fn new(model: Arc<dyn LanguageModel>, settings: FleetSettings) -> Self {
        Self::with_store(model, settings, Arc::new(InMemorySessionStore::new()))
    }

    pub fn with_store(
        model: Arc<dyn LanguageModel>,
        settings: FleetSettings,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let fleets = [FleetKind::SchoolStudents, FleetKind::CollegeUpskilling]
            .into_iter()
            .map(|kind| (kind, FleetManager::with_model(kind, Arc::clone(&model), settings)))
            .collect();

        info!(model = model.model_name(), strategy = %settings.strategy, "Orchestrator initialized");
        Self { fleets, store }
    }

    /// Orchestrator backed by Gemini as configured
    pub fn from_config(config: &Config) -> Result<Self, CounselError> {
        let client =
            GeminiClient::from_config(&config.llm).map_err(|e| CounselError::Config(e.to_string()))?;
        Ok(Self::new(Arc::new(client), config.fleet))
    }

    /// Report fleet progress to `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.fleets = self
            .fleets
            .into_iter()
            .map(|(kind, fleet)| (kind, fleet.with_events(events.clone())))
            .collect();
        self
    }

    pub fn fleet(&self, vertical: Vertical) -> Option<&FleetManager> {
        vertical.fleet_kind().and_then(|kind| self.fleets.get(&kind))
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn available_verticals(&self) -> Value {
        available_verticals()
    }

    /// Run one vertical's workflow for `user_data`. A `session_id` string in
    /// `user_data` names the session; otherwise one is generated.
    #[instrument(skip(self, user_data, initial_message))]
    pub async fn start_counseling_session(
        &self,
        vertical: Option<&str>,
        user_data: DataMap,
        initial_message: Option<&str>,
    ) -> CounselResponse {
        info!("Starting counseling session");

        match self.validate_input(vertical, &user_data).await {
            Route::Valid {
                vertical,
                available_optional,
            } => {
                let session_id = session_id_of(&user_data).unwrap_or_default();
                let outcome = self
                    .initialize_vertical(vertical, &session_id, &user_data, available_optional, initial_message)
                    .await;
                let outcome = match outcome {
                    Ok(context) => {
                        self.execute_vertical_workflow(vertical, &session_id, &user_data, &context)
                            .await
                    }
                    Err(e) => Err(e),
                };
                self.generate_final_response(vertical, session_id, outcome)
            }
            Route::FollowUp(session_id) => self.handle_follow_up(&session_id).await,
            Route::Error(e) => self.handle_error(e),
        }
    }

    /// Answer a question in an existing session
    #[instrument(skip(self, question))]
    pub async fn ask_follow_up_question(&self, session_id: &str, question: &str) -> CounselResponse {
        info!(question_len = question.len(), "Follow-up question received");
        self.handle_follow_up(&SessionId::from(session_id)).await
    }

    async fn validate_input(&self, vertical: Option<&str>, user_data: &DataMap) -> Route {
        let Some(name) = vertical.map(str::trim).filter(|v| !v.is_empty()) else {
            return Route::Error(CounselError::NoVertical);
        };
        let vertical = match name.parse::<Vertical>() {
            Ok(v) => v,
            Err(e) => return Route::Error(e),
        };

        let (missing, available_optional) = vertical.check_user_data(user_data);
        if missing.is_empty() {
            info!(%vertical, "Validation passed");
            return Route::Valid {
                vertical,
                available_optional,
            };
        }

        if let Some(session_id) = session_id_of(user_data) {
            match self.store.get(&session_id).await {
                Ok(Some(_)) => {
                    info!(%session_id, "Treating as follow-up question from existing session");
                    return Route::FollowUp(session_id);
                }
                Ok(None) => {}
                Err(e) => return Route::Error(e.into()),
            }
        }

        warn!(%vertical, missing = ?missing, "Validation failed");
        Route::Error(CounselError::MissingData {
            vertical: vertical.to_string(),
            fields: missing,
        })
    }

    /// Create and store the session; returns the conversation context handed
    /// to the fleet.
    async fn initialize_vertical(
        &self,
        vertical: Vertical,
        session_id: &SessionId,
        user_data: &DataMap,
        available_optional: Vec<String>,
        initial_message: Option<&str>,
    ) -> Result<DataMap, CounselError> {
        info!(%vertical, %session_id, "Initializing vertical processing");

        let plan = ProcessingPlan::new(vertical, user_data);
        let mut session = SessionContext::new(session_id.clone(), vertical);
        session.processing_plan = Some(plan.clone());
        self.store.put(session).await?;

        let mut context = DataMap::new();
        context.insert("session_id".into(), json!(session_id));
        context.insert("validation_status".into(), json!("passed"));
        context.insert("available_optional_data".into(), json!(available_optional));
        context.insert(
            "workflow_agents".into(),
            json!(vertical.requirements().workflow_agents),
        );
        context.insert("processing_plan".into(), json!(plan));
        if let Some(message) = initial_message.filter(|m| !m.trim().is_empty()) {
            context.insert("initial_message".into(), json!(message));
        }
        Ok(context)
    }

    async fn execute_vertical_workflow(
        &self,
        vertical: Vertical,
        session_id: &SessionId,
        user_data: &DataMap,
        context: &DataMap,
    ) -> Result<WorkflowOutcome, CounselError> {
        let Some(fleet) = self.fleet(vertical) else {
            error!(%vertical, "No agent fleet for vertical");
            return Err(CounselError::FleetUnavailable(vertical.to_string()));
        };

        info!(%vertical, fleet_id = fleet.kind().id(), "Executing vertical workflow");
        let result = fleet.execute_workflow(user_data, context).await;

        if let Some(mut session) = self.store.get(session_id).await? {
            session.record_fleet(&result);
            self.store.put(session).await?;
        }

        Ok(WorkflowOutcome::from_fleet(&result))
    }

    async fn handle_follow_up(&self, session_id: &SessionId) -> CounselResponse {
        info!(%session_id, "Handling follow-up");

        let session = match self.store.get(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                return CounselResponse::failure(&CounselError::SessionNotFound(session_id.to_string()))
            }
            Err(e) => return CounselResponse::failure(&CounselError::from(e)),
        };

        let error = CounselError::FollowUpUnsupported(session_id.to_string());
        CounselResponse {
            vertical: Some(session.vertical),
            session_id: Some(session_id.clone()),
            conversation_context: Some(json!({
                "can_ask_follow_up": false,
                "session_context": session,
            })),
            ..CounselResponse::failure(&error)
        }
    }

    fn handle_error(&self, error: CounselError) -> CounselResponse {
        error!(error = %error, "Counseling request rejected");
        CounselResponse::failure(&error)
    }

    fn generate_final_response(
        &self,
        vertical: Vertical,
        session_id: SessionId,
        outcome: Result<WorkflowOutcome, CounselError>,
    ) -> CounselResponse {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Generating error response");
                return CounselResponse::failure(&e);
            }
        };

        if outcome.has_no_results() {
            warn!(
                %vertical,
                agents = outcome.agent_count,
                fleet_status = ?outcome.fleet_status,
                "No agent outputs available for response generation"
            );
            return CounselResponse {
                success: false,
                error: Some("No analysis results available".into()),
                debug_info: Some(json!({
                    "processing_complete": outcome.processing_complete,
                    "vertical": vertical,
                    "fleet_status": outcome.fleet_status,
                    "agents_run": outcome.agent_count,
                    "session_context_available": true,
                    "fleet_metadata": outcome.execution_metadata,
                })),
                ..CounselResponse::now()
            };
        }

        let next_actions = BASE_NEXT_ACTIONS
            .iter()
            .chain(vertical.next_actions())
            .map(|s| s.to_string())
            .collect();

        info!(%vertical, %session_id, agents = outcome.agent_count, "Final response generated");
        CounselResponse {
            success: true,
            vertical: Some(vertical),
            session_id: Some(session_id),
            summary: Some(vertical.summary().to_string()),
            next_actions,
            conversation_context: Some(json!({
                "can_ask_follow_up": true,
                "vertical_workflow_complete": outcome.processing_complete,
            })),
            outputs: Some(outcome.outputs),
            execution_metadata: Some(outcome.execution_metadata),
            ..CounselResponse::now()
        }
    }
}

fn session_id_of(user_data: &DataMap) -> Option<SessionId> {
    user_data
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(SessionId::from)
}
