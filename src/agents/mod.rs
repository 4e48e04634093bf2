//! Agent catalogue.
//!
//! Every agent in the system is one [`AgentKind`] variant. A variant carries
//! no behaviour of its own; it resolves to a static [`AgentProfile`] that
//! declares inputs, output schema, prompt role and confidence formula. The
//! runtime in [`crate::agent`] interprets the profile.

mod college;
mod confidence;
mod prompt;
mod school;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use confidence::{ConfidenceFormula, ConfidenceInputs};
pub use prompt::build_prompt;

/// Every agent known to the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    // School students
    TestScoreInterpreter,
    AcademicStreamAdvisor,
    CareerPathwayExplorer,
    EducationalRoadmapPlanner,
    CollegeScholarshipNavigator,
    // College upskilling
    ProfileAnalysis,
    MarketIntelligence,
    SkillDevelopmentStrategist,
    CareerOptimizationPlanner,
    OpportunityMatcher,
}

impl AgentKind {
    /// School fleet agents in pipeline order
    pub const SCHOOL: [AgentKind; 5] = [
        AgentKind::TestScoreInterpreter,
        AgentKind::AcademicStreamAdvisor,
        AgentKind::CareerPathwayExplorer,
        AgentKind::EducationalRoadmapPlanner,
        AgentKind::CollegeScholarshipNavigator,
    ];

    /// College fleet agents in pipeline order
    pub const COLLEGE: [AgentKind; 5] = [
        AgentKind::ProfileAnalysis,
        AgentKind::MarketIntelligence,
        AgentKind::SkillDevelopmentStrategist,
        AgentKind::CareerOptimizationPlanner,
        AgentKind::OpportunityMatcher,
    ];

    /// Static declaration for this agent
    pub fn profile(&self) -> &'static AgentProfile {
        match self {
            AgentKind::TestScoreInterpreter => &school::TEST_SCORE_INTERPRETER,
            AgentKind::AcademicStreamAdvisor => &school::ACADEMIC_STREAM_ADVISOR,
            AgentKind::CareerPathwayExplorer => &school::CAREER_PATHWAY_EXPLORER,
            AgentKind::EducationalRoadmapPlanner => &school::EDUCATIONAL_ROADMAP_PLANNER,
            AgentKind::CollegeScholarshipNavigator => &school::COLLEGE_SCHOLARSHIP_NAVIGATOR,
            AgentKind::ProfileAnalysis => &college::PROFILE_ANALYSIS,
            AgentKind::MarketIntelligence => &college::MARKET_INTELLIGENCE,
            AgentKind::SkillDevelopmentStrategist => &college::SKILL_DEVELOPMENT_STRATEGIST,
            AgentKind::CareerOptimizationPlanner => &college::CAREER_OPTIMIZATION_PLANNER,
            AgentKind::OpportunityMatcher => &college::OPPORTUNITY_MATCHER,
        }
    }

    /// Stable string id used as the key in results and dependency maps
    pub fn id(&self) -> &'static str {
        self.profile().id
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn all() -> impl Iterator<Item = AgentKind> {
        Self::SCHOOL.into_iter().chain(Self::COLLEGE)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().find(|kind| kind.id() == id)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown agent: {s}"))
    }
}

/// Capability declaration of one agent
#[derive(Debug)]
pub struct AgentProfile {
    pub id: &'static str,
    pub name: &'static str,
    /// Role sentence placed at the top of the prompt
    pub role: &'static str,
    /// Fields that must be present and non-empty in user data
    pub required_inputs: &'static [&'static str],
    /// Fields used when available
    pub optional_inputs: &'static [&'static str],
    /// Top-level keys the model is asked to return
    pub output_schema: &'static [&'static str],
    /// Task-specific instructions appended to the generic guidelines
    pub instructions: &'static [&'static str],
    pub confidence: ConfidenceFormula,
}
