//! College upskilling fleet

use serde_json::{json, Value};

use crate::agents::AgentKind;
use crate::dependency::AgentDependency;
use crate::types::{is_present, DataMap};

pub(super) const FLEET_ID: &str = "college_upskilling_fleet";
pub(super) const FLEET_NAME: &str = "College Student Career Optimization Fleet";

pub(super) const REQUIRED_INPUTS: &[&str] = &["resume_data"];
pub(super) const OPTIONAL_INPUTS: &[&str] = &[
    "github_profile",
    "linkedin_profile",
    "academic_status",
    "internship_experience",
    "project_experience",
];

const GENERAL_RECOMMENDATIONS: &[&str] = &[
    "Build a strong professional network in your target industry",
    "Create a portfolio showcasing your best work and projects",
    "Practice interview skills and prepare for technical assessments",
    "Consider gaining practical experience through internships or projects",
];

pub(super) fn dependencies() -> Vec<AgentDependency> {
    vec![
        AgentDependency::root("profile_analysis"),
        AgentDependency::root("market_intelligence"),
        AgentDependency::new(
            "skill_development_strategist",
            &["profile_analysis", "market_intelligence"],
            &["current_skills", "market_trends"],
        ),
        AgentDependency::new(
            "career_optimization_planner",
            &["profile_analysis", "market_intelligence", "skill_development_strategist"],
            &["profile_summary", "skill_gaps", "development_plan"],
        ),
        AgentDependency::new(
            "opportunity_matcher",
            &["profile_analysis", "career_optimization_planner"],
            &["profile_summary", "career_goals"],
        ),
    ]
}

pub(super) fn validate(user_data: &DataMap) -> Vec<String> {
    REQUIRED_INPUTS
        .iter()
        .filter(|field| !is_present(user_data.get(**field)))
        .map(|field| field.to_string())
        .collect()
}

/// Market intelligence always runs; everything else hangs off the resume
pub(super) fn plan(user_data: &DataMap) -> Vec<AgentKind> {
    let mut plan = Vec::with_capacity(5);
    let has_resume = is_present(user_data.get("resume_data"));

    if has_resume {
        plan.push(AgentKind::ProfileAnalysis);
    }
    plan.push(AgentKind::MarketIntelligence);
    if has_resume {
        plan.push(AgentKind::SkillDevelopmentStrategist);
        plan.push(AgentKind::CareerOptimizationPlanner);
        plan.push(AgentKind::OpportunityMatcher);
    }
    plan
}

pub(super) fn agent_recommendations(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::ProfileAnalysis => &[
            "Update your professional profiles based on the analysis",
            "Focus on highlighting your strongest skills and experiences",
        ],
        AgentKind::MarketIntelligence => &[
            "Stay updated with the latest industry trends and requirements",
            "Consider emerging technologies and skills in your field",
        ],
        AgentKind::SkillDevelopmentStrategist => &[
            "Follow the recommended skill development roadmap",
            "Prioritize high-impact skills for your target roles",
        ],
        AgentKind::CareerOptimizationPlanner => &[
            "Implement your personalized career optimization strategy step by step",
            "Begin executing your networking and job search plan immediately",
            "Set up tracking systems to monitor progress on career goals",
            "Start building your personal brand as outlined in the strategy",
        ],
        AgentKind::OpportunityMatcher => &[
            "Apply to matched opportunities that align with your profile",
            "Customize your applications based on opportunity requirements",
        ],
        _ => &[],
    }
}

pub(super) fn general_recommendations() -> &'static [&'static str] {
    GENERAL_RECOMMENDATIONS
}

pub(super) fn fleet_details() -> Value {
    json!({
        "target_audience": "College students seeking upskilling and career optimization",
    })
}
