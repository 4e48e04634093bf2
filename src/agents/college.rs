//! College upskilling agents

use super::{AgentProfile, ConfidenceFormula};

pub(super) static PROFILE_ANALYSIS: AgentProfile = AgentProfile {
    id: "profile_analysis",
    name: "Profile Analysis Agent",
    role: "career profile analyst who evaluates a college student's resume, GitHub and LinkedIn presence",
    required_inputs: &["resume_data"],
    optional_inputs: &[
        "linkedin_profile",
        "github_profile",
        "academic_status",
        "internship_experience",
        "project_experience",
    ],
    output_schema: &[
        "overall_assessment",
        "individual_analyses",
        "recommendations",
        "competitive_positioning",
    ],
    instructions: &[
        "Analyse each supplied profile source separately under individual_analyses, keyed by source",
        "Record an error key for a source that could not be analysed instead of guessing",
        "Summarise current skills, strengths and gaps in overall_assessment",
    ],
    confidence: ConfidenceFormula::Sources {
        base: 0.6,
        max_sources: 5,
        sources_weight: 0.3,
        analyses_key: "individual_analyses",
        success_weight: 0.1,
        cap: 1.0,
    },
};

pub(super) static MARKET_INTELLIGENCE: AgentProfile = AgentProfile {
    id: "market_intelligence",
    name: "Market Intelligence Agent",
    role: "labour market analyst who reports industry trends, skill demand and salary ranges for early-career roles",
    required_inputs: &[],
    optional_inputs: &[
        "resume_data",
        "linkedin_profile",
        "github_profile",
        "academic_status",
        "profile_analysis_output",
        "target_industries",
        "preferred_locations",
    ],
    output_schema: &[
        "industry_trends",
        "skill_demand",
        "salary_insights",
        "job_market_outlook",
        "geographic_insights",
        "emerging_technologies",
        "market_recommendations",
        "domain_selection_reasoning",
    ],
    instructions: &[
        "Infer the student's target domains from the profile when none are given and explain the choice",
        "Quote salary ranges for entry-level and early-career roles",
        "Highlight skills with rising demand",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};

pub(super) static SKILL_DEVELOPMENT_STRATEGIST: AgentProfile = AgentProfile {
    id: "skill_development_strategist",
    name: "Skill Development Strategist Agent",
    role: "learning strategist who closes the gap between a student's current skills and market demand",
    required_inputs: &[],
    optional_inputs: &[
        "resume_data",
        "github_profile",
        "academic_status",
        "career_preferences",
        "learning_preferences",
        "budget_constraints",
    ],
    output_schema: &[
        "skill_gap_analysis",
        "development_roadmap",
        "immediate_actions",
        "long_term_strategy",
        "portfolio_projects",
        "certification_recommendations",
        "networking_opportunities",
    ],
    instructions: &[
        "Compare current skills from the profile analysis with market demand",
        "Order the roadmap by impact for the target roles",
        "Prefer free or low-cost resources when a budget constraint is given",
    ],
    confidence: ConfidenceFormula::Upstream {
        base: 0.7,
        upstream: &[("profile_analysis", 0.1), ("market_intelligence", 0.1)],
        key_fields: &["skill_gap_analysis", "development_roadmap", "immediate_actions"],
        completeness_weight: 0.1,
        cap: 0.95,
    },
};

pub(super) static CAREER_OPTIMIZATION_PLANNER: AgentProfile = AgentProfile {
    id: "career_optimization_planner",
    name: "Career Optimization Planner Agent",
    role: "career strategist who builds a goal-driven plan covering networking, job search and personal branding",
    required_inputs: &[],
    optional_inputs: &[
        "resume_data",
        "linkedin_profile",
        "academic_status",
        "career_preferences",
        "geographic_preferences",
        "company_preferences",
        "work_life_balance_priorities",
        "salary_expectations",
        "industry_connections",
    ],
    output_schema: &[
        "career_goals",
        "career_strategy",
        "networking_plan",
        "job_search_strategy",
        "personal_branding",
        "action_planning",
        "success_tracking",
    ],
    instructions: &[
        "Set short, medium and long term career goals",
        "Tie every strategy step to the skill development plan",
        "Define measurable checkpoints for tracking progress",
    ],
    confidence: ConfidenceFormula::Upstream {
        base: 0.75,
        upstream: &[
            ("profile_analysis", 0.08),
            ("market_intelligence", 0.07),
            ("skill_development_strategist", 0.05),
        ],
        key_fields: &[
            "career_goals",
            "career_strategy",
            "networking_plan",
            "job_search_strategy",
        ],
        completeness_weight: 0.1,
        cap: 0.95,
    },
};

pub(super) static OPPORTUNITY_MATCHER: AgentProfile = AgentProfile {
    id: "opportunity_matcher",
    name: "Opportunity Matcher Agent",
    role: "placement specialist who matches a student's profile and goals with internships, jobs and programs",
    required_inputs: &[],
    optional_inputs: &[
        "market_intelligence_output",
        "skill_development_output",
        "resume_data",
        "linkedin_profile",
        "geographic_preferences",
        "company_preferences",
        "salary_expectations",
        "work_mode_preferences",
        "timeline_urgency",
        "industry_focus",
    ],
    output_schema: &[
        "matched_opportunities",
        "compatibility_analysis",
        "application_strategy",
        "success_probability",
        "preparation_requirements",
        "alternative_pathways",
        "networking_strategy",
    ],
    instructions: &[
        "Match opportunity types to the profile summary and career goals",
        "Estimate success probability for each match and explain it",
        "Offer alternative pathways when direct matches are weak",
    ],
    confidence: ConfidenceFormula::Upstream {
        base: 0.75,
        upstream: &[
            ("profile_analysis", 0.08),
            ("career_optimization_planner", 0.08),
            ("market_intelligence", 0.04),
        ],
        key_fields: &[
            "matched_opportunities",
            "compatibility_analysis",
            "application_strategy",
        ],
        completeness_weight: 0.1,
        cap: 0.95,
    },
};
