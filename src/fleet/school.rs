//! School students fleet (grades 9-12)

use serde_json::{json, Value};

use crate::agents::AgentKind;
use crate::dependency::AgentDependency;
use crate::types::{is_present, round2, DataMap};

pub(super) const FLEET_ID: &str = "school_students_fleet";
pub(super) const FLEET_NAME: &str = "School Students Career Exploration Fleet";

pub(super) const REQUIRED_INPUTS: &[&str] = &["dbda_scores", "cii_results"];
pub(super) const OPTIONAL_INPUTS: &[&str] = &[
    "demographic_info",
    "current_grade",
    "academic_performance",
    "extracurricular_activities",
    "family_preferences",
    "geographical_preferences",
];

const GENERAL_RECOMMENDATIONS: &[&str] = &[
    "Maintain open communication with parents about career aspirations",
    "Seek guidance from teachers and school counselors regularly",
    "Participate in career-oriented workshops and competitions",
    "Develop both academic and soft skills consistently",
    "Stay informed about changing career landscapes and new opportunities",
    "Build a strong foundation in core subjects while exploring interests",
];

pub(super) fn dependencies() -> Vec<AgentDependency> {
    vec![
        AgentDependency::root("test_score_interpreter"),
        AgentDependency::new(
            "academic_stream_advisor",
            &["test_score_interpreter"],
            &["aptitude_analysis", "interest_mapping", "personality_insights"],
        ),
        AgentDependency::new(
            "career_pathway_explorer",
            &["test_score_interpreter", "academic_stream_advisor"],
            &["recommended_streams", "cognitive_strengths"],
        ),
        AgentDependency::new(
            "educational_roadmap_planner",
            &["academic_stream_advisor", "career_pathway_explorer"],
            &["recommended_streams", "recommended_career_pathways"],
        ),
        AgentDependency::new(
            "college_scholarship_navigator",
            &["career_pathway_explorer", "educational_roadmap_planner"],
            &["career_goals", "educational_pathway", "academic_timeline"],
        ),
    ]
}

/// Both assessments must be present and structured
pub(super) fn validate(user_data: &DataMap) -> Vec<String> {
    let mut missing = Vec::new();
    for field in REQUIRED_INPUTS {
        let value = user_data.get(*field);
        if !is_present(value) {
            missing.push((*field).to_string());
        } else if !matches!(value, Some(Value::Object(_))) {
            missing.push(format!("{field} (invalid format)"));
        }
    }
    missing
}

/// The whole chain runs only when both assessments are available
pub(super) fn plan(user_data: &DataMap) -> Vec<AgentKind> {
    let has_scores = REQUIRED_INPUTS
        .iter()
        .all(|field| is_present(user_data.get(*field)));
    if has_scores {
        AgentKind::SCHOOL.to_vec()
    } else {
        Vec::new()
    }
}

pub(super) fn agent_recommendations(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::TestScoreInterpreter => &[
            "Discuss your assessment results with parents and school counselors",
            "Focus on developing your identified cognitive strengths",
            "Explore activities that align with your interest areas",
        ],
        AgentKind::AcademicStreamAdvisor => &[
            "Carefully consider the recommended academic streams",
            "Research subject requirements and career implications for each stream",
            "Talk to current students and professionals in fields that interest you",
        ],
        AgentKind::CareerPathwayExplorer => &[
            "Explore the suggested career paths through internships or job shadowing",
            "Build relevant skills and knowledge in your areas of interest",
            "Connect with professionals in your target fields",
        ],
        AgentKind::EducationalRoadmapPlanner => &[
            "Follow the grade-wise milestone plan consistently",
            "Start preparation for relevant entrance exams early",
            "Balance academics with extracurricular activities",
            "Regularly review and adjust your educational timeline",
        ],
        AgentKind::CollegeScholarshipNavigator => &[
            "Research and shortlist colleges that match your goals and budget",
            "Apply for relevant scholarships and financial aid programs",
            "Visit college campuses and attend career counseling sessions",
            "Maintain good academic performance for scholarship eligibility",
        ],
        _ => &[],
    }
}

pub(super) fn general_recommendations() -> &'static [&'static str] {
    GENERAL_RECOMMENDATIONS
}

fn grade_of(user_data: &DataMap) -> String {
    match user_data.get("current_grade") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// How ready the student is for career guidance
pub(super) fn readiness_assessment(user_data: &DataMap) -> Value {
    let grade = grade_of(user_data);
    let mut score: f64 = 0.7;
    let mut factors = Vec::new();

    if is_present(user_data.get("current_grade")) {
        if grade.contains("11") || grade.contains("12") {
            score += 0.2;
            factors.push("Senior grade level indicates high readiness");
        } else if grade.contains('9') || grade.contains("10") {
            score += 0.1;
            factors.push("Junior grade level allows for exploratory guidance");
        }
    }
    if is_present(user_data.get("academic_performance")) {
        score += 0.1;
        factors.push("Academic performance data available for informed guidance");
    }
    if is_present(user_data.get("extracurricular_activities")) {
        factors.push("Extracurricular involvement shows engagement");
    }

    let score = round2(score.min(1.0));
    let approach = if score >= 0.9 {
        "comprehensive_career_planning"
    } else if score >= 0.8 {
        "focused_stream_and_career_guidance"
    } else if grade.contains('9') || grade.contains("10") {
        "exploratory_guidance_with_foundation_building"
    } else {
        "assessment_based_exploration"
    };

    json!({
        "readiness_score": score,
        "readiness_factors": factors,
        "guidance_approach": approach,
    })
}

/// Focus areas and urgency by grade
pub(super) fn guidance_focus(user_data: &DataMap) -> Value {
    let grade = grade_of(user_data);

    let focus_areas: &[&str] = if grade.contains('9') {
        &["foundation_building", "interest_exploration", "early_stream_awareness"]
    } else if grade.contains("10") {
        &["stream_selection_preparation", "career_awareness", "skill_development"]
    } else if grade.contains("11") {
        &["stream_optimization", "career_planning", "entrance_exam_preparation"]
    } else if grade.contains("12") {
        &["college_selection", "career_finalization", "transition_planning"]
    } else {
        &["general_career_exploration", "aptitude_development"]
    };

    let (urgency, pressure) = if grade.contains("12") {
        ("high", "immediate")
    } else if grade.contains("11") {
        ("medium", "upcoming")
    } else {
        ("low", "future_planning")
    };

    json!({
        "primary_focus_areas": focus_areas,
        "timeline_urgency": urgency,
        "decision_pressure": pressure,
    })
}

pub(super) fn fleet_details() -> Value {
    json!({
        "target_audience": "School students in grades 9-12",
        "age_group_focus": "14-18 years (grades 9-12)",
        "assessment_requirements": {
            "dbda_scores": "Aptitude test scores in various cognitive domains",
            "cii_results": "Career Interest Inventory results showing interest patterns",
        },
        "guidance_types": [
            "stream_selection",
            "career_exploration",
            "educational_planning",
            "college_preparation",
        ],
    })
}
