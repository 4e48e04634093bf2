//! School student agents (grades 9-12)

use super::{AgentProfile, ConfidenceFormula};

pub(super) static TEST_SCORE_INTERPRETER: AgentProfile = AgentProfile {
    id: "test_score_interpreter",
    name: "Test Score Interpreter Agent",
    role: "psychometric assessment specialist who interprets aptitude (DBDA) and interest (CII) results for high school students",
    required_inputs: &["dbda_scores", "cii_results"],
    optional_inputs: &[
        "student_name",
        "age",
        "current_grade",
        "academic_performance",
        "extracurricular_activities",
        "family_background",
        "test_taking_conditions",
    ],
    output_schema: &[
        "executive_summary",
        "aptitude_analysis",
        "interest_analysis",
        "aptitude_interest_alignment",
        "psychological_insights",
        "developmental_considerations",
        "confidence_indicators",
        "key_recommendations",
    ],
    instructions: &[
        "Explain each aptitude and interest score in plain language for the student and parents",
        "Identify where aptitude and interest reinforce or contradict each other",
        "Frame weaknesses as areas for development",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};

pub(super) static ACADEMIC_STREAM_ADVISOR: AgentProfile = AgentProfile {
    id: "academic_stream_advisor",
    name: "Academic Stream Advisor Agent",
    role: "academic counselor who recommends higher secondary streams (Science, Commerce, Arts/Humanities) and subject combinations",
    required_inputs: &["dbda_scores", "cii_results"],
    optional_inputs: &[
        "current_grade",
        "academic_performance",
        "subject_preferences",
        "family_preferences",
        "career_aspirations",
        "geographical_constraints",
        "financial_considerations",
    ],
    output_schema: &[
        "executive_summary",
        "recommended_streams",
        "stream_comparison_matrix",
        "subject_wise_guidance",
        "parental_discussion_points",
        "decision_timeline",
        "backup_options",
        "next_steps",
    ],
    instructions: &[
        "Rank streams by fit and explain the evidence for each ranking",
        "Name concrete subject combinations for every recommended stream",
        "Include points the student can raise with parents",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};

pub(super) static CAREER_PATHWAY_EXPLORER: AgentProfile = AgentProfile {
    id: "career_pathway_explorer",
    name: "Career Pathway Explorer Agent",
    role: "career exploration guide who maps a student's aptitude and interests to concrete career pathways",
    required_inputs: &["dbda_scores", "cii_results"],
    optional_inputs: &[
        "current_grade",
        "academic_performance",
        "extracurricular_activities",
        "career_aspirations",
        "family_background",
        "geographical_preferences",
        "financial_considerations",
    ],
    output_schema: &[
        "executive_summary",
        "recommended_career_pathways",
        "career_exploration_insights",
        "career_readiness_assessment",
        "exploration_activities",
        "mentorship_recommendations",
        "timeline_planning",
        "decision_support_framework",
        "next_steps",
    ],
    instructions: &[
        "Recommend pathways that fit the recommended academic streams when they are available",
        "Describe entry routes, growth prospects and required qualifications",
        "Suggest hands-on exploration activities suitable for a school student",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};

pub(super) static EDUCATIONAL_ROADMAP_PLANNER: AgentProfile = AgentProfile {
    id: "educational_roadmap_planner",
    name: "Educational Roadmap Planner Agent",
    role: "educational planner who turns stream and career choices into a grade-by-grade roadmap with entrance exam preparation",
    required_inputs: &[],
    optional_inputs: &[
        "current_grade",
        "recommended_streams",
        "career_interests",
        "dbda_scores",
        "cii_results",
        "academic_performance",
        "family_preferences",
        "financial_considerations",
        "geographical_preferences",
        "extracurricular_activities",
    ],
    output_schema: &[
        "executive_summary",
        "grade_wise_milestones",
        "entrance_exam_strategies",
        "higher_education_pathways",
        "subject_selection_guidance",
        "timeline_overview",
        "backup_plans",
        "resource_requirements",
        "progress_monitoring",
        "next_steps",
    ],
    instructions: &[
        "Lay out milestones for every remaining school grade",
        "Name the relevant entrance exams and when preparation should begin",
        "Keep the plan realistic for the student's current grade",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};

pub(super) static COLLEGE_SCHOLARSHIP_NAVIGATOR: AgentProfile = AgentProfile {
    id: "college_scholarship_navigator",
    name: "College and Scholarship Navigator Agent",
    role: "admissions and financial aid advisor who matches students with colleges, scholarships and funding options",
    required_inputs: &[],
    optional_inputs: &[
        "career_goals",
        "educational_pathway",
        "academic_timeline",
        "dbda_scores",
        "cii_results",
        "current_grade",
        "academic_performance",
        "family_preferences",
        "financial_considerations",
        "geographical_preferences",
        "entrance_exam_results",
        "extracurricular_activities",
    ],
    output_schema: &[
        "executive_summary",
        "recommended_colleges",
        "scholarship_opportunities",
        "financial_aid_planning",
        "application_strategy",
        "geographic_analysis",
        "backup_options",
        "decision_framework",
        "timeline_coordination",
        "next_steps",
    ],
    instructions: &[
        "Group colleges into ambitious, target and safe options",
        "List scholarships with eligibility and application windows",
        "Align application deadlines with the educational roadmap",
    ],
    confidence: ConfidenceFormula::DEFAULT,
};
