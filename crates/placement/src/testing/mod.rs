//! Shared fixtures for tests: a hand-built random-forest model, a linear
//! model without importances, and two canonical candidate profiles.
//!
//! The demo model encodes ten numeric fields first, then one-hot blocks for
//! the nine categorical fields (32 features). Its five trees split on
//! interview score, skills match, academic percentages, certifications and
//! prior work experience, so [`strong_profile`] scores 0.81 and
//! [`weak_profile`] 0.19.

use approx::AbsDiffEq;

use crate::classifier::{Aggregation, Classifier, DecisionFunction, TreeEnsemble};
use crate::decision_tree;
use crate::model::{Model, ModelMeta};
use crate::preprocess::{EncodingStep, Preprocessor};
use crate::repr::{Forest, LinearModel};
use crate::schema::{
    Board, CandidateProfile, CompanyTier, CompetitionLevel, FieldId, Gender, HscSubject,
    RawRecord, Specialisation, UndergradDegree, WorkExperience,
};

/// Default tolerance for probability comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Tolerance on the sum of normalised importances.
pub const IMPORTANCE_SUM_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Assertions
// =============================================================================

/// Assert that two slices of f64 values are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.abs_diff_eq(e, tolerance),
            "{context}[{i}]: {a} ≠ {e} (diff={}, tolerance={tolerance})",
            (a - e).abs()
        );
    }
}

/// Assert that importances are non-negative and sum to one.
pub fn assert_importances_normalized(scores: &[f64]) {
    for (i, &s) in scores.iter().enumerate() {
        assert!(s >= 0.0 && s.is_finite(), "importance[{i}] = {s} is not a non-negative number");
    }
    let sum: f64 = scores.iter().sum();
    assert!(
        sum.abs_diff_eq(&1.0, IMPORTANCE_SUM_TOLERANCE),
        "importances sum to {sum}, expected 1.0"
    );
}

// =============================================================================
// Fixtures
// =============================================================================

const NUMERIC_FIELDS: [FieldId; 10] = [
    FieldId::SscPercentage,
    FieldId::HscPercentage,
    FieldId::DegreePercentage,
    FieldId::MbaPercent,
    FieldId::YearsExperience,
    FieldId::InternshipCompleted,
    FieldId::SkillsMatchPercent,
    FieldId::NumCertifications,
    FieldId::EmpTestPercentage,
    FieldId::InterviewScore,
];

/// Feature indices of the demo encoding.
pub mod features {
    pub const SSC_PERCENTAGE: u32 = 0;
    pub const DEGREE_PERCENTAGE: u32 = 2;
    pub const MBA_PERCENT: u32 = 3;
    pub const SKILLS_MATCH_PERCENT: u32 = 6;
    pub const NUM_CERTIFICATIONS: u32 = 7;
    pub const EMP_TEST_PERCENTAGE: u32 = 8;
    pub const INTERVIEW_SCORE: u32 = 9;
    pub const WORK_EXPERIENCE_YES: u32 = 25;
}

/// Fitted preprocessor of the demo model.
pub fn demo_preprocessor() -> Preprocessor {
    let mut steps: Vec<EncodingStep> = NUMERIC_FIELDS
        .iter()
        .map(|&field| match field {
            FieldId::MbaPercent => EncodingStep::Standardize { field, mean: 62.0, scale: 6.0 },
            _ => EncodingStep::Passthrough { field },
        })
        .collect();

    let one_hot = |field, categories: &[&'static str]| EncodingStep::OneHot {
        field,
        categories: categories.to_vec(),
    };
    steps.extend([
        one_hot(FieldId::Gender, &["Female", "Male"]),
        one_hot(FieldId::SscBoard, &["Central", "Others"]),
        one_hot(FieldId::HscBoard, &["Central", "Others"]),
        one_hot(FieldId::HscSubject, &["Arts", "Commerce", "Science"]),
        one_hot(FieldId::UndergradDegree, &["Comm&Mgmt", "Others", "Sci&Tech"]),
        one_hot(FieldId::Specialisation, &["Marketing & Finance", "Marketing & HR"]),
        one_hot(FieldId::WorkExperience, &["No", "Yes"]),
        one_hot(FieldId::CompanyTier, &["MNC", "Mid-size", "Startup"]),
        one_hot(FieldId::JobCompetitionLevel, &["High", "Low", "Medium"]),
    ]);

    Preprocessor::new(steps).expect("demo preprocessor is valid")
}

/// The demo random forest (five trees with gain statistics).
pub fn demo_forest() -> Forest {
    use features::*;

    Forest::new()
        .with_tree(decision_tree! {
            0 => split(INTERVIEW_SCORE, 60.5, 8.0) -> 1, 2,
            1 => leaf(0.15),
            2 => split(SKILLS_MATCH_PERCENT, 55.5, 3.0) -> 3, 4,
            3 => leaf(0.35),
            4 => leaf(0.85),
        })
        .with_tree(decision_tree! {
            0 => split(SSC_PERCENTAGE, 65.5, 5.0) -> 1, 2,
            1 => leaf(0.2),
            2 => split(DEGREE_PERCENTAGE, 62.5, 2.0) -> 3, 4,
            3 => leaf(0.45),
            4 => leaf(0.8),
        })
        .with_tree(decision_tree! {
            0 => split(WORK_EXPERIENCE_YES, 0.5, 4.0) -> 1, 2,
            1 => split(EMP_TEST_PERCENTAGE, 70.5, 1.5) -> 3, 4,
            2 => leaf(0.75),
            3 => leaf(0.2),
            4 => leaf(0.55),
        })
        .with_tree(decision_tree! {
            0 => split(MBA_PERCENT, 0.0, 2.5) -> 1, 2,
            1 => leaf(0.3),
            2 => split(NUM_CERTIFICATIONS, 2.5, 1.0) -> 3, 4,
            3 => leaf(0.55),
            4 => leaf(0.8),
        })
        .with_tree(decision_tree! {
            0 => split(SKILLS_MATCH_PERCENT, 60.5, 6.0) -> 1, 2,
            1 => split(INTERVIEW_SCORE, 70.5, 2.0) -> 3, 4,
            2 => leaf(0.85),
            3 => leaf(0.1),
            4 => leaf(0.4),
        })
}

/// Demo random-forest model.
pub fn demo_model() -> Model {
    let preprocessor = demo_preprocessor();
    let ensemble = TreeEnsemble::new(demo_forest(), Aggregation::Average, preprocessor.n_features())
        .expect("demo forest is valid");
    let meta = ModelMeta {
        name: Some("demo-random-forest".into()),
        description: Some("Hand-built forest for tests".into()),
        trained_at: None,
    };
    Model::new(preprocessor, Classifier::new(DecisionFunction::TreeEnsemble(ensemble)), meta)
        .expect("demo model is consistent")
}

/// Logistic-regression model over the demo encoding. Exposes no importances.
pub fn linear_model() -> Model {
    use features::*;

    let preprocessor = demo_preprocessor();
    let mut weights = vec![0.0; preprocessor.n_features()];
    weights[SSC_PERCENTAGE as usize] = 0.02;
    weights[SKILLS_MATCH_PERCENT as usize] = 0.04;
    weights[INTERVIEW_SCORE as usize] = 0.05;
    weights[WORK_EXPERIENCE_YES as usize] = 0.8;
    let linear = LinearModel::new(weights, -10.0);

    let meta = ModelMeta { name: Some("demo-logistic".into()), ..Default::default() };
    Model::new(preprocessor, Classifier::new(DecisionFunction::Linear(linear)), meta)
        .expect("linear model is consistent")
}

/// High-signal candidate: strong academics, skills, interview and experience.
pub fn strong_profile() -> CandidateProfile {
    CandidateProfile {
        gender: Gender::Male,
        ssc_percentage: 85.0,
        ssc_board: Board::Central,
        hsc_percentage: 82.0,
        hsc_board: Board::Central,
        hsc_subject: HscSubject::Science,
        degree_percentage: 78.0,
        undergrad_degree: UndergradDegree::SciTech,
        specialisation: Specialisation::MarketingFinance,
        mba_percent: 75.0,
        work_experience: WorkExperience::Yes,
        years_experience: 3,
        internship_completed: 1,
        skills_match_percent: 88,
        num_certifications: 5,
        emp_test_percentage: 85,
        interview_score: 90,
        company_tier: CompanyTier::Mnc,
        job_competition_level: CompetitionLevel::Medium,
    }
}

/// Low-signal candidate.
pub fn weak_profile() -> CandidateProfile {
    CandidateProfile {
        gender: Gender::Female,
        ssc_percentage: 52.0,
        ssc_board: Board::Others,
        hsc_percentage: 50.0,
        hsc_board: Board::Others,
        hsc_subject: HscSubject::Arts,
        degree_percentage: 55.0,
        undergrad_degree: UndergradDegree::Others,
        specialisation: Specialisation::MarketingHr,
        mba_percent: 52.0,
        work_experience: WorkExperience::No,
        years_experience: 0,
        internship_completed: 0,
        skills_match_percent: 35,
        num_certifications: 0,
        emp_test_percentage: 40,
        interview_score: 45,
        company_tier: CompanyTier::Startup,
        job_competition_level: CompetitionLevel::High,
    }
}

/// The raw record form of a profile.
pub fn to_record(profile: &CandidateProfile) -> RawRecord {
    match serde_json::to_value(profile) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        other => panic!("profile did not serialize to an object: {other:?}"),
    }
}
