//! Explanations of a prediction.
//!
//! An explanation pairs the model's global feature-importance ranking with the
//! candidate's own values for a curated set of key fields. The key values are
//! local context only; they are not a per-candidate attribution.
//!
//! Models that cannot expose importances yield [`Explanation::Unavailable`],
//! which never affects prediction.

mod ranking;

use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::classifier::IntrospectionUnavailable;
use crate::pipeline::InferencePipeline;
use crate::schema::{CandidateProfile, FieldId, FieldValue};

pub use ranking::{ImportanceRanking, RankedFeature};

/// Default number of ranked features.
pub const DEFAULT_TOP_K: usize = 10;

/// Fields shown as candidate context, in display order.
pub const KEY_FIELDS: [FieldId; 9] = [
    FieldId::SscPercentage,
    FieldId::DegreePercentage,
    FieldId::MbaPercent,
    FieldId::SkillsMatchPercent,
    FieldId::InterviewScore,
    FieldId::EmpTestPercentage,
    FieldId::YearsExperience,
    FieldId::NumCertifications,
    FieldId::WorkExperience,
];

/// A candidate's value for one key field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub field: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

/// Ranked global importances plus the candidate's key values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationResult {
    pub ranking: ImportanceRanking,
    pub candidate_values: Vec<KeyValue>,
}

/// Outcome of an explanation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Explanation {
    Available(ExplanationResult),
    Unavailable {
        #[serde(serialize_with = "serialize_display")]
        reason: IntrospectionUnavailable,
    },
}

impl Explanation {
    #[inline]
    pub fn is_available(&self) -> bool {
        matches!(self, Explanation::Available(_))
    }

    pub fn result(&self) -> Option<&ExplanationResult> {
        match self {
            Explanation::Available(result) => Some(result),
            Explanation::Unavailable { .. } => None,
        }
    }
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Builds explanations from a pipeline's global importances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explainer {
    top_k: usize,
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Explainer {
    /// Explainer reporting the top [`DEFAULT_TOP_K`] features.
    pub fn new() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }

    /// Explainer reporting the top `k` features.
    pub fn with_top_k(top_k: usize) -> Self {
        Self { top_k }
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Explain a prediction for `profile`.
    ///
    /// The ranking is the same for every profile; only the key values vary.
    pub fn explain(&self, profile: &CandidateProfile, pipeline: &InferencePipeline) -> Explanation {
        let scores = match pipeline.feature_importances() {
            Ok(scores) => scores,
            Err(reason) => {
                tracing::warn!(%reason, "feature importance explanation is not available");
                return Explanation::Unavailable { reason };
            }
        };

        let ranking = ImportanceRanking::from_scores(pipeline.feature_names(), &scores).top_k(self.top_k);
        Explanation::Available(ExplanationResult {
            ranking,
            candidate_values: key_values(profile),
        })
    }
}

/// The candidate's values for [`KEY_FIELDS`].
pub fn key_values(profile: &CandidateProfile) -> Vec<KeyValue> {
    KEY_FIELDS
        .iter()
        .map(|&field| {
            let spec = field.spec();
            KeyValue {
                field: spec.name,
                label: spec.label,
                value: profile.value(field),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{demo_model, linear_model, strong_profile, weak_profile};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    #[test]
    fn ranking_uses_global_importances() {
        let pipeline = InferencePipeline::from_model(demo_model());
        let explanation = Explainer::new().explain(&strong_profile(), &pipeline);
        let result = explanation.result().unwrap();

        assert_eq!(result.ranking.len(), 10);
        let names: Vec<&str> = result.ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            &names[..8],
            &[
                "num__skills_match_percent",
                "num__interview_score",
                "cat__work_experience_Yes",
                "num__ssc_percentage",
                "num__mba_percent",
                "num__degree_percentage",
                "num__num_certifications",
                "num__emp_test_percentage",
            ]
        );
        assert_abs_diff_eq!(result.ranking.as_slice()[0].importance, 0.9 / 4.4, epsilon = 1e-9);
    }

    #[test]
    fn ranking_is_profile_independent() {
        let pipeline = InferencePipeline::from_model(demo_model());
        let explainer = Explainer::with_top_k(3);
        let a = explainer.explain(&strong_profile(), &pipeline);
        let b = explainer.explain(&weak_profile(), &pipeline);
        assert_eq!(a.result().unwrap().ranking, b.result().unwrap().ranking);
        assert_ne!(a.result().unwrap().candidate_values, b.result().unwrap().candidate_values);
    }

    #[test]
    fn key_values_follow_curated_order() {
        let values = key_values(&strong_profile());
        let fields: Vec<&str> = values.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "ssc_percentage",
                "degree_percentage",
                "mba_percent",
                "skills_match_percent",
                "interview_score",
                "emp_test_percentage",
                "years_experience",
                "num_certifications",
                "work_experience",
            ]
        );
        assert_eq!(values[8].value, FieldValue::Category("Yes"));
    }

    #[test]
    fn linear_model_degrades_to_unavailable() {
        let pipeline = InferencePipeline::from_model(linear_model());
        let explanation = Explainer::new().explain(&strong_profile(), &pipeline);
        assert!(!explanation.is_available());

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(
            json,
            json!({
                "status": "unavailable",
                "reason": "logistic_regression models do not expose feature importances"
            })
        );
    }

    #[test]
    fn available_serializes_with_status() {
        let pipeline = InferencePipeline::from_model(demo_model());
        let json = serde_json::to_value(Explainer::with_top_k(1).explain(&weak_profile(), &pipeline)).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["ranking"][0]["name"], "num__skills_match_percent");
        assert_eq!(json["candidate_values"][0]["value"], 52.0);
    }
}
