//! Fitted encoding steps.

use crate::schema::{FieldId, FieldValue};

/// A single fitted column transformation.
///
/// Each step reads one candidate field and writes [`width`](Self::width)
/// consecutive outputs.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingStep {
    /// Indicator per training category, named `cat__{field}_{category}`.
    ///
    /// A value outside `categories` encodes as all zeros.
    OneHot {
        field: FieldId,
        categories: Vec<&'static str>,
    },
    /// Numeric value unchanged, named `num__{field}`.
    Passthrough { field: FieldId },
    /// `(x - mean) / scale`, named `num__{field}`.
    Standardize { field: FieldId, mean: f64, scale: f64 },
}

impl EncodingStep {
    /// Field read by this step.
    #[inline]
    pub fn field(&self) -> FieldId {
        match *self {
            EncodingStep::OneHot { field, .. }
            | EncodingStep::Passthrough { field }
            | EncodingStep::Standardize { field, .. } => field,
        }
    }

    /// Number of outputs produced.
    #[inline]
    pub fn width(&self) -> usize {
        match self {
            EncodingStep::OneHot { categories, .. } => categories.len(),
            EncodingStep::Passthrough { .. } | EncodingStep::Standardize { .. } => 1,
        }
    }

    /// Append the output names of this step.
    pub(crate) fn push_names(&self, names: &mut Vec<String>) {
        let field = self.field().name();
        match self {
            EncodingStep::OneHot { categories, .. } => {
                names.extend(categories.iter().map(|c| format!("cat__{field}_{c}")));
            }
            EncodingStep::Passthrough { .. } | EncodingStep::Standardize { .. } => {
                names.push(format!("num__{field}"));
            }
        }
    }

    /// Encode `value` into `out`, which must be exactly [`width`](Self::width) long.
    ///
    /// The value kind is guaranteed by load-time checks; a mismatch yields zeros.
    pub(crate) fn encode(&self, value: FieldValue, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.width());
        match self {
            EncodingStep::OneHot { categories, .. } => {
                out.fill(0.0);
                if let Some(label) = value.as_category() {
                    if let Some(pos) = categories.iter().position(|&c| c == label) {
                        out[pos] = 1.0;
                    }
                }
            }
            EncodingStep::Passthrough { .. } => {
                out[0] = value.as_number().unwrap_or(0.0) as f32;
            }
            EncodingStep::Standardize { mean, scale, .. } => {
                let x = value.as_number().unwrap_or(*mean);
                out[0] = ((x - mean) / scale) as f32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_hot_sets_single_indicator() {
        let step = EncodingStep::OneHot {
            field: FieldId::CompanyTier,
            categories: vec!["MNC", "Mid-size", "Startup"],
        };
        let mut out = [9.0; 3];
        step.encode(FieldValue::Category("Mid-size"), &mut out);
        assert_eq!(out, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unseen_category_encodes_as_zeros() {
        let step = EncodingStep::OneHot {
            field: FieldId::CompanyTier,
            categories: vec!["MNC", "Startup"],
        };
        let mut out = [1.0; 2];
        step.encode(FieldValue::Category("Mid-size"), &mut out);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn standardize_uses_fitted_parameters() {
        let step = EncodingStep::Standardize {
            field: FieldId::MbaPercent,
            mean: 62.0,
            scale: 4.0,
        };
        let mut out = [0.0];
        step.encode(FieldValue::Number(70.0), &mut out);
        assert_relative_eq!(out[0], 2.0);
    }

    #[test]
    fn names_follow_column_transformer_convention() {
        let mut names = Vec::new();
        EncodingStep::OneHot {
            field: FieldId::WorkExperience,
            categories: vec!["No", "Yes"],
        }
        .push_names(&mut names);
        EncodingStep::Passthrough { field: FieldId::InterviewScore }.push_names(&mut names);
        assert_eq!(
            names,
            vec!["cat__work_experience_No", "cat__work_experience_Yes", "num__interview_score"]
        );
    }
}
