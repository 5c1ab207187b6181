//! Validation of untyped candidate records.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::field::{FieldId, FieldKind};
use super::profile::{check_range, CandidateProfile, Categorical};

/// Untyped inbound record: field name → JSON value.
///
/// Keys that are not candidate fields are ignored.
pub type RawRecord = BTreeMap<String, Value>;

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViolationReason {
    #[error("missing")]
    Missing,

    #[error("expected {expected}, got {got}")]
    WrongType { expected: &'static str, got: &'static str },

    #[error("{got} is outside [{min}, {max}]")]
    OutOfRange { min: f64, max: f64, got: f64 },

    #[error("{got:?} is not one of {allowed:?}")]
    UnknownCategory { got: String, allowed: &'static [&'static str] },

    #[error("{got} is not a whole number")]
    NotAnInteger { got: f64 },
}

/// A violated field and the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: ViolationReason,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// A candidate record failed validation.
///
/// Lists every violated field, in canonical field order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid candidate record: {}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub(crate) fn new(violations: Vec<FieldViolation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Names of the violated fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    /// Whether `field` is among the violations.
    pub fn contains(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Accumulates violations while reading a record.
struct Checker<'a> {
    record: &'a RawRecord,
    violations: Vec<FieldViolation>,
}

impl<'a> Checker<'a> {
    fn new(record: &'a RawRecord) -> Self {
        Self { record, violations: Vec::new() }
    }

    fn reject(&mut self, field: FieldId, reason: ViolationReason) {
        self.violations.push(FieldViolation { field: field.name(), reason });
    }

    fn get(&mut self, field: FieldId) -> Option<&'a Value> {
        match self.record.get(field.name()) {
            Some(Value::Null) | None => {
                self.reject(field, ViolationReason::Missing);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn category<T: Categorical>(&mut self, field: FieldId) -> Option<T> {
        let value = self.get(field)?;
        let Some(label) = value.as_str() else {
            self.reject(field, wrong_type(field.spec().kind, value));
            return None;
        };
        // Labels match exactly; surrounding whitespace is not stripped.
        let parsed = T::parse(label);
        if parsed.is_none() {
            self.reject(
                field,
                ViolationReason::UnknownCategory {
                    got: label.to_string(),
                    allowed: T::VALUES,
                },
            );
        }
        parsed
    }

    /// Read a numeric field and check it against the field's bounds.
    fn number(&mut self, field: FieldId) -> Option<f64> {
        let kind = field.spec().kind;
        let value = self.get(field)?;
        let x = match value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) if matches!(kind, FieldKind::Flag) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        let Some(x) = x else {
            self.reject(field, wrong_type(kind, value));
            return None;
        };

        if kind.is_integral() && x.fract() != 0.0 {
            self.reject(field, ViolationReason::NotAnInteger { got: x });
            return None;
        }
        if let Some(bounds) = kind.bounds() {
            if let Err(reason) = check_range(x, bounds) {
                self.reject(field, reason);
                return None;
            }
        }
        Some(x)
    }

    fn integer(&mut self, field: FieldId) -> Option<u32> {
        // Bounds are checked in `number`, so the cast cannot truncate.
        self.number(field).map(|x| x as u32)
    }

    fn into_error(self) -> ValidationError {
        ValidationError::new(self.violations)
    }
}

fn wrong_type(kind: FieldKind, value: &Value) -> ViolationReason {
    let got = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ViolationReason::WrongType { expected: kind.type_name(), got }
}

/// Validate a raw record into a [`CandidateProfile`].
///
/// Every field is checked for presence, type and domain; the error lists all
/// violations at once. Nothing is defaulted.
pub fn validate(record: &RawRecord) -> Result<CandidateProfile, ValidationError> {
    let mut c = Checker::new(record);

    let gender = c.category(FieldId::Gender);
    let ssc_percentage = c.number(FieldId::SscPercentage);
    let ssc_board = c.category(FieldId::SscBoard);
    let hsc_percentage = c.number(FieldId::HscPercentage);
    let hsc_board = c.category(FieldId::HscBoard);
    let hsc_subject = c.category(FieldId::HscSubject);
    let degree_percentage = c.number(FieldId::DegreePercentage);
    let undergrad_degree = c.category(FieldId::UndergradDegree);
    let specialisation = c.category(FieldId::Specialisation);
    let mba_percent = c.number(FieldId::MbaPercent);
    let work_experience = c.category(FieldId::WorkExperience);
    let years_experience = c.integer(FieldId::YearsExperience);
    let internship_completed = c.integer(FieldId::InternshipCompleted);
    let skills_match_percent = c.integer(FieldId::SkillsMatchPercent);
    let num_certifications = c.integer(FieldId::NumCertifications);
    let emp_test_percentage = c.integer(FieldId::EmpTestPercentage);
    let interview_score = c.integer(FieldId::InterviewScore);
    let company_tier = c.category(FieldId::CompanyTier);
    let job_competition_level = c.category(FieldId::JobCompetitionLevel);

    // A `None` anywhere means a violation was recorded for that field.
    match (
        gender,
        ssc_percentage,
        ssc_board,
        hsc_percentage,
        hsc_board,
        hsc_subject,
        degree_percentage,
        undergrad_degree,
        specialisation,
        mba_percent,
        work_experience,
        years_experience,
        internship_completed,
        skills_match_percent,
        num_certifications,
        emp_test_percentage,
        interview_score,
        company_tier,
        job_competition_level,
    ) {
        (
            Some(gender),
            Some(ssc_percentage),
            Some(ssc_board),
            Some(hsc_percentage),
            Some(hsc_board),
            Some(hsc_subject),
            Some(degree_percentage),
            Some(undergrad_degree),
            Some(specialisation),
            Some(mba_percent),
            Some(work_experience),
            Some(years_experience),
            Some(internship_completed),
            Some(skills_match_percent),
            Some(num_certifications),
            Some(emp_test_percentage),
            Some(interview_score),
            Some(company_tier),
            Some(job_competition_level),
        ) => Ok(CandidateProfile {
            gender,
            ssc_percentage,
            ssc_board,
            hsc_percentage,
            hsc_board,
            hsc_subject,
            degree_percentage,
            undergrad_degree,
            specialisation,
            mba_percent,
            work_experience,
            years_experience,
            internship_completed: internship_completed as u8,
            skills_match_percent,
            num_certifications,
            emp_test_percentage,
            interview_score,
            company_tier,
            job_competition_level,
        }),
        _ => Err(c.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::profile::{Specialisation, WorkExperience};
    use crate::testing::{strong_profile, to_record};
    use serde_json::json;

    #[test]
    fn valid_record_round_trips_profile() {
        let profile = strong_profile();
        let parsed = validate(&to_record(&profile)).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn out_of_range_percentage_is_named() {
        let mut record = to_record(&strong_profile());
        record.insert("ssc_percentage".into(), json!(150));

        let err = validate(&record).unwrap_err();
        assert_eq!(err.fields(), vec!["ssc_percentage"]);
        assert!(matches!(
            err.violations()[0].reason,
            ViolationReason::OutOfRange { got, .. } if got == 150.0
        ));
    }

    #[test]
    fn reports_every_violation() {
        let mut record = to_record(&strong_profile());
        record.remove("gender");
        record.insert("hsc_subject".into(), json!("Biology"));
        record.insert("years_experience".into(), json!(2.5));
        record.insert("interview_score".into(), json!("90"));
        record.insert("num_certifications".into(), json!(21));

        let err = validate(&record).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["gender", "hsc_subject", "years_experience", "num_certifications", "interview_score"]
        );
        assert_eq!(err.violations()[0].reason, ViolationReason::Missing);
        assert!(matches!(err.violations()[2].reason, ViolationReason::NotAnInteger { .. }));
        assert!(matches!(
            err.violations()[4].reason,
            ViolationReason::WrongType { expected: "integer", got: "string" }
        ));
    }

    #[test]
    fn null_counts_as_missing() {
        let mut record = to_record(&strong_profile());
        record.insert("mba_percent".into(), Value::Null);
        let err = validate(&record).unwrap_err();
        assert_eq!(err.violations()[0].reason, ViolationReason::Missing);
    }

    #[test]
    fn empty_record_lists_all_fields() {
        let err = validate(&RawRecord::new()).unwrap_err();
        assert_eq!(err.violations().len(), 19);
    }

    #[test]
    fn flag_accepts_booleans_and_aliases_are_resolved() {
        let mut record = to_record(&strong_profile());
        record.insert("internship_completed".into(), json!(false));
        record.insert("specialisation".into(), json!("Mkt&HR"));
        record.insert("work_experience".into(), json!("No"));
        record.insert("salary_expectation".into(), json!(1_000_000));

        let profile = validate(&record).unwrap();
        assert_eq!(profile.internship_completed, 0);
        assert_eq!(profile.specialisation, Specialisation::MarketingHr);
        assert_eq!(profile.work_experience, WorkExperience::No);
    }

    #[test]
    fn padded_category_label_is_rejected() {
        let mut record = to_record(&strong_profile());
        record.insert("gender".into(), json!(" Male "));
        record.insert("company_tier".into(), json!("MNC\n"));

        let err = validate(&record).unwrap_err();
        assert_eq!(err.fields(), vec!["gender", "company_tier"]);
        assert!(matches!(
            &err.violations()[0].reason,
            ViolationReason::UnknownCategory { got, .. } if got == " Male "
        ));
    }

    #[test]
    fn flag_rejects_two() {
        let mut record = to_record(&strong_profile());
        record.insert("internship_completed".into(), json!(2));
        let err = validate(&record).unwrap_err();
        assert!(err.contains("internship_completed"));
    }

    #[test]
    fn display_joins_violations() {
        let mut record = to_record(&strong_profile());
        record.insert("ssc_percentage".into(), json!(-1));
        record.insert("company_tier".into(), json!("Unicorn"));
        let msg = validate(&record).unwrap_err().to_string();
        assert!(msg.contains("ssc_percentage: -1 is outside [0, 100]"), "{msg}");
        assert!(msg.contains("company_tier: \"Unicorn\" is not one of"), "{msg}");
    }
}
