//! Typed candidate profile.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::{FieldId, FIELDS};
use super::validate::{FieldViolation, ValidationError, ViolationReason};

/// A closed set of labels backing a categorical field.
pub trait Categorical: Sized + Copy {
    /// Canonical labels, in declaration order.
    const VALUES: &'static [&'static str];

    /// Canonical label of this value.
    fn as_str(self) -> &'static str;

    /// Parse a canonical label or an accepted alias.
    fn parse(label: &str) -> Option<Self>;
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl Categorical for $name {
            const VALUES: &'static [&'static str] = &[$($label),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn parse(label: &str) -> Option<Self> {
                match label {
                    $($label $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical!(Gender {
    Male => "Male",
    Female => "Female",
});

categorical!(
    /// Secondary / higher-secondary examination board.
    Board {
        Central => "Central",
        Others => "Others",
    }
);

categorical!(HscSubject {
    Science => "Science",
    Commerce => "Commerce",
    Arts => "Arts",
});

categorical!(UndergradDegree {
    SciTech => "Sci&Tech",
    CommMgmt => "Comm&Mgmt",
    Others => "Others",
});

categorical!(
    /// MBA specialisation. The short dataset labels are accepted as aliases.
    Specialisation {
        MarketingHr => "Marketing & HR" | "Mkt&HR",
        MarketingFinance => "Marketing & Finance" | "Mkt&Fin",
    }
);

categorical!(WorkExperience {
    Yes => "Yes",
    No => "No",
});

categorical!(CompanyTier {
    Startup => "Startup",
    MidSize => "Mid-size",
    Mnc => "MNC",
});

categorical!(CompetitionLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

/// Value of a single field, as seen by the preprocessor and the explainer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(&'static str),
}

impl FieldValue {
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            FieldValue::Number(x) => Some(x),
            FieldValue::Category(_) => None,
        }
    }

    #[inline]
    pub fn as_category(&self) -> Option<&'static str> {
        match *self {
            FieldValue::Category(c) => Some(c),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(x) if x.fract() == 0.0 => write!(f, "{x:.0}"),
            FieldValue::Number(x) => write!(f, "{x:.2}"),
            FieldValue::Category(c) => f.write_str(c),
        }
    }
}

/// A complete candidate record with typed fields.
///
/// Categorical fields are closed enums, so only the numeric fields can hold
/// out-of-domain values; [`validate`](Self::validate) checks those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub gender: Gender,
    pub ssc_percentage: f64,
    pub ssc_board: Board,
    pub hsc_percentage: f64,
    pub hsc_board: Board,
    pub hsc_subject: HscSubject,
    pub degree_percentage: f64,
    pub undergrad_degree: UndergradDegree,
    pub specialisation: Specialisation,
    pub mba_percent: f64,
    pub work_experience: WorkExperience,
    pub years_experience: u32,
    pub internship_completed: u8,
    pub skills_match_percent: u32,
    pub num_certifications: u32,
    pub emp_test_percentage: u32,
    pub interview_score: u32,
    pub company_tier: CompanyTier,
    pub job_competition_level: CompetitionLevel,
}

impl CandidateProfile {
    /// Value of one field.
    pub fn value(&self, field: FieldId) -> FieldValue {
        use FieldValue::{Category, Number};

        match field {
            FieldId::Gender => Category(self.gender.as_str()),
            FieldId::SscPercentage => Number(self.ssc_percentage),
            FieldId::SscBoard => Category(self.ssc_board.as_str()),
            FieldId::HscPercentage => Number(self.hsc_percentage),
            FieldId::HscBoard => Category(self.hsc_board.as_str()),
            FieldId::HscSubject => Category(self.hsc_subject.as_str()),
            FieldId::DegreePercentage => Number(self.degree_percentage),
            FieldId::UndergradDegree => Category(self.undergrad_degree.as_str()),
            FieldId::Specialisation => Category(self.specialisation.as_str()),
            FieldId::MbaPercent => Number(self.mba_percent),
            FieldId::WorkExperience => Category(self.work_experience.as_str()),
            FieldId::YearsExperience => Number(f64::from(self.years_experience)),
            FieldId::InternshipCompleted => Number(f64::from(self.internship_completed)),
            FieldId::SkillsMatchPercent => Number(f64::from(self.skills_match_percent)),
            FieldId::NumCertifications => Number(f64::from(self.num_certifications)),
            FieldId::EmpTestPercentage => Number(f64::from(self.emp_test_percentage)),
            FieldId::InterviewScore => Number(f64::from(self.interview_score)),
            FieldId::CompanyTier => Category(self.company_tier.as_str()),
            FieldId::JobCompetitionLevel => Category(self.job_competition_level.as_str()),
        }
    }

    /// Check every numeric field against its domain.
    ///
    /// Reports all violations, not just the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations: Vec<FieldViolation> = FIELDS
            .iter()
            .filter_map(|spec| {
                let bounds = spec.kind.bounds()?;
                let x = self.value(spec.id).as_number()?;
                check_range(x, bounds).err().map(|reason| FieldViolation {
                    field: spec.name,
                    reason,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

/// Resolve a category label (or alias) of a categorical field to its
/// canonical label. `None` for numeric fields and unknown labels.
pub fn canonical_label(field: FieldId, label: &str) -> Option<&'static str> {
    fn resolve<T: Categorical>(label: &str) -> Option<&'static str> {
        T::parse(label).map(T::as_str)
    }

    match field {
        FieldId::Gender => resolve::<Gender>(label),
        FieldId::SscBoard | FieldId::HscBoard => resolve::<Board>(label),
        FieldId::HscSubject => resolve::<HscSubject>(label),
        FieldId::UndergradDegree => resolve::<UndergradDegree>(label),
        FieldId::Specialisation => resolve::<Specialisation>(label),
        FieldId::WorkExperience => resolve::<WorkExperience>(label),
        FieldId::CompanyTier => resolve::<CompanyTier>(label),
        FieldId::JobCompetitionLevel => resolve::<CompetitionLevel>(label),
        _ => None,
    }
}

/// Range check shared by raw and typed validation. NaN is always out of range.
pub(crate) fn check_range(x: f64, (min, max): (f64, f64)) -> Result<(), ViolationReason> {
    if (min..=max).contains(&x) {
        Ok(())
    } else {
        Err(ViolationReason::OutOfRange { min, max, got: x })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::strong_profile;

    #[test]
    fn categorical_labels_and_aliases() {
        assert_eq!(Specialisation::parse("Mkt&HR"), Some(Specialisation::MarketingHr));
        assert_eq!(Specialisation::parse("Marketing & Finance"), Some(Specialisation::MarketingFinance));
        assert_eq!(CompanyTier::MidSize.as_str(), "Mid-size");
        assert_eq!(UndergradDegree::VALUES, &["Sci&Tech", "Comm&Mgmt", "Others"]);
        assert!(Gender::parse("male").is_none());
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&UndergradDegree::SciTech).unwrap();
        assert_eq!(json, r#""Sci&Tech""#);
        let parsed: Specialisation = serde_json::from_str(r#""Mkt&Fin""#).unwrap();
        assert_eq!(parsed, Specialisation::MarketingFinance);
    }

    #[test]
    fn value_reads_every_field() {
        let profile = strong_profile();
        assert_eq!(profile.value(FieldId::Gender), FieldValue::Category("Male"));
        assert_eq!(profile.value(FieldId::InterviewScore), FieldValue::Number(90.0));
        assert_eq!(profile.value(FieldId::WorkExperience), FieldValue::Category("Yes"));
        for id in FieldId::ALL {
            let value = profile.value(id);
            assert_eq!(value.as_category().is_some(), id.spec().kind.is_categorical());
        }
    }

    #[test]
    fn typed_validation_reports_all_fields() {
        let mut profile = strong_profile();
        profile.ssc_percentage = 150.0;
        profile.mba_percent = f64::NAN;
        profile.years_experience = 16;

        let err = profile.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["ssc_percentage", "mba_percent", "years_experience"]);
    }

    #[test]
    fn canonical_labels_resolve_aliases() {
        assert_eq!(canonical_label(FieldId::Specialisation, "Mkt&Fin"), Some("Marketing & Finance"));
        assert_eq!(canonical_label(FieldId::HscBoard, "Central"), Some("Central"));
        assert_eq!(canonical_label(FieldId::CompanyTier, "Enterprise"), None);
        assert_eq!(canonical_label(FieldId::MbaPercent, "70"), None);
    }

    #[test]
    fn field_value_display() {
        assert_eq!(FieldValue::Number(90.0).to_string(), "90");
        assert_eq!(FieldValue::Number(72.456).to_string(), "72.46");
        assert_eq!(FieldValue::Category("Yes").to_string(), "Yes");
    }
}
