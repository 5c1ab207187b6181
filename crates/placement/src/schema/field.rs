//! Canonical field table.
//!
//! Every candidate attribute is listed here exactly once, with its semantic
//! kind and valid domain. The table drives both input validation and the
//! preprocessor's load-time checks.

use super::profile::{
    Board, Categorical, CompanyTier, CompetitionLevel, Gender, HscSubject, Specialisation,
    UndergradDegree, WorkExperience,
};

/// Identifier of a candidate field.
///
/// The discriminant is the field's position in [`FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Gender,
    SscPercentage,
    SscBoard,
    HscPercentage,
    HscBoard,
    HscSubject,
    DegreePercentage,
    UndergradDegree,
    Specialisation,
    MbaPercent,
    WorkExperience,
    YearsExperience,
    InternshipCompleted,
    SkillsMatchPercent,
    NumCertifications,
    EmpTestPercentage,
    InterviewScore,
    CompanyTier,
    JobCompetitionLevel,
}

impl FieldId {
    /// All fields in canonical order.
    pub const ALL: [FieldId; 19] = [
        FieldId::Gender,
        FieldId::SscPercentage,
        FieldId::SscBoard,
        FieldId::HscPercentage,
        FieldId::HscBoard,
        FieldId::HscSubject,
        FieldId::DegreePercentage,
        FieldId::UndergradDegree,
        FieldId::Specialisation,
        FieldId::MbaPercent,
        FieldId::WorkExperience,
        FieldId::YearsExperience,
        FieldId::InternshipCompleted,
        FieldId::SkillsMatchPercent,
        FieldId::NumCertifications,
        FieldId::EmpTestPercentage,
        FieldId::InterviewScore,
        FieldId::CompanyTier,
        FieldId::JobCompetitionLevel,
    ];

    /// The field's specification.
    #[inline]
    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    /// Record key of the field.
    #[inline]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a field by its record key.
    pub fn from_name(name: &str) -> Option<FieldId> {
        FIELDS.iter().find(|spec| spec.name == name).map(|spec| spec.id)
    }
}

/// Semantic type and domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// One value out of a closed set of labels.
    Categorical { values: &'static [&'static str] },
    /// Real number in `[0, 100]`.
    Percentage,
    /// Whole number in `[min, max]`.
    Integer { min: u32, max: u32 },
    /// Boolean stored as `0` / `1`.
    Flag,
}

impl FieldKind {
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, FieldKind::Categorical { .. })
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        !self.is_categorical()
    }

    /// Inclusive numeric bounds, `None` for categorical fields.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            FieldKind::Categorical { .. } => None,
            FieldKind::Percentage => Some((0.0, 100.0)),
            FieldKind::Integer { min, max } => Some((f64::from(min), f64::from(max))),
            FieldKind::Flag => Some((0.0, 1.0)),
        }
    }

    /// Whether values must be whole numbers.
    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self, FieldKind::Integer { .. } | FieldKind::Flag)
    }

    /// Human-readable type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Categorical { .. } => "string",
            FieldKind::Percentage => "number",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Flag => "0 or 1",
        }
    }
}

/// Specification of a single candidate field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub id: FieldId,
    /// Record key.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(id: FieldId, name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { id, name, label, kind }
    }
}

const GENDER: &[&str] = <Gender as Categorical>::VALUES;
const BOARD: &[&str] = <Board as Categorical>::VALUES;
const HSC_SUBJECT: &[&str] = <HscSubject as Categorical>::VALUES;
const UNDERGRAD_DEGREE: &[&str] = <UndergradDegree as Categorical>::VALUES;
const SPECIALISATION: &[&str] = <Specialisation as Categorical>::VALUES;
const YES_NO: &[&str] = <WorkExperience as Categorical>::VALUES;
const COMPANY_TIER: &[&str] = <CompanyTier as Categorical>::VALUES;
const COMPETITION_LEVEL: &[&str] = <CompetitionLevel as Categorical>::VALUES;

/// The canonical field table, indexed by [`FieldId`].
pub static FIELDS: [FieldSpec; 19] = [
    FieldSpec::new(FieldId::Gender, "gender", "Gender", FieldKind::Categorical { values: GENDER }),
    FieldSpec::new(FieldId::SscPercentage, "ssc_percentage", "SSC Percentage (10th)", FieldKind::Percentage),
    FieldSpec::new(FieldId::SscBoard, "ssc_board", "SSC Board", FieldKind::Categorical { values: BOARD }),
    FieldSpec::new(FieldId::HscPercentage, "hsc_percentage", "HSC Percentage (12th)", FieldKind::Percentage),
    FieldSpec::new(FieldId::HscBoard, "hsc_board", "HSC Board", FieldKind::Categorical { values: BOARD }),
    FieldSpec::new(
        FieldId::HscSubject,
        "hsc_subject",
        "HSC Subject",
        FieldKind::Categorical { values: HSC_SUBJECT },
    ),
    FieldSpec::new(FieldId::DegreePercentage, "degree_percentage", "Degree Percentage", FieldKind::Percentage),
    FieldSpec::new(
        FieldId::UndergradDegree,
        "undergrad_degree",
        "Undergrad Degree",
        FieldKind::Categorical { values: UNDERGRAD_DEGREE },
    ),
    FieldSpec::new(
        FieldId::Specialisation,
        "specialisation",
        "MBA Specialisation",
        FieldKind::Categorical { values: SPECIALISATION },
    ),
    FieldSpec::new(FieldId::MbaPercent, "mba_percent", "MBA Percentage", FieldKind::Percentage),
    FieldSpec::new(
        FieldId::WorkExperience,
        "work_experience",
        "Prior Work Experience",
        FieldKind::Categorical { values: YES_NO },
    ),
    FieldSpec::new(
        FieldId::YearsExperience,
        "years_experience",
        "Years of Experience",
        FieldKind::Integer { min: 0, max: 15 },
    ),
    FieldSpec::new(FieldId::InternshipCompleted, "internship_completed", "Internship Completed", FieldKind::Flag),
    FieldSpec::new(
        FieldId::SkillsMatchPercent,
        "skills_match_percent",
        "Skills Match Percent",
        FieldKind::Integer { min: 0, max: 100 },
    ),
    FieldSpec::new(
        FieldId::NumCertifications,
        "num_certifications",
        "Number of Certifications",
        FieldKind::Integer { min: 0, max: 20 },
    ),
    FieldSpec::new(
        FieldId::EmpTestPercentage,
        "emp_test_percentage",
        "Employability / Aptitude Test (%)",
        FieldKind::Integer { min: 0, max: 100 },
    ),
    FieldSpec::new(
        FieldId::InterviewScore,
        "interview_score",
        "Interview Score (0-100)",
        FieldKind::Integer { min: 0, max: 100 },
    ),
    FieldSpec::new(
        FieldId::CompanyTier,
        "company_tier",
        "Company Tier",
        FieldKind::Categorical { values: COMPANY_TIER },
    ),
    FieldSpec::new(
        FieldId::JobCompetitionLevel,
        "job_competition_level",
        "Job Competition Level",
        FieldKind::Categorical { values: COMPETITION_LEVEL },
    ),
];

/// Look up a field specification by record key.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FieldId::from_name(name).map(FieldId::spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_id() {
        for (i, spec) in FIELDS.iter().enumerate() {
            assert_eq!(spec.id as usize, i, "{} is out of place", spec.name);
            assert_eq!(FieldId::ALL[i], spec.id);
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(FieldId::from_name("mba_percent"), Some(FieldId::MbaPercent));
        assert_eq!(field("interview_score").unwrap().kind, FieldKind::Integer { min: 0, max: 100 });
        assert!(field("salary").is_none());
    }

    #[test]
    fn bounds_follow_kind() {
        assert_eq!(FieldKind::Percentage.bounds(), Some((0.0, 100.0)));
        assert_eq!(FieldKind::Flag.bounds(), Some((0.0, 1.0)));
        assert_eq!(FieldId::YearsExperience.spec().kind.bounds(), Some((0.0, 15.0)));
        assert_eq!(FieldId::Gender.spec().kind.bounds(), None);
    }
}
