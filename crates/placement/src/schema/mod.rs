//! Feature schema: the canonical candidate fields, their domains, and
//! validation of inbound records.
//!
//! - [`FIELDS`]: ordered field table with kinds and domains
//! - [`CandidateProfile`]: typed, validated candidate record
//! - [`validate`]: untyped [`RawRecord`] → [`CandidateProfile`]

mod field;
mod profile;
mod validate;

pub use field::{field, FieldId, FieldKind, FieldSpec, FIELDS};
pub use profile::{
    canonical_label, Board, CandidateProfile, Categorical, CompanyTier, CompetitionLevel, FieldValue, Gender,
    HscSubject, Specialisation, UndergradDegree, WorkExperience,
};
pub use validate::{validate, FieldViolation, RawRecord, ValidationError, ViolationReason};
