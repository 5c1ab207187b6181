//! Property-based tests over generated candidate profiles.

use proptest::prelude::*;

use placement::schema::{
    validate, Board, CandidateProfile, CompanyTier, CompetitionLevel, Gender, HscSubject, Specialisation,
    UndergradDegree, WorkExperience,
};
use placement::testing::{demo_model, linear_model, to_record};
use placement::{InferencePipeline, Placement};

// =============================================================================
// Arbitrary Profiles
// =============================================================================

fn arb_percentage() -> impl Strategy<Value = f64> {
    // Two decimals, as entered in forms.
    (0u32..=10_000).prop_map(|x| f64::from(x) / 100.0)
}

fn arb_candidate() -> impl Strategy<Value = CandidateProfile> {
    let academics = (
        prop_oneof![Just(Gender::Male), Just(Gender::Female)],
        arb_percentage(),
        prop_oneof![Just(Board::Central), Just(Board::Others)],
        arb_percentage(),
        prop_oneof![Just(Board::Central), Just(Board::Others)],
        prop_oneof![Just(HscSubject::Science), Just(HscSubject::Commerce), Just(HscSubject::Arts)],
        arb_percentage(),
        prop_oneof![
            Just(UndergradDegree::SciTech),
            Just(UndergradDegree::CommMgmt),
            Just(UndergradDegree::Others)
        ],
        prop_oneof![Just(Specialisation::MarketingHr), Just(Specialisation::MarketingFinance)],
        arb_percentage(),
    );
    let experience = (
        prop_oneof![Just(WorkExperience::Yes), Just(WorkExperience::No)],
        0u32..=15,
        0u8..=1,
        0u32..=100,
        0u32..=20,
        0u32..=100,
        0u32..=100,
        prop_oneof![Just(CompanyTier::Startup), Just(CompanyTier::MidSize), Just(CompanyTier::Mnc)],
        prop_oneof![
            Just(CompetitionLevel::Low),
            Just(CompetitionLevel::Medium),
            Just(CompetitionLevel::High)
        ],
    );

    (academics, experience).prop_map(
        |(
            (gender, ssc, ssc_board, hsc, hsc_board, hsc_subject, degree, undergrad, specialisation, mba),
            (work, years, internship, skills, certs, emp_test, interview, tier, competition),
        )| CandidateProfile {
            gender,
            ssc_percentage: ssc,
            ssc_board,
            hsc_percentage: hsc,
            hsc_board,
            hsc_subject,
            degree_percentage: degree,
            undergrad_degree: undergrad,
            specialisation,
            mba_percent: mba,
            work_experience: work,
            years_experience: years,
            internship_completed: internship,
            skills_match_percent: skills,
            num_certifications: certs,
            emp_test_percentage: emp_test,
            interview_score: interview,
            company_tier: tier,
            job_competition_level: competition,
        },
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn valid_profiles_survive_record_validation(profile in arb_candidate()) {
        prop_assert_eq!(validate(&to_record(&profile)).unwrap(), profile);
    }

    #[test]
    fn predictions_are_deterministic_probabilities(profile in arb_candidate()) {
        for pipeline in [InferencePipeline::from_model(demo_model()), InferencePipeline::from_model(linear_model())] {
            let first = pipeline.predict(&profile).unwrap();
            let second = pipeline.predict(&profile).unwrap();
            prop_assert_eq!(first, second);

            prop_assert!((0.0..=1.0).contains(&first.probability));
            let placed = first.probability >= pipeline.threshold();
            prop_assert_eq!(first.label == Placement::Placed, placed);
        }
    }

    #[test]
    fn batch_matches_sequential(profiles in prop::collection::vec(arb_candidate(), 0..24)) {
        let pipeline = InferencePipeline::from_model(demo_model());
        let sequential: Vec<_> = profiles.iter().map(|p| pipeline.predict(p)).collect();
        prop_assert_eq!(pipeline.predict_batch(&profiles, 1), sequential.clone());
        prop_assert_eq!(pipeline.predict_batch(&profiles, 0), sequential);
    }

    #[test]
    fn out_of_range_percentage_is_rejected(profile in arb_candidate(), excess in 0.01f64..1000.0) {
        let pipeline = InferencePipeline::from_model(demo_model());
        let mut profile = profile;
        profile.degree_percentage = 100.0 + excess;
        let err = pipeline.predict(&profile).unwrap_err();
        prop_assert_eq!(err.fields(), vec!["degree_percentage"]);
    }
}
