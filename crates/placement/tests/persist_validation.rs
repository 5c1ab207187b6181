//! Load-time validation failures for mutated model artifacts.

use std::path::PathBuf;

use placement::persist::ModelLoadError;
use placement::preprocess::PreprocessError;
use placement::repr::TreeValidationError;
use placement::Model;
use serde_json::{json, Value};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases").join(name)
}

fn load_fixture_value(name: &str) -> Value {
    let bytes = std::fs::read(fixture_path(name)).expect("read fixture");
    serde_json::from_slice(&bytes).expect("parse fixture json")
}

fn forest_value() -> Value {
    load_fixture_value("demo_forest.model.json")
}

fn load_err(v: Value) -> ModelLoadError {
    let json = serde_json::to_string(&v).expect("serialize mutated json");
    Model::from_json_str(&json).expect_err("expected error")
}

fn tree_array<'a>(v: &'a mut Value, tree: usize, key: &str) -> &'a mut Vec<Value> {
    v.pointer_mut(&format!("/classifier/trees/{tree}/{key}"))
        .and_then(|x| x.as_array_mut())
        .expect("tree array")
}

#[test]
fn unmodified_fixture_loads() {
    Model::from_json_str(&forest_value().to_string()).expect("fixture is valid");
}

// =============================================================================
// Envelope
// =============================================================================

#[test]
fn validation_fails_on_foreign_format() {
    let mut v = forest_value();
    v["format"] = json!("xgboost");
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::UnsupportedFormat { ref found, .. } if found == "xgboost"), "got: {err:?}");
}

#[test]
fn validation_fails_on_future_version() {
    let mut v = forest_value();
    v["version"] = json!(2);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::UnsupportedVersion { found: 2, supported: 1 }), "got: {err:?}");
}

#[test]
fn validation_fails_on_threshold_out_of_range() {
    let mut v = forest_value();
    v["threshold"] = json!(1.5);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::InvalidThreshold(t) if t == 1.5), "got: {err:?}");
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Model::from_json_str("{\"format\": ").expect_err("expected error");
    assert!(matches!(err, ModelLoadError::Parse(_)), "got: {err:?}");

    let mut v = forest_value();
    v["classifier"]["type"] = json!("svm");
    assert!(matches!(load_err(v), ModelLoadError::Parse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Model::load(fixture_path("does_not_exist.json")).expect_err("expected error");
    assert!(matches!(err, ModelLoadError::Io { .. }), "got: {err:?}");
    assert!(err.to_string().contains("does_not_exist.json"));
}

// =============================================================================
// Preprocessor
// =============================================================================

#[test]
fn validation_fails_on_unknown_field() {
    let mut v = forest_value();
    v["preprocessor"]["steps"][0]["field"] = json!("gpa");
    let err = load_err(v);
    assert!(
        matches!(err, ModelLoadError::Preprocessor(PreprocessError::UnknownField { ref name }) if name == "gpa"),
        "got: {err:?}"
    );
}

#[test]
fn validation_fails_on_unknown_category() {
    let mut v = forest_value();
    let steps = v["preprocessor"]["steps"].as_array_mut().expect("steps array");
    let tier = steps
        .iter_mut()
        .find(|s| s["field"] == "company_tier")
        .expect("company_tier step");
    tier["categories"] = json!(["MNC", "Mid-size", "Enterprise"]);

    let err = load_err(v);
    assert!(
        matches!(err, ModelLoadError::Preprocessor(PreprocessError::UnknownCategory { field: "company_tier", .. })),
        "got: {err:?}"
    );
}

#[test]
fn validation_fails_on_duplicate_step() {
    let mut v = forest_value();
    let steps = v["preprocessor"]["steps"].as_array_mut().expect("steps array");
    let first = steps[0].clone();
    steps.push(first);
    let err = load_err(v);
    assert!(
        matches!(err, ModelLoadError::Preprocessor(PreprocessError::DuplicateField { field: "ssc_percentage" })),
        "got: {err:?}"
    );
}

#[test]
fn validation_fails_on_one_hot_of_numeric_field() {
    let mut v = forest_value();
    v["preprocessor"]["steps"][0] = json!({
        "type": "one_hot", "field": "ssc_percentage", "categories": ["high"]
    });
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::Preprocessor(PreprocessError::NotCategorical { .. })), "got: {err:?}");
}

#[test]
fn validation_fails_on_zero_scale() {
    let mut v = forest_value();
    v["preprocessor"]["steps"][3]["scale"] = json!(0.0);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::Preprocessor(PreprocessError::InvalidScale { .. })), "got: {err:?}");
}

#[test]
fn validation_fails_when_steps_do_not_match_classifier_width() {
    let mut v = forest_value();
    v["preprocessor"]["steps"].as_array_mut().expect("steps array").remove(1);
    let err = load_err(v);
    assert!(
        matches!(err, ModelLoadError::FeatureCountMismatch { preprocessor: 31, classifier: 32 }),
        "got: {err:?}"
    );
}

// =============================================================================
// Trees
// =============================================================================

#[test]
fn validation_fails_on_mismatched_array_lengths() {
    let mut v = forest_value();
    tree_array(&mut v, 0, "split_indices").pop();
    let err = load_err(v);
    assert!(
        matches!(
            err,
            ModelLoadError::InvalidTree { tree_idx: 0, error: TreeValidationError::LengthMismatch { .. } }
        ),
        "got: {err:?}"
    );
}

#[test]
fn validation_fails_on_out_of_bounds_child_index() {
    let mut v = forest_value();
    tree_array(&mut v, 1, "children_left")[0] = Value::from(9_999_999u64);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::InvalidTree { tree_idx: 1, .. }), "got: {err:?}");
}

#[test]
fn validation_fails_on_cycle() {
    let mut v = forest_value();
    // Node 2 of the first tree points back at the root.
    tree_array(&mut v, 0, "children_left")[2] = Value::from(0u64);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::InvalidTree { tree_idx: 0, .. }), "got: {err:?}");
}

#[test]
fn validation_fails_on_split_feature_out_of_range() {
    let mut v = forest_value();
    tree_array(&mut v, 2, "split_indices")[0] = Value::from(32u64);
    let err = load_err(v);
    assert!(
        matches!(
            err,
            ModelLoadError::InvalidTree { tree_idx: 2, error: TreeValidationError::FeatureOutOfRange { .. } }
        ),
        "got: {err:?}"
    );
}

#[test]
fn validation_fails_on_empty_forest() {
    let mut v = forest_value();
    v["classifier"]["trees"] = json!([]);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::InvalidClassifier(_)), "got: {err:?}");
}

#[test]
fn averaged_ensembles_require_probability_leaves() {
    let mut v = forest_value();
    tree_array(&mut v, 3, "leaf_values")[1] = json!(1.5);
    let err = load_err(v);
    assert!(matches!(err, ModelLoadError::InvalidClassifier(ref msg) if msg.contains("tree 3")), "got: {err:?}");

    let mut v = forest_value();
    v["classifier"]["base_score"] = json!(0.25);
    assert!(matches!(load_err(v), ModelLoadError::InvalidClassifier(_)));
}

#[test]
fn per_node_statistics_other_than_gains_are_ignored() {
    let mut v = forest_value();
    v["classifier"]["trees"][0]["covers"] = json!([40.0, 18.0, 22.0, 9.0, 13.0]);
    let model = Model::from_json_str(&v.to_string()).expect("extra tree keys are ignored");

    let written = serde_json::to_value(model.to_artifact()).expect("serialize artifact");
    assert!(written["classifier"]["trees"][0].get("covers").is_none());
    assert!(written["classifier"]["trees"][0].get("gains").is_some());
}

#[test]
fn boosted_ensembles_accept_margins() {
    let mut v = forest_value();
    v["classifier"]["aggregation"] = json!("boosted");
    v["classifier"]["base_score"] = json!(-1.25);
    tree_array(&mut v, 3, "leaf_values")[1] = json!(-1.5);
    Model::from_json_str(&v.to_string()).expect("boosted model is valid");
}

// =============================================================================
// Linear
// =============================================================================

#[test]
fn linear_weights_must_match_feature_count() {
    let mut v = load_fixture_value("linear.model.json");
    v["classifier"]["weights"].as_array_mut().expect("weights").push(json!(0.0));
    let err = load_err(v);
    assert!(
        matches!(err, ModelLoadError::FeatureCountMismatch { preprocessor: 32, classifier: 33 }),
        "got: {err:?}"
    );
}
