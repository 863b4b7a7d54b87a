use serde_json::json;
use skiplogic_eval::{Value, ValueMap};
use skiplogic_runner::{SurveyExpressionRunner, SurveySchema};
use skiplogic_validate::{ValidationEngine, ValidationOptions};
use std::collections::HashMap;
use std::sync::Arc;

fn survey() -> SurveySchema {
    serde_json::from_value(json!({
        "pages": [
            {"name": "about", "elements": [
                {"type": "nps", "name": "score", "isRequired": true,
                 "validators": [{"type": "numeric", "minValue": 0, "maxValue": 10}]},
                {"type": "text", "name": "why", "visibleIf": "{score} <= 6", "requiredIf": "{score} <= 3",
                 "validators": [{"type": "text", "minLength": 10}]},
                {"type": "checkbox", "name": "channels",
                 "validators": [{"type": "answercount", "maxCount": 2}]}
            ]},
            {"name": "contact", "elements": [
                {"type": "text", "name": "email", "inputType": "email",
                 "validators": [{"type": "email", "text": "Enter a real address"}]}
            ]}
        ]
    }))
    .unwrap()
}

fn map(j: serde_json::Value) -> ValueMap {
    serde_json::from_value(j).unwrap()
}

#[test]
fn required_empty_field_reports_only_required() {
    let validation = ValidationEngine::default();
    let survey = survey();
    let score = &survey.pages[0].elements[0];
    let r = validation.validate_question(score, &Value::Null, &ValueMap::new(), None);
    assert_eq!(r.errors.len(), 1);
    assert_eq!(r.errors[0].validator_type, "required");
}

#[test]
fn survey_wide_errors_are_flattened() {
    let validation = ValidationEngine::default();
    let values = map(json!({"score": 11, "channels": ["a", "b", "c"], "email": "nope"}));
    let r = validation.validate_survey(&survey(), &values, &ValidationOptions::default());
    assert!(!r.is_valid);
    let names: Vec<_> = r.errors.iter().map(|e| e.question_name.as_str()).collect();
    assert_eq!(names, vec!["score", "channels", "email"]);
    assert_eq!(r.errors[2].message, "Enter a real address");
}

#[test]
fn hidden_questions_are_skipped_survey_wide() {
    let validation = ValidationEngine::default();
    let values = map(json!({"score": 2, "why": "bad"}));
    let options = ValidationOptions {
        required_overrides: HashMap::from([("why".to_string(), true)]),
        visibility_overrides: HashMap::new(),
    };
    let r = validation.validate_survey(&survey(), &values, &options);
    assert_eq!(r.errors.len(), 1);
    assert_eq!(r.errors[0].question_name, "why");

    let options = ValidationOptions {
        visibility_overrides: HashMap::from([("why".to_string(), false)]),
        ..options
    };
    assert!(validation.validate_survey(&survey(), &values, &options).is_valid);
}

#[test]
fn runner_drives_visibility_and_requiredness() {
    let mut runner = SurveyExpressionRunner::new(survey());
    let validation = ValidationEngine::new(Arc::clone(runner.engine()));
    let page = runner.survey().pages[0].clone();

    runner.set_value("score", 9);
    assert!(validation.validate_visible_page(&runner, &page).is_valid);

    runner.set_value("score", 2);
    let r = validation.validate_visible_page(&runner, &page);
    assert_eq!(r.errors.len(), 1);
    assert_eq!(r.errors[0].question_name, "why");
    assert_eq!(r.errors[0].validator_type, "required");

    runner.set_value("why", "too short");
    let r = validation.validate_visible_page(&runner, &page);
    assert_eq!(r.errors[0].validator_type, "text");
}

#[test]
fn hidden_panel_hides_its_required_children() {
    let survey: SurveySchema = serde_json::from_value(json!({
        "pages": [{"name": "p1", "elements": [
            {"type": "text", "name": "top"},
            {"type": "panel", "name": "details", "elements": [
                {"type": "text", "name": "street", "isRequired": true},
                {"type": "panel", "name": "inner", "elements": [
                    {"type": "text", "name": "zip", "isRequired": true}
                ]}
            ]}
        ]}]
    }))
    .unwrap();
    let validation = ValidationEngine::default();
    let values = ValueMap::new();

    let shown = validation.validate_survey(&survey, &values, &ValidationOptions::default());
    let names: Vec<_> = shown.errors.iter().map(|e| e.question_name.as_str()).collect();
    assert_eq!(names, vec!["street", "zip"]);

    let options = ValidationOptions {
        visibility_overrides: HashMap::from([("details".to_string(), false)]),
        ..ValidationOptions::default()
    };
    assert!(validation.validate_survey(&survey, &values, &options).is_valid);

    let options = ValidationOptions {
        visibility_overrides: HashMap::from([("p1".to_string(), false)]),
        ..ValidationOptions::default()
    };
    assert!(validation.validate_survey(&survey, &values, &options).is_valid);
}
