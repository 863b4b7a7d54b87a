use serde_json::json;
use skiplogic_ast::ast_hash;
use skiplogic_runner::{
    parse_expression, CacheConfig, EngineConfig, ExpressionEngine, RunOptions, SurveyExpressionRunner, SurveySchema,
    Value, ValueMap,
};

fn map(j: serde_json::Value) -> ValueMap {
    serde_json::from_value(j).unwrap()
}

fn run(engine: &ExpressionEngine, src: &str, values: serde_json::Value) -> Value {
    engine.run_expression(Some(src), &map(values), &RunOptions::new())
}

#[test]
fn parsing_is_deterministic() {
    for src in [
        "{a} + 1 * 2",
        "iif({q1} >= 9, 'promoter', 'other')",
        "not ({x} empty) and {y} anyof ['a', 'b']",
        "-{a} ^ 2 % 3",
    ] {
        let a = parse_expression(src).unwrap();
        let b = parse_expression(src).unwrap();
        assert_eq!(a, b);
        assert_eq!(ast_hash(&a), ast_hash(&b));
    }
}

#[test]
fn repeated_runs_agree() {
    let engine = ExpressionEngine::default();
    let values = json!({"q": [1, 2, 3]});
    let first = run(&engine, "sum({q}) / count({q})", values.clone());
    assert_eq!(first, run(&engine, "sum({q}) / count({q})", values));
    assert_eq!(first, Value::Number(2.0));
}

#[test]
fn precedence() {
    let engine = ExpressionEngine::default();
    assert_eq!(run(&engine, "2 + 3 * 4", json!({})), Value::Number(14.0));
    assert_eq!(run(&engine, "(2 + 3) * 4", json!({})), Value::Number(20.0));
}

#[test]
fn values_win_over_variables() {
    let engine = ExpressionEngine::default();
    let values = map(json!({"x": 1}));
    let variables = map(json!({"x": 2}));
    let opts = RunOptions::new().variables(&variables);
    assert_eq!(engine.run_expression(Some("{x}"), &values, &opts), Value::Number(1.0));
}

#[test]
fn emptiness() {
    let engine = ExpressionEngine::default();
    assert_eq!(run(&engine, "{missing} empty", json!({})), Value::Bool(true));
    assert_eq!(run(&engine, "{x} notempty", json!({"x": 0})), Value::Bool(true));
}

#[test]
fn coercions_and_guards() {
    let engine = ExpressionEngine::default();
    assert_eq!(run(&engine, "{a} + {b}", json!({"a": "foo", "b": 5})), Value::from("foo5"));
    assert_eq!(run(&engine, "10 / {z}", json!({"z": 0})), Value::Number(0.0));
    assert_eq!(run(&engine, "nps([9, 9, 6, 3])", json!({})), Value::Number(0.0));
    assert_eq!(run(&engine, "nosuchfn(1)", json!({})), Value::Bool(false));
}

#[test]
fn cache_is_bounded() {
    let engine = ExpressionEngine::default();
    let values = ValueMap::new();
    for i in 0..1001 {
        engine.run_expression(Some(&format!("{i} + 1")), &values, &RunOptions::new());
        assert!(engine.cache().len() <= 1000);
    }
    assert_eq!(engine.cache().len(), 901);
}

#[test]
fn cache_can_be_disabled() {
    let engine = ExpressionEngine::new(EngineConfig {
        cache: CacheConfig { capacity: 0, eviction_batch: 100 },
        ..EngineConfig::default()
    });
    assert_eq!(run(&engine, "1 + 1", json!({})), Value::Number(2.0));
    assert!(engine.cache().is_empty());
}

#[test]
fn deep_nesting_degrades_instead_of_overflowing() {
    let engine = ExpressionEngine::default();
    let deep = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    assert_eq!(run(&engine, &deep, json!({})), Value::Bool(false));
    assert!(engine.evaluate(&deep, &ValueMap::new(), &RunOptions::new()).is_err());
}

#[test]
fn nps_question_drives_followup_visibility() {
    let survey: SurveySchema = serde_json::from_value(json!({
        "pages": [{
            "name": "page1",
            "elements": [
                {"type": "nps", "name": "q1"},
                {"type": "text", "name": "q2", "visibleIf": "{q1} >= 9"}
            ]
        }]
    }))
    .unwrap();
    let mut runner = SurveyExpressionRunner::new(survey);
    let q2 = runner.survey().pages[0].elements[1].clone();

    runner.set_values(map(json!({"q1": 9})));
    assert!(runner.is_element_visible(&q2));

    runner.set_values(map(json!({"q1": 5})));
    assert!(!runner.is_element_visible(&q2));
}
