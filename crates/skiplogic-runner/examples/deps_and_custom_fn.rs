use serde_json::json;
use skiplogic_ast::extract_dependencies;
use skiplogic_eval::EvalError;
use skiplogic_runner::{extract_variables, ExpressionEngine, RunOptions, Value, ValueMap};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let engine = ExpressionEngine::default();

    // starts_with(text, prefix) -> bool
    engine.register_function("starts_with", |args, _ctx| match args {
        [Value::String(s), Value::String(p)] => Ok(Value::Bool(s.starts_with(p.as_str()))),
        _ => Err(EvalError::Argument { function: "starts_with", message: "expects (string, string)".into() }),
    });

    let src = "starts_with({source}, 'so') and {visits.week} >= 2";
    let expr = engine.parse(src).unwrap();
    let deps = extract_dependencies(&expr);
    println!("variables={:?}", extract_variables(src));
    println!("functions={:?}", deps.functions);
    println!("check={:?}", engine.check_expression("starts_with({source}) or lookup({id})"));

    let values: ValueMap = serde_json::from_value(json!({"source": "social", "visits": {"week": 3}})).unwrap();
    println!("result={:?}", engine.evaluate(src, &values, &RunOptions::new()));
    println!("bad args={:?}", engine.evaluate("starts_with(1)", &values, &RunOptions::new()));
}
