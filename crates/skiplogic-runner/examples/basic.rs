use serde_json::json;
use skiplogic_runner::{ExpressionEngine, RunOptions, ValueMap};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let engine = ExpressionEngine::default();
    let values: ValueMap = serde_json::from_value(json!({"age": 34, "country": "DE"})).unwrap();

    let expr = "{age} >= 18 and {country} anyof ['DE', 'FR']";
    println!("{expr} => {:?}", engine.run_expression(Some(expr), &values, &RunOptions::new()));

    // unknown functions degrade to the default and log a warning
    println!("{:?}", engine.run_expression(Some("nosuchfn({age})"), &values, &RunOptions::new()));
}
