//! One check per validator kind. Each returns the failure messages it produced.

use regex::Regex;
use skiplogic_eval::value::format_number;
use skiplogic_eval::{Value, ValueMap};
use skiplogic_runner::{ExpressionEngine, RunOptions, Validator, ValidatorKind};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required";

pub(crate) fn check(
    engine: &ExpressionEngine,
    validator: &Validator,
    value: &Value,
    all_values: &ValueMap,
) -> Vec<String> {
    let failures = match &validator.rule {
        ValidatorKind::Required => required(value),
        ValidatorKind::Email => email(value),
        ValidatorKind::Numeric { min_value, max_value } => numeric(value, *min_value, *max_value),
        ValidatorKind::Text { min_length, max_length, allow_digits } => {
            text(value, *min_length, *max_length, *allow_digits)
        }
        ValidatorKind::Regex { pattern } => regex(value, pattern),
        ValidatorKind::Expression { expression } => expression_holds(engine, expression, value, all_values),
        ValidatorKind::AnswerCount { min_count, max_count } => answer_count(value, *min_count, *max_count),
    };
    match &validator.message {
        Some(custom) => failures.into_iter().map(|_| custom.clone()).collect(),
        None => failures,
    }
}

fn required(value: &Value) -> Vec<String> {
    if value.is_blank_answer() {
        vec![REQUIRED_MESSAGE.to_string()]
    } else {
        Vec::new()
    }
}

fn email(value: &Value) -> Vec<String> {
    if value.is_blank_answer() || EMAIL.is_match(&value.to_js_string()) {
        return Vec::new();
    }
    vec!["Please enter a valid email address".to_string()]
}

fn numeric(value: &Value, min: Option<f64>, max: Option<f64>) -> Vec<String> {
    if value.is_blank_answer() {
        return Vec::new();
    }
    let Some(n) = value.as_numeric() else {
        return vec!["Please enter a valid number".to_string()];
    };
    let mut out = Vec::new();
    if let Some(min) = min.filter(|min| n < *min) {
        out.push(format!("Value must be at least {}", format_number(min)));
    }
    if let Some(max) = max.filter(|max| n > *max) {
        out.push(format!("Value must be at most {}", format_number(max)));
    }
    out
}

fn text(value: &Value, min: Option<usize>, max: Option<usize>, allow_digits: Option<bool>) -> Vec<String> {
    if value.is_blank_answer() {
        return Vec::new();
    }
    let s = value.to_js_string();
    let len = s.chars().count();
    let mut out = Vec::new();
    if let Some(min) = min.filter(|min| len < *min) {
        out.push(format!("Must be at least {min} characters"));
    }
    if let Some(max) = max.filter(|max| len > *max) {
        out.push(format!("Must be at most {max} characters"));
    }
    if allow_digits == Some(false) && s.chars().any(|c| c.is_ascii_digit()) {
        out.push("Digits are not allowed".to_string());
    }
    out
}

fn regex(value: &Value, pattern: &str) -> Vec<String> {
    if value.is_blank_answer() {
        return Vec::new();
    }
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid validator pattern, skipping");
            return Vec::new();
        }
    };
    if re.is_match(&value.to_js_string()) {
        Vec::new()
    } else {
        vec!["Invalid format".to_string()]
    }
}

/// Runs even for empty answers; the answer is exposed as `propertyvalue('value')`.
fn expression_holds(engine: &ExpressionEngine, expression: &str, value: &Value, all_values: &ValueMap) -> Vec<String> {
    let properties = ValueMap::from([("value".to_string(), value.clone())]);
    let options = RunOptions::new().properties(&properties).default_value(true);
    if engine.run_expression(Some(expression), all_values, &options).truthy() {
        Vec::new()
    } else {
        vec!["Validation failed".to_string()]
    }
}

fn answer_count(value: &Value, min: Option<usize>, max: Option<usize>) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if let Some(min) = min.filter(|min| items.len() < *min) {
        out.push(format!("Please select at least {min} options"));
    }
    if let Some(max) = max.filter(|max| items.len() > *max) {
        out.push(format!("Please select at most {max} options"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule: ValidatorKind, value: serde_json::Value) -> Vec<String> {
        let engine = ExpressionEngine::default();
        check(&engine, &Validator::new(rule), &Value::from(value), &ValueMap::new())
    }

    #[test]
    fn email_shape() {
        assert!(run(ValidatorKind::Email, json!("a@b.co")).is_empty());
        assert!(run(ValidatorKind::Email, json!("")).is_empty());
        assert_eq!(run(ValidatorKind::Email, json!("a@b")).len(), 1);
        assert_eq!(run(ValidatorKind::Email, json!("a b@c.de")).len(), 1);
    }

    #[test]
    fn numeric_bounds() {
        let rule = || ValidatorKind::Numeric { min_value: Some(1.0), max_value: Some(10.0) };
        assert!(run(rule(), json!(5)).is_empty());
        assert!(run(rule(), json!("7")).is_empty());
        assert_eq!(run(rule(), json!(0)), vec!["Value must be at least 1"]);
        assert_eq!(run(rule(), json!(10.5)), vec!["Value must be at most 10"]);
        assert_eq!(run(rule(), json!("abc")), vec!["Please enter a valid number"]);
        assert!(run(rule(), json!(null)).is_empty());
    }

    #[test]
    fn text_rules() {
        let rule = || ValidatorKind::Text { min_length: Some(3), max_length: Some(5), allow_digits: Some(false) };
        assert!(run(rule(), json!("abcd")).is_empty());
        assert_eq!(run(rule(), json!("ab")), vec!["Must be at least 3 characters"]);
        assert_eq!(run(rule(), json!("abcdef1")), vec!["Must be at most 5 characters", "Digits are not allowed"]);
        assert!(run(rule(), json!("  ")).is_empty());
    }

    #[test]
    fn regex_skips_bad_patterns() {
        assert!(run(ValidatorKind::Regex { pattern: "^[0-9]{4}$".into() }, json!("2024")).is_empty());
        assert_eq!(run(ValidatorKind::Regex { pattern: "^[0-9]{4}$".into() }, json!("24")), vec!["Invalid format"]);
        assert!(run(ValidatorKind::Regex { pattern: "([".into() }, json!("anything")).is_empty());
    }

    #[test]
    fn expression_sees_value_and_defaults_to_pass() {
        let rule = |e: &str| ValidatorKind::Expression { expression: e.into() };
        assert!(run(rule("propertyvalue('value') > 3"), json!(4)).is_empty());
        assert_eq!(run(rule("propertyvalue('value') > 3"), json!(2)), vec!["Validation failed"]);
        assert!(run(rule("{value} > 3"), json!(4)).is_empty());
        assert!(run(rule("nosuch()"), json!(2)).is_empty());
    }

    #[test]
    fn answer_count_only_for_arrays() {
        let rule = || ValidatorKind::AnswerCount { min_count: Some(2), max_count: Some(3) };
        assert!(run(rule(), json!(["a", "b"])).is_empty());
        assert_eq!(run(rule(), json!(["a"])), vec!["Please select at least 2 options"]);
        assert_eq!(run(rule(), json!([1, 2, 3, 4])), vec!["Please select at most 3 options"]);
        assert!(run(rule(), json!("a")).is_empty());
    }

    #[test]
    fn custom_message_replaces_builtin() {
        let engine = ExpressionEngine::default();
        let v = Validator::new(ValidatorKind::Email).with_message("bad email");
        assert_eq!(check(&engine, &v, &Value::from("nope"), &ValueMap::new()), vec!["bad email"]);
    }
}
