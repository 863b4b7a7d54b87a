//! Date/time builtins.
//!
//! Dates travel as ISO 8601 strings (`2024-03-01`, RFC 3339 timestamps) or
//! epoch milliseconds. Everything is computed in UTC.

use super::arg;
use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a date-ish value into a UTC naive timestamp.
pub fn parse_date(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(ms) => DateTime::from_timestamp_millis(*ms as i64).map(|d| d.naive_utc()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = NAIVE_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(s, f).ok()) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole calendar years from `from` to `to`, negative when `to` is earlier.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -years_between(to, from);
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Missing/null argument means "now"; anything unparseable is `None`.
fn date_or_now(args: &[Value], i: usize) -> Option<NaiveDateTime> {
    match arg(args, i) {
        Value::Null => Some(now_naive()),
        v => parse_date(v),
    }
}

fn number_or_null(n: Option<f64>) -> Value {
    n.map(Value::Number).unwrap_or_default()
}

pub fn today(_args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(Utc::now().date_naive().format("%Y-%m-%d").to_string()))
}

pub fn currentdate(_args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)))
}

/// Epoch milliseconds.
pub fn now(_args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(Utc::now().timestamp_millis() as f64))
}

pub fn year(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(number_or_null(date_or_now(args, 0).map(|d| d.year() as f64)))
}

/// 1-based month.
pub fn month(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(number_or_null(date_or_now(args, 0).map(|d| d.month() as f64)))
}

pub fn day(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(number_or_null(date_or_now(args, 0).map(|d| d.day() as f64)))
}

/// Full years since the birth date.
pub fn age(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let birth = parse_date(arg(args, 0));
    Ok(number_or_null(birth.map(|b| years_between(b.date(), Utc::now().date_naive()) as f64)))
}

/// `datediff(from, to = now, unit = "days")`, truncated toward zero.
pub fn datediff(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let (Some(from), Some(to)) = (parse_date(arg(args, 0)), date_or_now(args, 1)) else {
        return Ok(Value::Null);
    };
    let unit = match arg(args, 2) {
        Value::Null => "days".to_string(),
        v => v.to_js_string().to_lowercase(),
    };
    let delta = to - from;
    let n = match unit.trim_end_matches('s') {
        "year" => years_between(from.date(), to.date()) as i64,
        "hour" => delta.num_hours(),
        "minute" => delta.num_minutes(),
        "second" => delta.num_seconds(),
        _ => delta.num_days(),
    };
    Ok(Value::Number(n as f64))
}
