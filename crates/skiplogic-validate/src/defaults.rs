use skiplogic_runner::{Element, Validator, ValidatorKind};

/// Validators implied by a question's type, added by the builder when a
/// question is created.
///
/// - `nps`: numeric 0..=10
/// - `rating_scale`/`rating`: numeric `rateMin..=rateMax` (default 1..=5)
/// - short text: by `inputType` (`email`, `number`), plus `maxLength`
pub fn create_default_validators(element: &Element) -> Vec<Validator> {
    let numeric = |min: f64, max: f64| {
        Validator::new(ValidatorKind::Numeric { min_value: Some(min), max_value: Some(max) })
    };
    match element.kind.as_str() {
        "nps" => vec![numeric(0.0, 10.0)],
        "rating_scale" | "rating" => {
            vec![numeric(element.rate_min.unwrap_or(1.0), element.rate_max.unwrap_or(5.0))]
        }
        "text" | "short_text" => {
            let mut out = Vec::new();
            match element.input_type.as_deref() {
                Some("email") => out.push(Validator::new(ValidatorKind::Email)),
                Some("number") => {
                    out.push(Validator::new(ValidatorKind::Numeric { min_value: None, max_value: None }))
                }
                _ => {}
            }
            if let Some(max) = element.max_length {
                out.push(Validator::new(ValidatorKind::Text {
                    min_length: None,
                    max_length: Some(max),
                    allow_digits: None,
                }));
            }
            out
        }
        _ => Vec::new(),
    }
}
