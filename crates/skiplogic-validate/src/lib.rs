//!
//! Answer validation for survey questions.
//!
//! Responsibilities:
//! - Apply an element's declarative validators to its answer.
//! - Aggregate per-question results across a page or a whole survey.
//! - Derive default validators from question type (`create_default_validators`).
//!
//! Validation never fails: broken expressions or patterns degrade to
//! "rule does not apply", and the result always carries an error list.

mod defaults;
mod rules;

use serde::Serialize;
use skiplogic_eval::{Value, ValueMap};
use skiplogic_runner::{Element, ExpressionEngine, Page, SurveyExpressionRunner, SurveySchema, ValidatorKind};
use std::collections::HashMap;
use std::sync::Arc;

pub use defaults::create_default_validators;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub question_name: String,
    pub validator_type: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }
}

/// Per-question overrides computed by the caller (usually from `requiredIf`/`visibleIf`).
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    pub required_overrides: HashMap<String, bool>,
    /// Survey-wide validation skips pages, panels and questions mapped to `false`.
    pub visibility_overrides: HashMap<String, bool>,
}

static NULL: Value = Value::Null;

pub struct ValidationEngine {
    engine: Arc<ExpressionEngine>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(Arc::new(ExpressionEngine::default()))
    }
}

impl ValidationEngine {
    /// Shares the expression engine (and its cache) used for `expression` validators.
    pub fn new(engine: Arc<ExpressionEngine>) -> Self {
        Self { engine }
    }

    /// Validates one answer.
    ///
    /// `required` overrides `element.is_required`. A required, empty answer
    /// yields exactly one `required` error and nothing else runs; otherwise
    /// every failing validator is reported.
    pub fn validate_question(
        &self,
        element: &Element,
        value: &Value,
        all_values: &ValueMap,
        required: Option<bool>,
    ) -> ValidationResult {
        let required = required.or(element.is_required).unwrap_or(false);
        if required && value.is_blank_answer() {
            let message = element
                .validators
                .iter()
                .find(|v| matches!(v.rule, ValidatorKind::Required))
                .and_then(|v| v.message.clone())
                .unwrap_or_else(|| rules::REQUIRED_MESSAGE.to_string());
            return ValidationResult::from_errors(vec![ValidationError {
                question_name: element.name.clone(),
                validator_type: "required".to_string(),
                message,
            }]);
        }

        let errors = element
            .validators
            .iter()
            .filter(|v| !matches!(v.rule, ValidatorKind::Required))
            .flat_map(|v| {
                rules::check(&self.engine, v, value, all_values).into_iter().map(|message| ValidationError {
                    question_name: element.name.clone(),
                    validator_type: v.kind().to_string(),
                    message,
                })
            })
            .collect();
        ValidationResult::from_errors(errors)
    }

    /// Validates every question on `page`, descending into panels.
    pub fn validate_page(
        &self,
        page: &Page,
        values: &ValueMap,
        required_overrides: &HashMap<String, bool>,
    ) -> ValidationResult {
        let questions = page.elements.iter().flat_map(Element::leaves);
        self.validate_all(questions, values, required_overrides)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(pages = survey.pages.len()))]
    pub fn validate_survey(
        &self,
        survey: &SurveySchema,
        values: &ValueMap,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let hidden = |name: &str| options.visibility_overrides.get(name) == Some(&false);
        let mut questions = Vec::new();
        for page in survey.pages.iter().filter(|p| !hidden(&p.name)) {
            collect_shown(&page.elements, &hidden, &mut questions);
        }
        let result = self.validate_all(questions.into_iter(), values, &options.required_overrides);
        tracing::debug!(errors = result.errors.len(), "survey validated");
        result
    }

    /// Validates the questions the runner currently shows on `page`,
    /// with requiredness taken from the runner.
    pub fn validate_visible_page(&self, runner: &SurveyExpressionRunner, page: &Page) -> ValidationResult {
        let visible = runner.get_visible_elements(page);
        let required: HashMap<String, bool> =
            visible.iter().map(|q| (q.name.clone(), runner.is_element_required(q))).collect();
        self.validate_all(visible.into_iter(), runner.all_values(), &required)
    }

    fn validate_all<'e>(
        &self,
        questions: impl Iterator<Item = &'e Element>,
        values: &ValueMap,
        required_overrides: &HashMap<String, bool>,
    ) -> ValidationResult {
        let errors = questions
            .flat_map(|q| {
                let value = values.get(&q.name).unwrap_or(&NULL);
                let required = required_overrides.get(&q.name).copied();
                self.validate_question(q, value, values, required).errors
            })
            .collect();
        ValidationResult::from_errors(errors)
    }
}

/// Leaf questions, pruning every subtree whose root is hidden.
fn collect_shown<'e>(elements: &'e [Element], hidden: &impl Fn(&str) -> bool, out: &mut Vec<&'e Element>) {
    for element in elements.iter().filter(|e| !hidden(&e.name)) {
        if element.is_panel() {
            collect_shown(&element.elements, hidden, out);
        } else {
            out.push(element);
        }
    }
}
