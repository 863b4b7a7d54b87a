//! Survey schema as consumed by the runner and validators.
//!
//! Only the expression-bearing parts of a survey are modelled; unknown
//! JSON fields are ignored.

use serde::{Deserialize, Serialize};
use skiplogic_eval::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveySchema {
    pub pages: Vec<Page>,
    pub calculated_values: Vec<CalculatedValue>,
    pub triggers: Vec<Trigger>,
}

impl SurveySchema {
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Every leaf element on every page, depth first.
    pub fn all_questions(&self) -> Vec<&Element> {
        self.pages.iter().flat_map(|p| p.elements.iter().flat_map(Element::leaves)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    pub name: String,
    pub title: Option<String>,
    pub visible_if: Option<String>,
    pub visible: Option<bool>,
    pub elements: Vec<Element>,
}

/// A question or a panel. Panels carry nested `elements`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub visible_if: Option<String>,
    pub enable_if: Option<String>,
    pub required_if: Option<String>,
    pub is_required: Option<bool>,
    pub visible: Option<bool>,
    pub read_only: Option<bool>,
    /// Calculated fields (`type: "expression"`).
    pub expression: Option<String>,
    pub input_type: Option<String>,
    pub max_length: Option<usize>,
    pub rate_min: Option<f64>,
    pub rate_max: Option<f64>,
    pub validators: Vec<Validator>,
    pub elements: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into(), ..Self::default() }
    }

    pub fn is_panel(&self) -> bool {
        self.kind.eq_ignore_ascii_case("panel")
    }

    /// Leaf questions under this node (itself, if it is not a panel).
    pub fn leaves(&self) -> Vec<&Element> {
        if !self.is_panel() {
            return vec![self];
        }
        self.elements.iter().flat_map(Element::leaves).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculatedValue {
    pub name: String,
    pub expression: String,
    pub include_in_result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub expression: String,
    #[serde(flatten)]
    pub action: TriggerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TriggerKind {
    Complete,
    SetValue {
        set_to_name: String,
        #[serde(default)]
        set_value: Value,
    },
    CopyValue {
        set_to_name: String,
        from_name: String,
    },
    Skip {
        goto_name: String,
    },
    RunExpression {
        run_expression: String,
        #[serde(default)]
        set_to_name: Option<String>,
    },
    Visible {
        #[serde(default)]
        questions: Vec<String>,
    },
}

impl TriggerKind {
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerKind::Complete => "complete",
            TriggerKind::SetValue { .. } => "setvalue",
            TriggerKind::CopyValue { .. } => "copyvalue",
            TriggerKind::Skip { .. } => "skip",
            TriggerKind::RunExpression { .. } => "runexpression",
            TriggerKind::Visible { .. } => "visible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    /// Replaces the built-in message for every failure of this rule.
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub rule: ValidatorKind,
}

impl Validator {
    pub fn new(rule: ValidatorKind) -> Self {
        Self { message: None, rule }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.rule.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ValidatorKind {
    Required,
    Email,
    Numeric {
        #[serde(default)]
        min_value: Option<f64>,
        #[serde(default)]
        max_value: Option<f64>,
    },
    Text {
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        allow_digits: Option<bool>,
    },
    Regex {
        pattern: String,
    },
    Expression {
        expression: String,
    },
    AnswerCount {
        #[serde(default)]
        min_count: Option<usize>,
        #[serde(default)]
        max_count: Option<usize>,
    },
}

impl ValidatorKind {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidatorKind::Required => "required",
            ValidatorKind::Email => "email",
            ValidatorKind::Numeric { .. } => "numeric",
            ValidatorKind::Text { .. } => "text",
            ValidatorKind::Regex { .. } => "regex",
            ValidatorKind::Expression { .. } => "expression",
            ValidatorKind::AnswerCount { .. } => "answercount",
        }
    }
}
