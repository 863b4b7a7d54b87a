//! Stateful survey session: conditions, calculated values and trigger navigation.

use crate::engine::{ExpressionEngine, RunOptions};
use crate::schema::{Element, Page, SurveySchema, TriggerKind};
use skiplogic_eval::{Value, ValueMap};
use std::sync::Arc;

/// A fired trigger, with any value it carries already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerAction {
    Complete,
    SetValue { name: String, value: Value },
    CopyValue { name: String, value: Value },
    Skip { target: String },
    RunExpression { name: Option<String>, value: Value },
    Visible { questions: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationStep {
    Complete,
    SkipTo(String),
    Continue,
}

/// Survey-session state: answers, custom variables and the calculated
/// values derived from them.
///
/// Calculated values are recomputed on every answer change, so
/// conditions always see them alongside the answers.
pub struct SurveyExpressionRunner {
    engine: Arc<ExpressionEngine>,
    survey: SurveySchema,
    values: ValueMap,
    variables: ValueMap,
    properties: ValueMap,
    calculated: ValueMap,
    /// `values` overlaid with `calculated`; what conditions evaluate against.
    all_values: ValueMap,
}

impl SurveyExpressionRunner {
    pub fn new(survey: SurveySchema) -> Self {
        Self::with_engine(survey, Arc::new(ExpressionEngine::default()))
    }

    pub fn with_engine(survey: SurveySchema, engine: Arc<ExpressionEngine>) -> Self {
        let mut runner = Self {
            engine,
            survey,
            values: ValueMap::new(),
            variables: ValueMap::new(),
            properties: ValueMap::new(),
            calculated: ValueMap::new(),
            all_values: ValueMap::new(),
        };
        runner.update_calculated_values();
        runner
    }

    pub fn engine(&self) -> &Arc<ExpressionEngine> {
        &self.engine
    }

    pub fn survey(&self) -> &SurveySchema {
        &self.survey
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn variables(&self) -> &ValueMap {
        &self.variables
    }

    pub fn properties(&self) -> &ValueMap {
        &self.properties
    }

    pub fn calculated_values(&self) -> &ValueMap {
        &self.calculated
    }

    pub fn all_values(&self) -> &ValueMap {
        &self.all_values
    }

    pub fn set_values(&mut self, values: ValueMap) {
        self.values = values;
        self.update_calculated_values();
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
        self.update_calculated_values();
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
        self.update_calculated_values();
    }

    pub fn set_properties(&mut self, properties: ValueMap) {
        self.properties = properties;
        self.update_calculated_values();
    }

    fn options(&self, default: Value) -> RunOptions<'_> {
        RunOptions::new()
            .variables(&self.variables)
            .properties(&self.properties)
            .default_value(default)
    }

    fn condition(&self, expression: &str, default: bool) -> bool {
        self.engine
            .run_expression(Some(expression), &self.all_values, &self.options(Value::Bool(default)))
            .truthy()
    }

    /// Evaluates an arbitrary expression against the session state.
    pub fn run_expression(&self, expression: Option<&str>) -> Value {
        self.engine.run_expression(expression, &self.all_values, &self.options(Value::Null))
    }

    pub fn is_element_visible(&self, element: &Element) -> bool {
        if element.visible == Some(false) {
            return false;
        }
        match &element.visible_if {
            Some(cond) => self.condition(cond, true),
            None => true,
        }
    }

    pub fn is_page_visible(&self, page: &Page) -> bool {
        if page.visible == Some(false) {
            return false;
        }
        match &page.visible_if {
            Some(cond) => self.condition(cond, true),
            None => true,
        }
    }

    pub fn is_element_enabled(&self, element: &Element) -> bool {
        if element.read_only == Some(true) {
            return false;
        }
        match &element.enable_if {
            Some(cond) => self.condition(cond, true),
            None => true,
        }
    }

    pub fn is_element_required(&self, element: &Element) -> bool {
        if element.is_required == Some(true) {
            return true;
        }
        match &element.required_if {
            Some(cond) => self.condition(cond, false),
            None => element.is_required.unwrap_or(false),
        }
    }

    /// Visible leaf questions of `page`, depth first. Hidden panels hide their subtree.
    pub fn get_visible_elements<'p>(&self, page: &'p Page) -> Vec<&'p Element> {
        let mut out = Vec::new();
        self.collect_visible(&page.elements, &mut out);
        out
    }

    fn collect_visible<'p>(&self, elements: &'p [Element], out: &mut Vec<&'p Element>) {
        for element in elements {
            if !self.is_element_visible(element) {
                continue;
            }
            if element.is_panel() {
                self.collect_visible(&element.elements, out);
            } else {
                out.push(element);
            }
        }
    }

    /// Recomputes calculated values in declared order; each result is
    /// visible to the ones after it. A failing expression yields `null`.
    #[tracing::instrument(level = "debug", skip(self), fields(count = self.survey.calculated_values.len()))]
    pub fn update_calculated_values(&mut self) {
        let mut all = self.values.clone();
        let mut calculated = ValueMap::new();
        for cv in &self.survey.calculated_values {
            let value = self.engine.run_expression(Some(&cv.expression), &all, &self.options(Value::Null));
            all.insert(cv.name.clone(), value.clone());
            calculated.insert(cv.name.clone(), value);
        }
        self.calculated = calculated;
        self.all_values = all;
    }

    /// Every trigger whose expression holds, in declared order.
    pub fn evaluate_triggers(&self) -> Vec<TriggerAction> {
        self.survey
            .triggers
            .iter()
            .filter(|t| self.condition(&t.expression, false))
            .map(|t| match &t.action {
                TriggerKind::Complete => TriggerAction::Complete,
                TriggerKind::SetValue { set_to_name, set_value } => {
                    TriggerAction::SetValue { name: set_to_name.clone(), value: set_value.clone() }
                }
                TriggerKind::CopyValue { set_to_name, from_name } => TriggerAction::CopyValue {
                    name: set_to_name.clone(),
                    value: self.all_values.get(from_name).cloned().unwrap_or_default(),
                },
                TriggerKind::Skip { goto_name } => TriggerAction::Skip { target: goto_name.clone() },
                TriggerKind::RunExpression { run_expression, set_to_name } => TriggerAction::RunExpression {
                    name: set_to_name.clone(),
                    value: self.run_expression(Some(run_expression)),
                },
                TriggerKind::Visible { questions } => TriggerAction::Visible { questions: questions.clone() },
            })
            .collect()
    }

    /// Applies fired value triggers and resolves navigation.
    ///
    /// Value-setting actions apply wherever they appear; the first
    /// `complete` or `skip` decides the step.
    pub fn next_step(&mut self) -> NavigationStep {
        let mut step = None;
        let mut changed = false;
        for action in self.evaluate_triggers() {
            match action {
                TriggerAction::Complete => {
                    step.get_or_insert(NavigationStep::Complete);
                }
                TriggerAction::Skip { target } => {
                    step.get_or_insert(NavigationStep::SkipTo(target));
                }
                TriggerAction::SetValue { name, value }
                | TriggerAction::CopyValue { name, value }
                | TriggerAction::RunExpression { name: Some(name), value } => {
                    self.values.insert(name, value);
                    changed = true;
                }
                TriggerAction::RunExpression { name: None, .. } | TriggerAction::Visible { .. } => {}
            }
        }
        if changed {
            self.update_calculated_values();
        }
        step.unwrap_or(NavigationStep::Continue)
    }

    /// Answers plus calculated values marked `includeInResult`.
    pub fn result_values(&self) -> ValueMap {
        let mut out = self.values.clone();
        for cv in self.survey.calculated_values.iter().filter(|cv| cv.include_in_result) {
            if let Some(v) = self.calculated.get(&cv.name) {
                out.insert(cv.name.clone(), v.clone());
            }
        }
        out
    }
}
