use crate::value::Value;
use std::collections::HashMap;

pub type ValueMap = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, Default)]
/// Layered lookup environment for one evaluation.
///
/// Borrows caller-owned maps; the evaluator never mutates them.
/// Variable heads resolve through `values`, then `variables`, then `properties`.
pub struct EvalContext<'a> {
    pub values: Option<&'a ValueMap>,
    pub variables: Option<&'a ValueMap>,
    pub properties: Option<&'a ValueMap>,
    pub row: Option<&'a ValueMap>,
    pub panel: Option<&'a ValueMap>,
}

impl<'a> EvalContext<'a> {
    pub fn new(values: &'a ValueMap) -> Self {
        Self { values: Some(values), ..Self::default() }
    }

    pub fn with_variables(mut self, variables: &'a ValueMap) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_properties(mut self, properties: &'a ValueMap) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_row(mut self, row: &'a ValueMap) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_panel(mut self, panel: &'a ValueMap) -> Self {
        self.panel = Some(panel);
        self
    }

    /// First layer holding `name` wins, even when it holds `null`.
    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        [self.values, self.variables, self.properties]
            .into_iter()
            .flatten()
            .find_map(|m| m.get(name))
    }

    /// Resolves a dotted path such as `q1`, `q1.answer` or `matrix.0.col`.
    ///
    /// Missing heads and segments that hit `null` resolve to `Null`.
    pub fn resolve_variable(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or(path);
        walk_path(self.lookup(head), segments)
    }

    /// Path lookup restricted to the answer values.
    pub fn value_path(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or(path);
        walk_path(self.values.and_then(|m| m.get(head)), segments)
    }

    pub fn variable(&self, name: &str) -> Value {
        get(self.variables, name)
    }

    pub fn property(&self, name: &str) -> Value {
        get(self.properties, name)
    }

    pub fn row_value(&self, name: &str) -> Value {
        get(self.row, name)
    }

    pub fn panel_value(&self, name: &str) -> Value {
        get(self.panel, name)
    }
}

fn get(map: Option<&ValueMap>, name: &str) -> Value {
    map.and_then(|m| m.get(name)).cloned().unwrap_or_default()
}

fn walk_path<'v, 's>(start: Option<&'v Value>, segments: impl Iterator<Item = &'s str>) -> Value {
    let mut current = start;
    for seg in segments {
        current = match current {
            None | Some(Value::Null) => return Value::Null,
            Some(v) => v.navigate(seg),
        };
    }
    current.cloned().unwrap_or_default()
}
