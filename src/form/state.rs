//! Raw text held per field
//!
//! [`FormState`] is what an input surface owns: one string per field, exactly as
//! typed. The document layer reads it when writing and produces a
//! [`LoadReport`] that [`FormState::apply`] pushes back in after loading.

use crate::form::document::LoadReport;
use crate::form::schema::SchemaRegistry;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: IndexMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty entry for every field, in registry order.
    pub fn for_schema(registry: &SchemaRegistry) -> Self {
        let values = registry
            .fields()
            .map(|field| (field.id.clone(), String::new()))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.values.insert(id.into(), text.into());
    }

    pub fn with(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(id, text);
        self
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// The text of `id`, or `""` for a field that was never set.
    pub fn raw(&self, id: &str) -> &str {
        self.get(id).unwrap_or("")
    }

    /// Replace the text of every field in `report`. Other fields keep their
    /// current text. Returns how many fields were updated.
    pub fn apply(&mut self, report: &LoadReport) -> usize {
        for (id, text) in &report.values {
            self.values.insert(id.clone(), text.clone());
        }
        report.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
