//! Document assembly, writing and loading
//!
//! Writing walks the registry in order, parses each field's raw text and collects
//! every non-empty value into a JSON object. A field whose text fails to parse is
//! reported and left out; it never aborts the write. The whole file is rewritten
//! on every save.
//!
//! Loading is the reverse: the file must be a JSON object, otherwise nothing is
//! loaded at all. Each entry whose id is in the registry is checked against the
//! field's declared type and rendered back to editable text. Unknown ids are
//! ignored, and fields missing from the file are not touched.
//!
//! Two document variants exist:
//!
//! - [`Variant::Plain`]: `{ "key1": 5, "key4": [1.0, null] }`
//! - [`Variant::Annotated`]: `{ "key1": { "value": 5, "type": "integer",
//!   "description": "..." } }`. Writing refuses to start while a required field
//!   is empty.

use crate::form::error::{DocumentError, DocumentResult, ParseError, ValueError};
use crate::form::formatting::format;
use crate::form::parsing::parse;
use crate::form::schema::{FieldDescriptor, SchemaRegistry};
use crate::form::state::FormState;
use crate::form::value::TypedValue;
use formgen_config::DocumentVariant;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const MEMORY_ORIGIN: &str = "<memory>";

/// Shape of a written document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Plain,
    Annotated,
}

impl Variant {
    pub fn enforces_required(self) -> bool {
        self == Variant::Annotated
    }
}

impl From<DocumentVariant> for Variant {
    fn from(variant: DocumentVariant) -> Self {
        match variant {
            DocumentVariant::Plain => Variant::Plain,
            DocumentVariant::Annotated => Variant::Annotated,
        }
    }
}

/// A field left out of a written document because its text did not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub field: String,
    pub error: ParseError,
}

/// Outcome of building or writing a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Fields present in the document, in registry order.
    pub written: Vec<String>,
    pub skipped: Vec<SkippedField>,
    /// Required fields that had text but ended up out of an annotated
    /// document, either skipped as invalid or parsed to nothing (`", ,"`).
    pub required_omitted: Vec<String>,
}

/// A stored entry that was not loaded because it does not fit its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedField {
    pub field: String,
    pub error: ValueError,
}

/// Outcome of loading a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Display text per loaded field, in registry order.
    pub values: IndexMap<String, String>,
    pub rejected: Vec<RejectedField>,
    /// Ids present in the file but unknown to the registry.
    pub ignored: Vec<String>,
}

/// An assembled document, ready to be serialized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-printed JSON with two-space indentation and no trailing newline.
    pub fn to_json_string(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

/// Required fields whose raw text is empty, in registry order.
pub fn missing_required(registry: &SchemaRegistry, form: &FormState) -> Vec<String> {
    registry
        .required_fields()
        .filter(|field| form.raw(&field.id).trim().is_empty())
        .map(|field| field.id.clone())
        .collect()
}

/// Parse every field of `form` and assemble the document in memory.
pub fn build_document(
    registry: &SchemaRegistry,
    form: &FormState,
    variant: Variant,
) -> DocumentResult<(Document, WriteReport)> {
    if variant.enforces_required() {
        let fields = missing_required(registry, form);
        if !fields.is_empty() {
            return Err(DocumentError::MissingRequiredFields { fields });
        }
    }

    let mut document = Document::default();
    let mut report = WriteReport::default();
    for field in registry.fields() {
        match parse(form.raw(&field.id), field.tag) {
            Ok(Some(value)) => {
                debug_assert!(value.matches(field.tag));
                debug!(field = %field.id, value = ?value, "generating field");
                document
                    .entries
                    .insert(field.id.clone(), entry(field, &value, variant));
                report.written.push(field.id.clone());
            }
            Ok(None) => debug!(field = %field.id, "field is empty, omitted"),
            Err(error) => {
                warn!(field = %field.id, tag = %field.tag, %error, "invalid input, field omitted");
                report.skipped.push(SkippedField {
                    field: field.id.clone(),
                    error,
                });
            }
        }
    }
    if variant.enforces_required() {
        report.required_omitted = registry
            .required_fields()
            .filter(|field| !document.entries.contains_key(&field.id))
            .map(|field| field.id.clone())
            .collect();
        if !report.required_omitted.is_empty() {
            warn!(fields = ?report.required_omitted, "required fields left out of the document");
        }
    }
    Ok((document, report))
}

fn entry(field: &FieldDescriptor, value: &TypedValue, variant: Variant) -> Value {
    match variant {
        Variant::Plain => value.to_json(),
        Variant::Annotated => json!({
            "value": value.to_json(),
            "type": field.tag.as_str(),
            "description": field.description,
        }),
    }
}

/// Write the document for `form` to `path`, replacing any existing file.
pub fn write(
    path: impl AsRef<Path>,
    registry: &SchemaRegistry,
    form: &FormState,
    variant: Variant,
) -> DocumentResult<WriteReport> {
    let path = path.as_ref();
    let (document, report) = build_document(registry, form, variant)?;
    let text = document.to_json_string()?;
    fs::write(path, text).map_err(|error| DocumentError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    info!(
        path = %path.display(),
        fields = report.written.len(),
        skipped = report.skipped.len(),
        "document written"
    );
    Ok(report)
}

/// Load the document at `path` and render each known field as display text.
pub fn read(
    path: impl AsRef<Path>,
    registry: &SchemaRegistry,
    variant: Variant,
) -> DocumentResult<LoadReport> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let bytes = fs::read(path).map_err(|error| DocumentError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| DocumentError::MalformedDocument {
        origin: origin.clone(),
        reason: e.to_string(),
    })?;
    let report = load_document(&text, registry, variant, &origin)?;
    info!(
        path = %origin,
        fields = report.values.len(),
        rejected = report.rejected.len(),
        "document loaded"
    );
    Ok(report)
}

/// [`read`] for a document already in memory.
pub fn load_str(
    text: &str,
    registry: &SchemaRegistry,
    variant: Variant,
) -> DocumentResult<LoadReport> {
    load_document(text, registry, variant, MEMORY_ORIGIN)
}

fn load_document(
    text: &str,
    registry: &SchemaRegistry,
    variant: Variant,
    origin: &str,
) -> DocumentResult<LoadReport> {
    let malformed = |reason: String| DocumentError::MalformedDocument {
        origin: origin.to_string(),
        reason,
    };
    let parsed: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    let Value::Object(entries) = parsed else {
        return Err(malformed("top level is not an object".to_string()));
    };

    let mut report = LoadReport::default();
    for field in registry.fields() {
        let Some(stored) = entries.get(&field.id) else {
            continue;
        };
        let loaded = stored_value(stored, field, variant)
            .and_then(|value| TypedValue::from_json(value, field.tag));
        match loaded {
            Ok(value) => {
                report
                    .values
                    .insert(field.id.clone(), format(&value, field.tag));
            }
            Err(error) => {
                warn!(field = %field.id, tag = %field.tag, %error, "stored value rejected");
                report.rejected.push(RejectedField {
                    field: field.id.clone(),
                    error,
                });
            }
        }
    }
    report.ignored = entries
        .keys()
        .filter(|id| !registry.contains(id))
        .cloned()
        .collect();
    if !report.ignored.is_empty() {
        debug!(ignored = ?report.ignored, "unknown fields ignored");
    }
    Ok(report)
}

fn stored_value<'a>(
    stored: &'a Value,
    field: &FieldDescriptor,
    variant: Variant,
) -> Result<&'a Value, ValueError> {
    match variant {
        Variant::Plain => Ok(stored),
        Variant::Annotated => {
            let record = stored.as_object().ok_or(ValueError::MissingValue)?;
            if let Some(tag) = record.get("type") {
                let tag = tag.as_str().map(str::to_string).unwrap_or_else(|| tag.to_string());
                if tag != field.tag.as_str() {
                    return Err(ValueError::TagMismatch {
                        stored: tag,
                        declared: field.tag,
                    });
                }
            }
            record.get("value").ok_or(ValueError::MissingValue)
        }
    }
}
