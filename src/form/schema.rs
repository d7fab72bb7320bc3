//! Field schema
//!
//!     Every form is described by a fixed list of fields. Each field has an id, a
//!     declared type tag, the category it is shown under, a human description and
//!     a required flag. The registry is built once at startup and never changes.
//!
//! Ordering
//!
//!     Fields are grouped by category. Categories appear in the order they are first
//!     seen among the field definitions, and fields keep their definition order
//!     within a category. That order is the registry order: documents are written
//!     in it and listings follow it.
//!
//! Type tags
//!
//!     A type tag combines a shape (scalar, vector, matrix) with an element kind
//!     (integer, float, text), giving nine tags in total. Tags are a closed enum;
//!     parsing and formatting dispatch on it exhaustively.

use crate::form::error::SchemaError;
use formgen_config::SchemaConfig;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Integer,
    Float,
    Text,
    IntVector,
    FloatVector,
    TextVector,
    IntMatrix,
    FloatMatrix,
    TextMatrix,
}

/// How many dimensions a value has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector,
    Matrix,
}

/// What each scalar, element or cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Integer,
    Float,
    Text,
}

impl ElementKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ElementKind::Text)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Integer => "integer",
            ElementKind::Float => "float",
            ElementKind::Text => "text",
        };
        f.write_str(name)
    }
}

impl TypeTag {
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Integer,
        TypeTag::Float,
        TypeTag::Text,
        TypeTag::IntVector,
        TypeTag::FloatVector,
        TypeTag::TextVector,
        TypeTag::IntMatrix,
        TypeTag::FloatMatrix,
        TypeTag::TextMatrix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Text => "text",
            TypeTag::IntVector => "int_vector",
            TypeTag::FloatVector => "float_vector",
            TypeTag::TextVector => "text_vector",
            TypeTag::IntMatrix => "int_matrix",
            TypeTag::FloatMatrix => "float_matrix",
            TypeTag::TextMatrix => "text_matrix",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            TypeTag::Integer | TypeTag::Float | TypeTag::Text => Shape::Scalar,
            TypeTag::IntVector | TypeTag::FloatVector | TypeTag::TextVector => Shape::Vector,
            TypeTag::IntMatrix | TypeTag::FloatMatrix | TypeTag::TextMatrix => Shape::Matrix,
        }
    }

    pub fn element(self) -> ElementKind {
        match self {
            TypeTag::Integer | TypeTag::IntVector | TypeTag::IntMatrix => ElementKind::Integer,
            TypeTag::Float | TypeTag::FloatVector | TypeTag::FloatMatrix => ElementKind::Float,
            TypeTag::Text | TypeTag::TextVector | TypeTag::TextMatrix => ElementKind::Text,
        }
    }

    /// Matrix fields take several lines of input; everything else fits on one.
    pub fn is_multiline(self) -> bool {
        self.shape() == Shape::Matrix
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Static description of one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: String,
    pub tag: TypeTag,
    pub category: String,
    pub description: String,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, tag: TypeTag, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag,
            category: category.into(),
            description: String::new(),
            required: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Immutable lookup table of every field in the form
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Fields in registry order (grouped by category).
    fields: Vec<FieldDescriptor>,
    /// Category name and the slice of `fields` it owns.
    categories: Vec<(String, Range<usize>)>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Build a registry from field definitions in declaration order.
    pub fn new(definitions: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        if definitions.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut category_order: Vec<String> = Vec::new();
        for field in &definitions {
            if !category_order.contains(&field.category) {
                category_order.push(field.category.clone());
            }
        }

        let mut fields = Vec::with_capacity(definitions.len());
        let mut categories = Vec::with_capacity(category_order.len());
        let mut remaining = definitions;
        for category in category_order {
            let start = fields.len();
            let (members, rest): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|f| f.category == category);
            fields.extend(members);
            remaining = rest;
            categories.push((category, start..fields.len()));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField(field.id.clone()));
            }
        }

        Ok(Self {
            fields,
            categories,
            index,
        })
    }

    /// Build a registry from the `[[schema.fields]]` configuration tables.
    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let definitions = config
            .fields
            .iter()
            .map(|field| -> Result<FieldDescriptor, SchemaError> {
                let tag = field
                    .kind
                    .parse::<TypeTag>()
                    .map_err(|kind| SchemaError::UnknownType {
                        field: field.id.clone(),
                        kind,
                    })?;
                Ok(FieldDescriptor {
                    id: field.id.clone(),
                    tag,
                    category: field.category.clone(),
                    description: field.description.clone(),
                    required: field.required,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.index.get(id).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a field that must exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not part of the schema. Asking for an unknown field is a
    /// programming error; use [`SchemaRegistry::get`] for ids that come from input.
    pub fn describe(&self, id: &str) -> &FieldDescriptor {
        match self.get(id) {
            Some(field) => field,
            None => panic!("field '{}' is not part of the schema", id),
        }
    }

    /// Field ids in registry order.
    pub fn all_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Categories in first-seen order, each with its fields.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[FieldDescriptor])> {
        self.categories
            .iter()
            .map(|(name, range)| (name.as_str(), &self.fields[range.clone()]))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
