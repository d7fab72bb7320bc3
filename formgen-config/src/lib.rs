//! Shared configuration loader for formgen.
//!
//! `defaults/formgen.default.toml` is embedded into every binary so that the
//! built-in schema and the runtime behavior stay in sync. Applications layer
//! user-specific files on top of those defaults via [`Loader`] before
//! deserializing into [`FormgenConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/formgen.default.toml");

/// Top-level configuration consumed by formgen applications.
#[derive(Debug, Clone, Deserialize)]
pub struct FormgenConfig {
    pub document: DocumentConfig,
    pub schema: SchemaConfig,
}

/// Controls the shape of written documents.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub variant: DocumentVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentVariant {
    /// `{ field: value }`
    Plain,
    /// `{ field: { value, type, description } }` with required-field checks.
    Annotated,
}

/// Field definitions, in the order they appear in the form.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    pub fields: Vec<FieldConfig>,
}

/// One field definition. `kind` holds the raw type tag; the core crate
/// validates it when building its registry.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<FormgenConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<FormgenConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.document.variant, DocumentVariant::Plain);
        assert_eq!(config.schema.fields.len(), 9);
        assert_eq!(config.schema.fields[0].id, "key1");
        assert_eq!(config.schema.fields[0].kind, "integer");
        assert!(config.schema.fields[0].required);
        assert_eq!(config.schema.fields[8].kind, "text_matrix");
        assert_eq!(config.schema.fields[8].category, "cat3");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("document.variant", "annotated")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.document.variant, DocumentVariant::Annotated);
    }

    #[test]
    fn user_file_replaces_schema() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
[[schema.fields]]
id = "width"
type = "float"
category = "geometry"
"#
        )
        .expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.schema.fields.len(), 1);
        assert_eq!(config.schema.fields[0].id, "width");
        assert_eq!(config.schema.fields[0].description, "");
        assert!(!config.schema.fields[0].required);
        assert_eq!(config.document.variant, DocumentVariant::Plain);
    }

    #[test]
    fn optional_file_may_be_missing() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/formgen.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.schema.fields.len(), 9);
    }
}
