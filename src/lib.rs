//! # formgen
//!
//! Typed form values to JSON documents and back.
//!
//! A form is a fixed, category-grouped schema of typed fields. Users type raw text
//! into each field; this crate turns that text into typed scalars, vectors and
//! matrices, writes them out as a JSON document, and turns a saved document back
//! into the editable text a form would display.
//!
//! Layout
//!
//! src/form
//!   ├── schema       Field descriptors, type tags and the registry
//!   ├── value        Typed values and their JSON mapping
//!   ├── parsing      Raw text to typed values
//!   ├── formatting   Typed values to editable text
//!   ├── state        Raw text held per field
//!   └── document     Document assembly, writing and loading
//!
//! The window layer is not part of this crate. Anything that can collect a string
//! per field (the `formgen` binary, a GUI, a test) drives the same API.

pub mod form;
