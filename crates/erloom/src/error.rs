//! Error types for Erloom operations.
//!
//! This module provides the main error type [`ErloomError`] which wraps
//! the error conditions of every pipeline stage, from schema loading to
//! diagram serialization.

use std::{io, ops::Range, path::PathBuf};

use thiserror::Error;

use erloom_core::schema::SchemaError;

/// The main error type for Erloom operations.
///
/// # Diagnostic Variants
///
/// The `SchemaSource` variant carries the schema document and the byte span
/// of the offending input, so callers can render a source snippet.
#[derive(Debug, Error)]
pub enum ErloomError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("{message}")]
    SchemaSource {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Malformed prior diagram `{}`: {reason}", path.display())]
    MalformedPriorFile { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ErloomError {
    /// Create a new `SchemaSource` error with the associated source document.
    pub fn new_schema_source_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::SchemaSource {
            message: message.into(),
            span,
            src: src.into(),
        }
    }
}
