//! Erloom CLI library
//!
//! This module contains the core CLI logic for the Erloom diagram tool.

pub mod error_adapter;

mod args;
mod config;
mod schema;

pub use args::Args;
pub use error_adapter::{ErrorAdapter, Reportable, to_reportables};

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::info;
use tempfile::NamedTempFile;

use erloom::{DiagramBuilder, ErloomError};

/// Run the Erloom CLI application
///
/// This function loads the schema, lays it out, merges the diagram already
/// stored at the output path (unless merging is disabled) and writes the
/// result back to the output path.
///
/// # Errors
///
/// Returns `ErloomError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Schema loading and validation errors
/// - Layout errors
/// - A malformed prior diagram when the merge policy is `fail`
pub fn run(args: &Args) -> Result<(), ErloomError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing schema"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.no_merge {
        let merge = app_config.merge().with_enabled(false);
        app_config = app_config.with_merge(merge);
    }

    let schema = schema::load_schema(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let xml = builder.render_with_prior_file(&schema, &args.output)?;

    write_atomically(Path::new(&args.output), xml.as_bytes())?;

    info!(output_file = args.output; "Diagram exported successfully");

    Ok(())
}

/// Write `contents` to `path` through a temporary file in the same directory.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), ErloomError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
