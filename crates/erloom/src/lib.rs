//! Erloom - Entity-relationship diagrams for relational schemas.
//!
//! Layout and persistence of ER diagrams in the draw.io format. Tables are
//! layered along their foreign-key dependencies, placed on a column grid and
//! written as an `mxfile` document. Regenerating over an existing document
//! keeps the positions and line routing the user edited by hand.
//!
//! # Pipeline
//!
//! ```text
//! Schema
//!     ↓ graph + layering
//! Layering
//!     ↓ positioning
//! Placement
//!     ↓ assembly
//! Diagram ◀── merge ── prior file
//!     ↓ codec
//! mxfile XML
//! ```

pub mod assembly;
pub mod codec;
pub mod config;
pub mod graph;
pub mod layout;
pub mod merge;

mod error;

pub use erloom_core::{color, diagram, geometry, schema, style};

pub use error::ErloomError;

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};

use assembly::Assembler;
use config::{AppConfig, MalformedPolicy};
use diagram::Diagram;
use layout::{Layering, Placement, Positioner};
use merge::MergeReport;
use schema::Schema;

/// Builder for laying out and rendering Erloom diagrams.
///
/// # Examples
///
/// ```rust
/// use erloom::{
///     DiagramBuilder,
///     config::AppConfig,
///     schema::{Column, ColumnRef, Schema, Table},
/// };
///
/// let schema = Schema::new(vec![
///     Table::new("orgs", vec![Column::new("id")]),
///     Table::new(
///         "users",
///         vec![Column::new("org_id").with_reference(ColumnRef::new("orgs", "id"))],
///     ),
/// ]);
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let xml = builder.render(&schema, None).expect("Failed to render");
/// assert!(xml.starts_with("<mxfile"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate `schema` and compute its layering and placement.
    ///
    /// # Errors
    ///
    /// Returns `ErloomError` for an inconsistent schema (duplicate tables,
    /// dangling foreign keys), an invalid configuration, or a sort that
    /// exceeds its iteration bound. A foreign-key cycle is not an error.
    pub fn layout(&self, schema: &Schema) -> Result<(Layering, Placement), ErloomError> {
        self.config.validate()?;
        schema.validate()?;

        info!(tables = schema.tables().len(); "Layering tables");
        let layering = Layering::from_schema(schema)?;

        let layout = self.config.layout();
        let positioner = Positioner::new(
            layout.row_height(),
            layout.header_height(),
            layout.column_pitch(),
        );
        let placement = positioner.place(schema, &layering);
        info!(
            max_layer = placement.max_layer(),
            isolated = layering.unlayered().len();
            "Layout calculated"
        );

        Ok((layering, placement))
    }

    /// Build the fresh diagram of `schema`.
    ///
    /// # Errors
    ///
    /// See [`DiagramBuilder::layout`].
    pub fn build(&self, schema: &Schema) -> Result<Diagram, ErloomError> {
        let (_, placement) = self.layout(schema)?;
        let diagram = Assembler::new(&self.config).assemble(schema, &placement)?;
        trace!(diagram:?; "Assembled diagram");
        Ok(diagram)
    }

    /// Render `schema` to an `mxfile` document, merging `prior` when given.
    ///
    /// # Errors
    ///
    /// Returns `ErloomError` for build errors, and
    /// [`ErloomError::MalformedPriorFile`] when `prior` cannot be decoded
    /// and the merge policy is [`MalformedPolicy::Fail`].
    pub fn render(&self, schema: &Schema, prior: Option<&str>) -> Result<String, ErloomError> {
        let mut diagram = self.build(schema)?;
        if let Some(prior) = prior {
            self.merge_prior(&mut diagram, prior, Path::new("<prior>"))?;
        }
        let xml = codec::encode(&diagram);
        info!(bytes = xml.len(); "Diagram rendered");
        Ok(xml)
    }

    /// Render `schema`, merging the diagram stored at `path` if it exists.
    ///
    /// A missing file is not an error; the fresh layout is used as is.
    ///
    /// # Errors
    ///
    /// Returns `ErloomError` for build errors, I/O errors other than a
    /// missing file, and a malformed prior file under
    /// [`MalformedPolicy::Fail`].
    pub fn render_with_prior_file(
        &self,
        schema: &Schema,
        path: impl AsRef<Path>,
    ) -> Result<String, ErloomError> {
        let path = path.as_ref();
        let mut diagram = self.build(schema)?;

        if self.config.merge().enabled() {
            match fs::read(path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(prior) => {
                        self.merge_prior(&mut diagram, &prior, path)?;
                    }
                    Err(err) => {
                        self.malformed(path, format!("not UTF-8: {err}"))?;
                    }
                },
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(path = path.display().to_string(); "No prior diagram, using fresh layout");
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            debug!("Merging disabled");
        }

        let xml = codec::encode(&diagram);
        info!(bytes = xml.len(); "Diagram rendered");
        Ok(xml)
    }

    /// Overlay the decoded `prior` onto `diagram`.
    fn merge_prior(
        &self,
        diagram: &mut Diagram,
        prior: &str,
        origin: &Path,
    ) -> Result<Option<MergeReport>, ErloomError> {
        if !self.config.merge().enabled() {
            return Ok(None);
        }
        info!(path = origin.display().to_string(); "Merging prior diagram");
        match codec::decode(prior) {
            Ok(prior) => Ok(Some(merge::merge(diagram, &prior, self.config.merge()))),
            Err(err) => {
                self.malformed(origin, err.to_string())?;
                Ok(None)
            }
        }
    }

    /// Apply the malformed-file policy.
    fn malformed(&self, path: &Path, reason: String) -> Result<(), ErloomError> {
        match self.config.merge().on_malformed() {
            MalformedPolicy::Warn => {
                warn!(
                    path = path.display().to_string(),
                    reason = reason.as_str();
                    "Prior diagram is malformed, using fresh layout"
                );
                Ok(())
            }
            MalformedPolicy::Fail => Err(ErloomError::MalformedPriorFile {
                path: PathBuf::from(path),
                reason,
            }),
        }
    }
}
