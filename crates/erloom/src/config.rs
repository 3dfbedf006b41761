//! Configuration types for Erloom diagram generation.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, identified, styled and merged with a previously exported
//! file. All types implement [`serde::Deserialize`] for loading from TOML,
//! and every section falls back to its defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Anchor mode and geometry constants.
//! - [`DocumentConfig`] - Diagram name, ids and page size.
//! - [`StyleConfig`] - Background color and style sheet overrides.
//! - [`MergeConfig`] - What survives from a prior diagram file.
//!
//! # Example
//!
//! ```
//! # use erloom::config::{AppConfig, AnchorMode};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().anchor(), AnchorMode::Table);
//! assert_eq!(config.layout().row_height(), 16);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use erloom_core::{color::Color, style::Style};

use crate::error::ErloomError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Document configuration section.
    #[serde(default)]
    document: DocumentConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Merge configuration section.
    #[serde(default)]
    merge: MergeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        layout: LayoutConfig,
        document: DocumentConfig,
        style: StyleConfig,
        merge: MergeConfig,
    ) -> Self {
        Self {
            layout,
            document,
            style,
            merge,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn merge(&self) -> &MergeConfig {
        &self.merge
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_document(mut self, document: DocumentConfig) -> Self {
        self.document = document;
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ErloomError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), ErloomError> {
        let layout = &self.layout;
        if layout.row_height <= 0 {
            return Err(config_error("layout.row_height must be positive"));
        }
        if layout.header_height < 0 {
            return Err(config_error("layout.header_height must not be negative"));
        }
        if layout.table_width <= 0 {
            return Err(config_error("layout.table_width must be positive"));
        }
        if layout.column_pitch < layout.table_width {
            return Err(config_error(
                "layout.column_pitch must be at least layout.table_width",
            ));
        }
        if !(layout.label_offset > 0.0 && layout.label_offset <= 1.0) {
            return Err(config_error("layout.label_offset must be in (0, 1]"));
        }
        if self.document.cell_id_prefix.is_empty() {
            return Err(config_error("document.cell_id_prefix must not be empty"));
        }
        if matches!(self.document.cell_id_prefix.as_str(), "0" | "1") {
            return Err(config_error(
                "document.cell_id_prefix must not collide with the sentinel cell ids",
            ));
        }
        self.style.background_color()?;
        Ok(())
    }
}

fn config_error(message: &str) -> ErloomError {
    ErloomError::Config(message.to_string())
}

/// Where foreign-key lines attach.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// One shape per table; lines attach at relative row offsets (default)
    #[default]
    Table,
    /// One child shape per column; lines attach to the row shapes
    Row,
}

/// Anchor mode and geometry constants, in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    anchor: AnchorMode,
    row_height: i32,
    header_height: i32,
    table_width: i32,
    column_pitch: i32,
    label_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            anchor: AnchorMode::Table,
            row_height: 16,
            header_height: 20,
            table_width: 180,
            column_pitch: 260,
            label_offset: 0.8,
        }
    }
}

impl LayoutConfig {
    pub fn anchor(&self) -> AnchorMode {
        self.anchor
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    pub fn header_height(&self) -> i32 {
        self.header_height
    }

    pub fn table_width(&self) -> i32 {
        self.table_width
    }

    /// Horizontal distance between the left edges of adjacent columns.
    pub fn column_pitch(&self) -> i32 {
        self.column_pitch
    }

    /// Relative position of the endpoint labels along each line.
    pub fn label_offset(&self) -> f64 {
        self.label_offset
    }

    pub fn with_anchor(mut self, anchor: AnchorMode) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_row_height(mut self, row_height: i32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_header_height(mut self, header_height: i32) -> Self {
        self.header_height = header_height;
        self
    }

    pub fn with_table_width(mut self, table_width: i32) -> Self {
        self.table_width = table_width;
        self
    }

    pub fn with_column_pitch(mut self, column_pitch: i32) -> Self {
        self.column_pitch = column_pitch;
        self
    }

    pub fn with_label_offset(mut self, label_offset: f64) -> Self {
        self.label_offset = label_offset;
        self
    }
}

/// Document identity and page settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    diagram_name: String,
    diagram_id: String,
    cell_id_prefix: String,
    page_width: i32,
    page_height: i32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            diagram_name: "Page-1".to_string(),
            diagram_id: "erloom-diagram".to_string(),
            cell_id_prefix: "erloom".to_string(),
            page_width: 1169,
            page_height: 827,
        }
    }
}

impl DocumentConfig {
    pub fn diagram_name(&self) -> &str {
        &self.diagram_name
    }

    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    /// Prefix of every generated cell id.
    pub fn cell_id_prefix(&self) -> &str {
        &self.cell_id_prefix
    }

    /// Minimum page width; the page grows to fit the content.
    pub fn page_width(&self) -> i32 {
        self.page_width
    }

    /// Minimum page height; the page grows to fit the content.
    pub fn page_height(&self) -> i32 {
        self.page_height
    }

    pub fn with_diagram_name(mut self, name: impl Into<String>) -> Self {
        self.diagram_name = name.into();
        self
    }

    pub fn with_diagram_id(mut self, id: impl Into<String>) -> Self {
        self.diagram_id = id.into();
        self
    }

    pub fn with_cell_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cell_id_prefix = prefix.into();
        self
    }

    pub fn with_page_size(mut self, width: i32, height: i32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }
}

/// Visual styling configuration.
///
/// Each override table is merged key by key over the matching default
/// style; keys already present keep their position, new keys are appended.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Canvas background [`Color`], as a color string.
    background_color: Option<String>,
    entity: Style,
    header: Style,
    table: Style,
    cell: Style,
    link: Style,
    edge_label: Style,
    row_table: Style,
    row: Style,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ErloomError::Config`] if the configured color string cannot
    /// be parsed into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, ErloomError> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| ErloomError::Config(format!("Invalid background color: {err}")))
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Overrides for the entity (table) shape style.
    pub fn entity(&self) -> &Style {
        &self.entity
    }

    /// Overrides for the CSS of the entity title bar.
    pub fn header(&self) -> &Style {
        &self.header
    }

    /// Overrides for the CSS of the entity column table.
    pub fn table(&self) -> &Style {
        &self.table
    }

    /// Overrides for the CSS of each column table cell.
    pub fn cell(&self) -> &Style {
        &self.cell
    }

    /// Overrides for the foreign-key line style.
    pub fn link(&self) -> &Style {
        &self.link
    }

    /// Overrides for the line endpoint label style.
    pub fn edge_label(&self) -> &Style {
        &self.edge_label
    }

    /// Overrides for the table container style in row anchor mode.
    pub fn row_table(&self) -> &Style {
        &self.row_table
    }

    /// Overrides for the column row style in row anchor mode.
    pub fn row(&self) -> &Style {
        &self.row
    }

    pub fn with_link(mut self, link: Style) -> Self {
        self.link = link;
        self
    }

    pub fn with_entity(mut self, entity: Style) -> Self {
        self.entity = entity;
        self
    }
}

/// What to do when the prior diagram file cannot be read as a diagram.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log a warning and keep the fresh layout (default)
    #[default]
    Warn,
    /// Abort generation
    Fail,
}

/// Controls the overlay of a prior diagram onto the fresh layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    enabled: bool,
    preserve_lines: bool,
    preserve_labels: bool,
    on_malformed: MalformedPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preserve_lines: true,
            preserve_labels: true,
            on_malformed: MalformedPolicy::Warn,
        }
    }
}

impl MergeConfig {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether line styles and waypoints survive regeneration.
    pub fn preserve_lines(&self) -> bool {
        self.preserve_lines
    }

    /// Whether label placements survive regeneration.
    pub fn preserve_labels(&self) -> bool {
        self.preserve_labels
    }

    pub fn on_malformed(&self) -> MalformedPolicy {
        self.on_malformed
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_preserve_lines(mut self, preserve_lines: bool) -> Self {
        self.preserve_lines = preserve_lines;
        self
    }

    pub fn with_preserve_labels(mut self, preserve_labels: bool) -> Self {
        self.preserve_labels = preserve_labels;
        self
    }

    pub fn with_on_malformed(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }
}
