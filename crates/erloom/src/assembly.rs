//! Assembly of the diagram cell model from a placed schema.
//!
//! Every table becomes a shape at its placed position, every foreign key a
//! line with two endpoint labels. Cell ids derive from schema order only:
//!
//! | Cell            | Id                        |
//! |-----------------|---------------------------|
//! | table `i`       | `{prefix}-{i}`            |
//! | column row `j`  | `{prefix}-{i}-{j}`        |
//! | foreign key `n` | `{prefix}-fk-{n}`         |
//! | endpoint labels | `{prefix}-fk-{n}-1`, `-2` |
//!
//! so an unchanged schema always assembles the same document.

pub mod entity;
pub mod stylesheet;

use std::collections::HashMap;

use log::debug;

use erloom_core::{
    diagram::{Canvas, CellKind, Diagram, Label, Line, Shape},
    geometry::Geometry,
    schema::{Column, Schema, Table},
    style::Style,
};

use crate::{
    config::{AnchorMode, AppConfig},
    error::ErloomError,
    layout::Placement,
};

use stylesheet::{ANCHOR_KEYS, StyleSheet};

/// Builds [`Diagram`]s from a schema and its placement.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    config: &'a AppConfig,
    sheet: StyleSheet,
}

/// A table's shape id and the ids of its column rows.
struct TableCells {
    index: usize,
    id: String,
    rows: Vec<String>,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            sheet: StyleSheet::from_config(config.style()),
        }
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Assembles the fresh diagram.
    ///
    /// # Errors
    ///
    /// Returns [`ErloomError::Layout`] if a table has no position in
    /// `placement`, or [`ErloomError::Config`] for an invalid background
    /// color.
    pub fn assemble(&self, schema: &Schema, placement: &Placement) -> Result<Diagram, ErloomError> {
        let document = self.config.document();
        let mut diagram = Diagram::new(
            document.diagram_name(),
            document.diagram_id(),
            Canvas::default(),
        );

        let mut tables: HashMap<&str, TableCells> = HashMap::new();
        for (index, table) in schema.tables().iter().enumerate() {
            let position = placement.position(table.name()).ok_or_else(|| {
                ErloomError::Layout(format!("table `{}` has no position", table.name()))
            })?;
            let cells = self.push_table(&mut diagram, index, table, position.x(), position.y());
            tables.insert(table.name(), cells);
        }

        let mut fk_count = 0;
        for table in schema.tables() {
            for (column_index, column, reference) in table.foreign_keys() {
                let (Some(source), Some(target), Some(referenced)) = (
                    tables.get(table.name()),
                    tables.get(reference.table()),
                    schema.table(reference.table()),
                ) else {
                    continue;
                };
                let target_index = referenced
                    .columns()
                    .iter()
                    .position(|candidate| candidate.name() == reference.column());
                let endpoints = Endpoints {
                    source,
                    source_table: table,
                    source_column: column_index,
                    target,
                    target_table: referenced,
                    target_column: target_index,
                };
                self.push_foreign_key(&mut diagram, fk_count, &endpoints, column, reference.column());
                fk_count += 1;
            }
        }

        *diagram.canvas_mut() = self.canvas(&diagram)?;

        debug!(
            tables = tables.len(),
            foreign_keys = fk_count,
            cells = diagram.cells().len();
            "Diagram assembled"
        );

        Ok(diagram)
    }

    fn push_table(
        &self,
        diagram: &mut Diagram,
        index: usize,
        table: &Table,
        x: i32,
        y: i32,
    ) -> TableCells {
        let layout = self.config.layout();
        let prefix = self.config.document().cell_id_prefix();
        let id = format!("{prefix}-{index}");
        let height = self.table_height(table);
        let geometry = Geometry::rect(
            f64::from(x),
            f64::from(y),
            f64::from(layout.table_width()),
            f64::from(height),
        );

        match layout.anchor() {
            AnchorMode::Table => {
                let value = entity::entity_fragment(table, &self.sheet);
                diagram.push(Shape::new(&id, self.sheet.entity().clone(), geometry).with_value(value));
                TableCells {
                    index,
                    id,
                    rows: Vec::new(),
                }
            }
            AnchorMode::Row => {
                let mut style = self.sheet.row_table().clone();
                style.set("startSize", layout.header_height().to_string());
                diagram.push(Shape::new(&id, style, geometry).with_value(table.name()));

                let rows = table
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(column_index, column)| {
                        let row_id = format!("{id}-{column_index}");
                        let row_y = layout.header_height() + layout.row_height() * to_i32(column_index);
                        let geometry = Geometry::rect(
                            0.0,
                            f64::from(row_y),
                            f64::from(layout.table_width()),
                            f64::from(layout.row_height()),
                        );
                        diagram.push(
                            Shape::new(&row_id, self.sheet.row().clone(), geometry)
                                .with_parent(&id)
                                .with_value(row_label(column)),
                        );
                        row_id
                    })
                    .collect();
                TableCells { index, id, rows }
            }
        }
    }

    fn push_foreign_key(
        &self,
        diagram: &mut Diagram,
        n: usize,
        endpoints: &Endpoints<'_>,
        column: &Column,
        referenced_column: &str,
    ) {
        let prefix = self.config.document().cell_id_prefix();
        let id = format!("{prefix}-fk-{n}");

        let line = match self.config.layout().anchor() {
            AnchorMode::Table => Line::new(
                &id,
                &endpoints.source.id,
                &endpoints.target.id,
                self.anchored_link_style(diagram, endpoints),
            ),
            AnchorMode::Row => {
                let mut style = self.sheet.link().clone();
                for key in ANCHOR_KEYS {
                    style.remove(key);
                }
                let source = endpoints
                    .source
                    .rows
                    .get(endpoints.source_column)
                    .unwrap_or(&endpoints.source.id);
                let target = endpoints
                    .target_column
                    .and_then(|column| endpoints.target.rows.get(column))
                    .unwrap_or(&endpoints.target.id);
                Line::new(&id, source, target, style)
            }
        };
        diagram.push(line);

        let offset = self.config.layout().label_offset();
        for (suffix, position, text) in [
            (1, -offset, column.name()),
            (2, offset, referenced_column),
        ] {
            diagram.push(
                Label::new(
                    format!("{id}-{suffix}"),
                    &id,
                    self.sheet.edge_label().clone(),
                    Geometry::edge_label(position),
                )
                .with_value(text),
            );
        }
    }

    /// Link style pinned to the rows of both columns on the table borders.
    fn anchored_link_style(&self, diagram: &Diagram, endpoints: &Endpoints<'_>) -> Style {
        let source_x = shape_x(diagram, &endpoints.source.id);
        let target_x = shape_x(diagram, &endpoints.target.id);
        let (exit_x, entry_x) = if endpoints.source.index == endpoints.target.index {
            ("1", "1")
        } else if source_x <= target_x {
            ("1", "0")
        } else {
            ("0", "1")
        };

        let exit_y = self.row_anchor(endpoints.source_table, Some(endpoints.source_column));
        let entry_y = self.row_anchor(endpoints.target_table, endpoints.target_column);

        let mut style = self.sheet.link().clone();
        style
            .set("exitX", exit_x)
            .set("exitY", format_ratio(exit_y))
            .set("entryX", entry_x)
            .set("entryY", format_ratio(entry_y));
        style
    }

    /// Relative vertical center of row `column` within `table`'s shape.
    fn row_anchor(&self, table: &Table, column: Option<usize>) -> f64 {
        let Some(column) = column else {
            return 0.5;
        };
        let layout = self.config.layout();
        let center = f64::from(layout.header_height())
            + (column as f64 + 0.5) * f64::from(layout.row_height());
        center / f64::from(self.table_height(table))
    }

    fn table_height(&self, table: &Table) -> i32 {
        let layout = self.config.layout();
        layout.header_height() + layout.row_height() * to_i32(table.columns().len())
    }

    /// Page large enough for the configured size and every top-level shape.
    fn canvas(&self, diagram: &Diagram) -> Result<Canvas, ErloomError> {
        let document = self.config.document();
        let (right, bottom) = diagram
            .cells()
            .iter()
            .filter(|cell| cell.kind() == CellKind::Shape && cell.is_top_level())
            .fold((0.0_f64, 0.0_f64), |(right, bottom), cell| {
                (
                    right.max(cell.geometry().right()),
                    bottom.max(cell.geometry().bottom()),
                )
            });
        let width = document.page_width().max(right.ceil() as i32);
        let height = document.page_height().max(bottom.ceil() as i32);

        let mut canvas = Canvas::with_page_size(width, height);
        if let Some(color) = self.config.style().background_color()? {
            canvas.background = color.to_hex();
        }
        Ok(canvas)
    }
}

struct Endpoints<'t> {
    source: &'t TableCells,
    source_table: &'t Table,
    source_column: usize,
    target: &'t TableCells,
    target_table: &'t Table,
    target_column: Option<usize>,
}

fn shape_x(diagram: &Diagram, id: &str) -> f64 {
    diagram
        .cell(id)
        .and_then(|cell| cell.geometry().x())
        .unwrap_or_default()
}

fn row_label(column: &Column) -> String {
    if column.data_type().is_empty() {
        column.name().to_string()
    } else {
        format!("{} {}", column.name(), column.data_type())
    }
}

/// Formats a ratio with at most four decimals.
fn format_ratio(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{rounded}")
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
