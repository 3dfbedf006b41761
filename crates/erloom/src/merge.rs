//! Overlay of a prior diagram's geometry onto a fresh layout.
//!
//! Generated cell ids carry no identity across schema changes, so cells are
//! matched by [`CellKey`], derived from what the cell shows:
//!
//! - a table shape by its table name (the title of its entity markup, or the
//!   plain value of a container shape),
//! - a column row by its table name and row text,
//! - a line by the tables and column labels at both ends,
//! - a label by its line and the end it sits at.
//!
//! Matched cells take the prior geometry (and, for lines, the prior style
//! so manual routing survives). Fresh-only cells keep their computed layout;
//! prior-only cells are dropped.
//!
//! Column rows are stacked by their container, so a row only takes the prior
//! width. A table whose columns changed keeps its prior position but takes
//! the fresh height.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use erloom_core::diagram::{Cell, CellKind, Diagram};

use crate::{assembly::entity::entity_title, config::MergeConfig};

/// The end of a line a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Source,
    Target,
}

/// Identity of a foreign-key line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Identity of a cell that is stable across regenerations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Table(String),
    Row { table: String, row: String },
    Line(LineKey),
    Label { line: LineKey, side: Side },
}

/// Counts of what a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Fresh cells that took prior geometry or style.
    pub preserved: usize,
    /// Identified fresh cells with no prior counterpart.
    pub added: usize,
    /// Identified prior cells with no fresh counterpart.
    pub dropped: usize,
}

/// Computes the [`CellKey`] of every identifiable cell, by cell id.
pub fn identify(diagram: &Diagram) -> HashMap<&str, CellKey> {
    let mut keys: HashMap<&str, CellKey> = HashMap::new();

    // Tables sit on the default layer
    let mut tables: HashMap<&str, String> = HashMap::new();
    for cell in diagram.cells().iter().filter(|cell| cell.is_top_level()) {
        let (Cell::Shape(shape), Some(value)) = (cell, cell.value()) else {
            continue;
        };
        let name = if shape.style().is_flag_set("html") {
            entity_title(value)
        } else {
            Some(value.to_string())
        };
        if let Some(name) = name {
            keys.insert(shape.id(), CellKey::Table(name.clone()));
            tables.insert(shape.id(), name);
        }
    }

    // Rows are shapes nested in a table
    let mut rows: HashMap<&str, &str> = HashMap::new();
    for shape in diagram.shapes() {
        if let Some(table) = tables.get(shape.parent()) {
            rows.insert(shape.id(), shape.parent());
            keys.insert(
                shape.id(),
                CellKey::Row {
                    table: table.clone(),
                    row: shape.value().unwrap_or_default().to_string(),
                },
            );
        }
    }

    let table_of = |id: &str| {
        tables
            .get(id)
            .or_else(|| rows.get(id).and_then(|table_id| tables.get(table_id)))
    };

    let mut labels: HashMap<&str, Vec<(&str, Side, &str)>> = HashMap::new();
    for label in diagram.labels() {
        let side = side_from_id(label.id(), label.parent())
            .or_else(|| label.geometry().x().and_then(side_of));
        let Some(side) = side else {
            continue;
        };
        labels.entry(label.parent()).or_default().push((
            label.id(),
            side,
            label.value().unwrap_or_default(),
        ));
    }

    for line in diagram.lines() {
        let (Some(source_table), Some(target_table)) =
            (table_of(line.source()), table_of(line.target()))
        else {
            continue;
        };
        let line_labels = labels.get(line.id()).map(Vec::as_slice).unwrap_or_default();
        let column_at = |wanted: Side| {
            line_labels
                .iter()
                .find(|(_, side, _)| *side == wanted)
                .map(|(_, _, text)| text.to_string())
                .unwrap_or_default()
        };
        let key = LineKey {
            source_table: source_table.clone(),
            source_column: column_at(Side::Source),
            target_table: target_table.clone(),
            target_column: column_at(Side::Target),
        };
        for (id, side, _) in line_labels {
            keys.insert(
                *id,
                CellKey::Label {
                    line: key.clone(),
                    side: *side,
                },
            );
        }
        keys.insert(line.id(), CellKey::Line(key));
    }

    keys
}

/// Side encoded in a generated label id, `{line}-1` or `{line}-2`.
fn side_from_id(id: &str, line: &str) -> Option<Side> {
    match id.strip_prefix(line)?.strip_prefix('-')? {
        "1" => Some(Side::Source),
        "2" => Some(Side::Target),
        _ => None,
    }
}

/// Side of a label without a generated id, from its position on the line.
fn side_of(x: f64) -> Option<Side> {
    if x < 0.0 {
        Some(Side::Source)
    } else if x > 0.0 {
        Some(Side::Target)
    } else {
        None
    }
}

/// Overlays `prior` onto `fresh` in place.
///
/// The diagram name and id are carried over from `prior` so the document
/// keeps its identity, and the page grows to the larger of both page sizes.
pub fn merge(fresh: &mut Diagram, prior: &Diagram, config: &MergeConfig) -> MergeReport {
    let prior_keys = identify(prior);
    let mut prior_cells: HashMap<CellKey, &Cell> = HashMap::new();
    for cell in prior.cells() {
        if let Some(key) = prior_keys.get(cell.id()) {
            prior_cells.entry(key.clone()).or_insert(cell);
        }
    }

    let fresh_keys: HashMap<String, CellKey> = identify(fresh)
        .into_iter()
        .map(|(id, key)| (id.to_string(), key))
        .collect();

    let prior_contents = table_contents(prior, &prior_keys);
    let resized: HashSet<String> = table_contents(fresh, &identify(fresh))
        .into_iter()
        .filter(|(table, rows)| prior_contents.get(table).is_some_and(|prior| prior != rows))
        .map(|(table, _)| table)
        .collect();

    let mut report = MergeReport::default();
    let mut seen: HashSet<&CellKey> = HashSet::new();
    for cell in fresh.cells_mut() {
        let Some(key) = fresh_keys.get(cell.id()) else {
            continue;
        };
        let Some((prior_key, prior_cell)) = prior_cells.get_key_value(key) else {
            report.added += 1;
            continue;
        };
        seen.insert(prior_key);

        let preserved = match (key, cell.kind(), prior_cell.kind()) {
            (CellKey::Table(table), CellKind::Shape, CellKind::Shape) => {
                let height = cell.geometry().height();
                cell.set_geometry(prior_cell.geometry().clone());
                if resized.contains(table) {
                    cell.geometry_mut().set_height(height);
                }
                true
            }
            (CellKey::Row { .. }, CellKind::Shape, CellKind::Shape) => {
                cell.geometry_mut().set_width(prior_cell.geometry().width());
                true
            }
            (_, CellKind::Line, CellKind::Line) if config.preserve_lines() => {
                cell.set_style(prior_cell.style().clone());
                cell.set_geometry(prior_cell.geometry().clone());
                true
            }
            (_, CellKind::Label, CellKind::Label) if config.preserve_labels() => {
                cell.set_geometry(prior_cell.geometry().clone());
                true
            }
            _ => false,
        };
        if preserved {
            report.preserved += 1;
        }
    }
    report.dropped = prior_cells.len() - seen.len();

    fresh.set_name(prior.name());
    fresh.set_id(prior.id());
    let page_width = fresh.canvas().page_width.max(prior.canvas().page_width);
    let page_height = fresh.canvas().page_height.max(prior.canvas().page_height);
    let canvas = fresh.canvas_mut();
    canvas.page_width = page_width;
    canvas.page_height = page_height;
    canvas.dx = page_width / 2;
    canvas.dy = page_height / 2;

    debug!(
        prior_cells = prior.cells().len(),
        identified = prior_cells.len();
        "Prior diagram indexed"
    );
    info!(
        preserved = report.preserved,
        added = report.added,
        dropped = report.dropped;
        "Prior layout merged"
    );

    report
}

/// What each table shows: its own value followed by its row values.
fn table_contents(diagram: &Diagram, keys: &HashMap<&str, CellKey>) -> HashMap<String, Vec<String>> {
    let mut contents: HashMap<String, Vec<String>> = HashMap::new();
    for cell in diagram.cells() {
        let table = match keys.get(cell.id()) {
            Some(CellKey::Table(table) | CellKey::Row { table, .. }) => table,
            _ => continue,
        };
        contents
            .entry(table.clone())
            .or_default()
            .push(cell.value().unwrap_or_default().to_string());
    }
    contents
}
