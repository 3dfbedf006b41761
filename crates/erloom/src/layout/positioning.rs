//! Conversion of layers into canvas positions.
//!
//! The canvas is split into fixed-pitch columns. Isolated tables (and tables
//! left unlayered by a cycle) are packed first, sorted by name, into a block
//! at the top of the canvas. Layered tables go below that block:
//!
//! ```text
//!   x = 0        x = w        x = 2w
//! ┌────────┐  ┌────────┐  ┌────────┐
//! │isolated│  │isolated│  │isolated│   isolated block
//! └────────┘  └────────┘  └────────┘
//! ┌────────┐  ┌────────┐  ┌────────┐
//! │layer 2 │─▶│layer 1 │─▶│layer 0 │   layered tables
//! └────────┘  └────────┘  └────────┘
//! ```
//!
//! A table at `layer` sits at `x = (max_layer - layer) * w`, so the most
//! dependent tables are leftmost and referenced-only tables rightmost.

use indexmap::IndexMap;
use log::debug;

use erloom_core::{geometry::Position, schema::Schema};

use super::layering::Layering;

/// Computes table heights and positions from a [`Layering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positioner {
    row_height: i32,
    header_height: i32,
    column_pitch: i32,
}

impl Positioner {
    pub fn new(row_height: i32, header_height: i32, column_pitch: i32) -> Self {
        Self {
            row_height,
            header_height,
            column_pitch,
        }
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    pub fn header_height(&self) -> i32 {
        self.header_height
    }

    pub fn column_pitch(&self) -> i32 {
        self.column_pitch
    }

    /// Height in pixels of a table with `columns` rows.
    pub fn height(&self, columns: usize) -> i32 {
        let rows = i32::try_from(columns).unwrap_or(i32::MAX);
        self.header_height
            .saturating_add(self.row_height.saturating_mul(rows))
    }

    /// Places every table of `schema`.
    pub fn place(&self, schema: &Schema, layering: &Layering) -> Placement {
        let max_layer = layering.max_layer();
        let column_count = max_layer + 1;

        let heights: IndexMap<&str, i32> = schema
            .tables()
            .iter()
            .map(|table| (table.name(), self.height(table.columns().len())))
            .collect();
        let height_of = |name: &str| heights.get(name).copied().unwrap_or(self.header_height);

        let mut positions: IndexMap<String, Position> = IndexMap::new();

        // Isolated block
        let unlayered = layering.unlayered();
        let total: i32 = unlayered.iter().map(|name| height_of(name.as_str())).sum();
        let average = total / to_i32(column_count);

        let mut column = 0;
        let mut running = 0;
        let mut isolated_height = 0;
        for name in &unlayered {
            positions.insert(
                name.clone(),
                Position::new(column * self.column_pitch, running),
            );
            running += height_of(name.as_str());
            isolated_height = isolated_height.max(running);
            if running >= average {
                column += 1;
                running = 0;
            }
        }

        // Layered tables, stacked per column in schema order
        let mut column_heights = vec![isolated_height; column_count];
        for table in schema.tables() {
            let Some(layer) = layering.layer(table.name()) else {
                continue;
            };
            let slot = max_layer - layer;
            let y = column_heights[slot];
            positions.insert(
                table.name().to_string(),
                Position::new(to_i32(slot) * self.column_pitch, y),
            );
            column_heights[slot] = y + height_of(table.name());
        }

        debug!(
            tables = positions.len(),
            max_layer,
            isolated_height;
            "Tables positioned"
        );

        // Report in schema order regardless of placement order.
        let positions = schema
            .tables()
            .iter()
            .filter_map(|table| {
                positions
                    .get(table.name())
                    .map(|position| (table.name().to_string(), *position))
            })
            .collect();

        Placement {
            positions,
            max_layer,
            isolated_height,
        }
    }
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Positions of every table, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    positions: IndexMap<String, Position>,
    max_layer: usize,
    isolated_height: i32,
}

impl Placement {
    pub fn position(&self, table: &str) -> Option<Position> {
        self.positions.get(table).copied()
    }

    pub fn positions(&self) -> &IndexMap<String, Position> {
        &self.positions
    }

    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    /// Height of the isolated block, where layered tables start.
    pub fn isolated_height(&self) -> i32 {
        self.isolated_height
    }
}
