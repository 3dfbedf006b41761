//! Relational schema model consumed by the layout engine.
//!
//! The schema is produced by an external parser (or loaded from a TOML
//! description by the CLI) and is only ever read by Erloom. Foreign keys are
//! expressed as a non-owning [`ColumnRef`] naming the referenced table and
//! column; [`Schema::validate`] checks that every reference resolves.
//!
//! # Example
//!
//! ```
//! # use erloom_core::schema::{Column, ColumnRef, Schema, Table};
//! let schema = Schema::new(vec![
//!     Table::new("orgs", vec![Column::new("id")]),
//!     Table::new(
//!         "users",
//!         vec![
//!             Column::new("id"),
//!             Column::new("org_id").with_reference(ColumnRef::new("orgs", "id")),
//!         ],
//!     ),
//! ]);
//!
//! assert!(schema.validate().is_ok());
//! assert_eq!(schema.table("users").unwrap().foreign_keys().count(), 1);
//! ```

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a schema violates the engine's input contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("table `{table}` is defined more than once")]
    DuplicateTable { table: String },

    #[error(
        "column `{table}.{column}` references `{foreign_table}.{foreign_column}`, which does not exist"
    )]
    DanglingForeignKey {
        table: String,
        column: String,
        foreign_table: String,
        foreign_column: String,
    },
}

/// An ordered collection of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    tables: Vec<Table>,
}

impl Schema {
    /// Creates a schema from tables in their declaration order.
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Returns the tables in declaration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Looks up a table by its display name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Returns `true` if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Checks that table names are unique and every foreign key resolves.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] for the first repeated table
    /// name, or [`SchemaError::DanglingForeignKey`] for the first reference
    /// whose table or column is missing.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
        }

        for table in &self.tables {
            for (_, column, reference) in table.foreign_keys() {
                let resolved = self
                    .table(reference.table())
                    .and_then(|foreign| foreign.column(reference.column()));
                if resolved.is_none() {
                    return Err(SchemaError::DanglingForeignKey {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        foreign_table: reference.table.clone(),
                        foreign_column: reference.column.clone(),
                    });
                }
            }
        }

        debug!(tables = self.tables.len(); "Schema validated");
        Ok(())
    }
}

/// A table with its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    #[serde(default)]
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the table's display name, which is also its merge identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Iterates over foreign-key columns as `(column index, column, reference)`.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (usize, &Column, &ColumnRef)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, column)| column.references.as_ref().map(|r| (idx, column, r)))
    }
}

/// A single column.
///
/// Only `name` and `references` influence layout; the remaining attributes
/// are displayed in the entity's embedded table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    #[serde(default, rename = "type")]
    data_type: String,
    #[serde(default)]
    not_null: bool,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    references: Option<ColumnRef>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn with_not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Marks this column as a foreign key to `reference`.
    pub fn with_reference(mut self, reference: ColumnRef) -> Self {
        self.references = Some(reference);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Returns the outgoing foreign-key reference, if any.
    pub fn references(&self) -> Option<&ColumnRef> {
        self.references.as_ref()
    }
}

/// A non-owning reference to `table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    table: String,
    column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}
