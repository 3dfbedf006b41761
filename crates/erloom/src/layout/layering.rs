//! Layer assignment over the foreign-key dependency graph.
//!
//! Every table that takes part in a foreign key receives an integer layer:
//! `0` for tables without outgoing references, otherwise one more than the
//! highest layer among the tables it references. Tables without any foreign
//! key in either direction are *isolated* and get no layer.
//!
//! A referential cycle does not abort layering. The nodes the topological
//! sort could still release form an acyclic residual that is layered as
//! usual; the tables left on or behind the cycle are reported as cyclic and
//! placed with the isolated tables.

use indexmap::IndexMap;
use log::{debug, warn};

use erloom_core::schema::Schema;

use crate::{
    error::ErloomError,
    graph::{DependencyGraph, SortError},
};

/// The outcome of layering a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layering {
    layers: IndexMap<String, usize>,
    isolated: Vec<String>,
    cyclic: Vec<String>,
}

impl Layering {
    /// Builds the dependency graph of `schema` and assigns layers.
    ///
    /// Self-referencing foreign keys do not add an edge; the table is still
    /// registered as a graph node so it is layered rather than isolated.
    ///
    /// # Errors
    ///
    /// Returns [`ErloomError::Graph`] if the topological sort exceeds its
    /// iteration bound.
    pub fn from_schema(schema: &Schema) -> Result<Self, ErloomError> {
        let graph = dependency_graph(schema);
        debug!(
            nodes = graph.nodes_count(),
            edges = graph.edges_count();
            "Dependency graph built"
        );

        let (order, cyclic) = match graph.sort() {
            Ok(order) => (order, Vec::new()),
            Err(SortError::Cycle(cycle)) => {
                let cyclic = cycle.unresolved();
                warn!(
                    tables:? = cyclic;
                    "Foreign-key cycle detected, placing affected tables with isolated tables"
                );
                let residual = residual_graph(&graph, &cycle.resolved());
                let order = residual.sort().map_err(graph_error)?;
                (order, cyclic)
            }
            Err(err) => return Err(graph_error(err)),
        };

        let mut assigned: IndexMap<String, usize> = IndexMap::new();
        for table in order.iter().rev() {
            let layer = graph
                .neighbors(table)
                .into_iter()
                .filter_map(|referenced| assigned.get(referenced))
                .map(|layer| layer + 1)
                .max()
                .unwrap_or(0);
            assigned.insert(table.clone(), layer);
        }

        // Re-key in schema order so iteration is stable for callers.
        let mut layers = IndexMap::new();
        let mut isolated = Vec::new();
        for table in schema.tables() {
            match assigned.get(table.name()) {
                Some(&layer) => {
                    layers.insert(table.name().to_string(), layer);
                }
                None if !graph.contains_node(&table.name().to_string()) => {
                    isolated.push(table.name().to_string());
                }
                None => {}
            }
        }
        isolated.sort();

        debug!(
            layered = layers.len(),
            isolated = isolated.len(),
            cyclic = cyclic.len();
            "Layers assigned"
        );

        Ok(Self {
            layers,
            isolated,
            cyclic,
        })
    }

    /// Returns the layer of `table`, or `None` for isolated and cyclic tables.
    pub fn layer(&self, table: &str) -> Option<usize> {
        self.layers.get(table).copied()
    }

    /// Returns the layer map in schema order.
    pub fn layers(&self) -> &IndexMap<String, usize> {
        &self.layers
    }

    /// The highest assigned layer, `0` when nothing is layered.
    pub fn max_layer(&self) -> usize {
        self.layers.values().copied().max().unwrap_or(0)
    }

    /// Tables without any foreign key in either direction, sorted by name.
    pub fn isolated(&self) -> &[String] {
        &self.isolated
    }

    /// Tables left unlayered by a referential cycle, sorted by name.
    pub fn cyclic(&self) -> &[String] {
        &self.cyclic
    }

    /// All tables placed in the isolated bucket, sorted by name.
    pub fn unlayered(&self) -> Vec<String> {
        let mut unlayered: Vec<String> = self
            .isolated
            .iter()
            .chain(self.cyclic.iter())
            .cloned()
            .collect();
        unlayered.sort();
        unlayered
    }
}

/// Builds the `table -> referenced table` graph of a schema.
pub fn dependency_graph(schema: &Schema) -> DependencyGraph<String> {
    let mut graph = DependencyGraph::new();
    for table in schema.tables() {
        for (_, _, reference) in table.foreign_keys() {
            if reference.table() == table.name() {
                graph.add_node(table.name().to_string());
            } else {
                graph.add_edge(table.name().to_string(), reference.table().to_string());
            }
        }
    }
    graph
}

/// Restricts `graph` to `keep`, dropping every edge that leaves the set.
fn residual_graph(graph: &DependencyGraph<String>, keep: &[String]) -> DependencyGraph<String> {
    let mut residual = DependencyGraph::new();
    for node in keep {
        residual.add_node(node.clone());
        for neighbor in graph.neighbors(node) {
            if keep.binary_search(neighbor).is_ok() {
                residual.add_edge(node.clone(), neighbor.clone());
            }
        }
    }
    residual
}

fn graph_error(err: SortError<String>) -> ErloomError {
    ErloomError::Graph(err.to_string())
}

#[cfg(test)]
mod tests {
    use erloom_core::schema::{Column, ColumnRef, Table};

    use super::*;

    /// Builds a table whose columns reference each of `refs` by `id`.
    fn table(name: &str, refs: &[&str]) -> Table {
        let mut columns = vec![Column::new("id")];
        columns.extend(refs.iter().map(|target| {
            Column::new(format!("{target}_id")).with_reference(ColumnRef::new(*target, "id"))
        }));
        Table::new(name, columns)
    }

    #[test]
    fn test_chain_layers() {
        let schema = Schema::new(vec![table("A", &["B"]), table("B", &["C"]), table("C", &[])]);
        let layering = Layering::from_schema(&schema).unwrap();

        assert_eq!(layering.layer("C"), Some(0));
        assert_eq!(layering.layer("B"), Some(1));
        assert_eq!(layering.layer("A"), Some(2));
        assert_eq!(layering.max_layer(), 2);
        assert!(layering.isolated().is_empty());
    }

    #[test]
    fn test_layer_exceeds_every_referenced_layer() {
        // orders -> users -> orgs, orders -> products
        let schema = Schema::new(vec![
            table("orders", &["users", "products"]),
            table("users", &["orgs"]),
            table("products", &[]),
            table("orgs", &[]),
        ]);
        let layering = Layering::from_schema(&schema).unwrap();

        assert_eq!(layering.layer("orgs"), Some(0));
        assert_eq!(layering.layer("products"), Some(0));
        assert_eq!(layering.layer("users"), Some(1));
        assert_eq!(layering.layer("orders"), Some(2));
    }

    #[test]
    fn test_isolated_tables_are_excluded_and_sorted() {
        let schema = Schema::new(vec![
            table("zeta", &[]),
            table("users", &["orgs"]),
            table("alpha", &[]),
            table("orgs", &[]),
        ]);
        let layering = Layering::from_schema(&schema).unwrap();

        assert_eq!(layering.isolated(), ["alpha", "zeta"]);
        assert_eq!(layering.layer("zeta"), None);
        assert_eq!(layering.layers().len(), 2);
    }

    #[test]
    fn test_layers_follow_schema_order() {
        let schema = Schema::new(vec![table("b", &["a"]), table("a", &[]), table("c", &["a"])]);
        let layering = Layering::from_schema(&schema).unwrap();

        let keys: Vec<&str> = layering.layers().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_self_reference_is_layered() {
        let schema = Schema::new(vec![table("employees", &["employees"]), table("misc", &[])]);
        let layering = Layering::from_schema(&schema).unwrap();

        assert_eq!(layering.layer("employees"), Some(0));
        assert_eq!(layering.isolated(), ["misc"]);
        assert!(layering.cyclic().is_empty());
    }

    #[test]
    fn test_cycle_degrades_to_isolated_placement() {
        // root -> a <-> b, plus an independent chain x -> y
        let schema = Schema::new(vec![
            table("root", &["a"]),
            table("a", &["b"]),
            table("b", &["a"]),
            table("x", &["y"]),
            table("y", &[]),
        ]);
        let layering = Layering::from_schema(&schema).unwrap();

        assert_eq!(layering.cyclic(), ["a", "b"]);
        assert_eq!(layering.layer("a"), None);
        assert_eq!(layering.layer("b"), None);
        assert_eq!(layering.layer("root"), Some(0));
        assert_eq!(layering.layer("x"), Some(1));
        assert_eq!(layering.layer("y"), Some(0));
        assert_eq!(layering.unlayered(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_schema() {
        let layering = Layering::from_schema(&Schema::default()).unwrap();

        assert_eq!(layering.max_layer(), 0);
        assert!(layering.layers().is_empty());
    }
}
