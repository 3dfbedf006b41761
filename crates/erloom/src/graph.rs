//! Directed dependency graph with a deterministic topological sort.
//!
//! [`DependencyGraph`] stores an adjacency set per node plus, for every node,
//! the set of nodes pointing at it. An edge `a -> b` means "`a` references
//! `b`".
//!
//! # Determinism
//!
//! [`DependencyGraph::sort`] implements Kahn's algorithm. Both the initial
//! frontier of zero in-degree nodes and the expansion of each node's
//! neighbors are drained through a min-heap ordered by key, so the result
//! never depends on hash-map iteration order: the same graph built from
//! edges inserted in any order always sorts to the same sequence.
//!
//! # Cycles
//!
//! A graph with a cycle has no topological order. `sort` then returns
//! [`SortError::Cycle`] carrying the original and residual in-degree of
//! every node; no partial order is exposed.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap, HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
};

use log::trace;
use thiserror::Error;

/// In-degree diagnostics of a graph that contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<K: Ord> {
    /// In-degree of every node before sorting.
    pub original_edges: BTreeMap<K, usize>,
    /// In-degree left over once no further node could be released.
    pub remaining_edges: BTreeMap<K, usize>,
}

impl<K: Ord + Clone> CycleError<K> {
    /// Nodes left with a positive residual in-degree, in key order.
    ///
    /// These are the nodes on a cycle plus every node reachable from one.
    pub fn unresolved(&self) -> Vec<K> {
        self.remaining_edges
            .iter()
            .filter(|(_, remaining)| **remaining > 0)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Nodes whose every incoming edge was released, in key order.
    pub fn resolved(&self) -> Vec<K> {
        self.remaining_edges
            .iter()
            .filter(|(_, remaining)| **remaining == 0)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Errors returned by [`DependencyGraph::sort`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError<K: Ord + Debug> {
    #[error("cycle in dependency graph")]
    Cycle(CycleError<K>),

    #[error("topological sort exceeded its iteration bound of {bound}")]
    RuntimeExceeded { bound: usize },
}

/// A directed graph over opaque, ordered keys.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K>
where
    K: Ord + Hash + Clone + Debug,
{
    nodes: HashMap<K, HashSet<K>>,
    in_degree: HashMap<K, HashSet<K>>,
}

impl<K> Default for DependencyGraph<K>
where
    K: Ord + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DependencyGraph<K>
where
    K: Ord + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            in_degree: HashMap::new(),
        }
    }

    /// Adds `key` as a node. Re-adding an existing node is a no-op.
    pub fn add_node(&mut self, key: K) {
        self.nodes.entry(key).or_default();
    }

    /// Adds the edge `from -> to`, creating both nodes if absent.
    ///
    /// Edges form a set: adding the same edge twice has no further effect.
    pub fn add_edge(&mut self, from: K, to: K) {
        self.add_node(to.clone());
        self.nodes.entry(from.clone()).or_default().insert(to.clone());
        self.in_degree.entry(to).or_default().insert(from);
    }

    pub fn contains_node(&self, key: &K) -> bool {
        self.nodes.contains_key(key)
    }

    /// Returns the nodes `key` points to, in key order.
    pub fn neighbors(&self, key: &K) -> Vec<&K> {
        let mut neighbors: Vec<&K> = self
            .nodes
            .get(key)
            .map(|edges| edges.iter().collect())
            .unwrap_or_default();
        neighbors.sort();
        neighbors
    }

    /// Number of distinct nodes with an edge into `key`.
    pub fn in_degree(&self, key: &K) -> usize {
        self.in_degree.get(key).map_or(0, HashSet::len)
    }

    /// Number of distinct nodes `key` has an edge to.
    pub fn out_degree(&self, key: &K) -> usize {
        self.nodes.get(key).map_or(0, HashSet::len)
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges_count(&self) -> usize {
        self.in_degree.values().map(HashSet::len).sum()
    }

    /// Returns all nodes in key order.
    pub fn nodes(&self) -> Vec<&K> {
        let mut nodes: Vec<&K> = self.nodes.keys().collect();
        nodes.sort();
        nodes
    }

    /// Returns a topological order of every node.
    ///
    /// For every edge `a -> b`, `a` precedes `b`. Ties are broken by key
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::Cycle`] if any node keeps a positive residual
    /// in-degree, and [`SortError::RuntimeExceeded`] if the algorithm runs
    /// past `2 * (nodes + edges)` iterations, which indicates a defect.
    pub fn sort(&self) -> Result<Vec<K>, SortError<K>> {
        let bound = 2 * (self.nodes_count() + self.edges_count());

        let mut remaining: HashMap<&K, usize> = self
            .nodes
            .keys()
            .map(|key| (key, self.in_degree(key)))
            .collect();

        let mut frontier: BinaryHeap<Reverse<&K>> = remaining
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(key, _)| Reverse(*key))
            .collect();

        let mut order = Vec::with_capacity(self.nodes_count());
        let mut iterations = 0usize;

        while let Some(Reverse(node)) = frontier.pop() {
            order.push(node.clone());

            let mut expansion: BinaryHeap<Reverse<&K>> = self
                .nodes
                .get(node)
                .into_iter()
                .flatten()
                .map(Reverse)
                .collect();

            while let Some(Reverse(next)) = expansion.pop() {
                if let Some(degree) = remaining.get_mut(next) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        frontier.push(Reverse(next));
                    }
                }
            }

            iterations += 1;
            if iterations > bound {
                return Err(SortError::RuntimeExceeded { bound });
            }
        }

        let residual: usize = remaining.values().sum();
        if residual > 0 {
            trace!(residual; "Residual in-degree after sort");
            let original_edges = self
                .nodes
                .keys()
                .map(|key| (key.clone(), self.in_degree(key)))
                .collect();
            let remaining_edges = remaining
                .into_iter()
                .map(|(key, degree)| (key.clone(), degree))
                .collect();
            return Err(SortError::Cycle(CycleError {
                original_edges,
                remaining_edges,
            }));
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(edges: &[(&str, &str)]) -> DependencyGraph<String> {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_edge(from.to_string(), to.to_string());
        }
        graph
    }

    fn position(order: &[String], key: &str) -> usize {
        order.iter().position(|k| k == key).unwrap()
    }

    #[test]
    fn test_empty_graph_sorts_to_empty_order() {
        let graph: DependencyGraph<String> = DependencyGraph::new();

        assert_eq!(graph.sort(), Ok(vec![]));
        assert_eq!(graph.nodes_count(), 0);
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = DependencyGraph::new();
        graph.add_node("users".to_string());
        graph.add_edge("users".to_string(), "orgs".to_string());
        graph.add_node("users".to_string());

        assert_eq!(graph.nodes_count(), 2);
        assert_eq!(graph.out_degree(&"users".to_string()), 1);
    }

    #[test]
    fn test_add_edge_creates_both_nodes() {
        let graph = graph_from(&[("a", "b")]);

        assert!(graph.contains_node(&"a".to_string()));
        assert!(graph.contains_node(&"b".to_string()));
        assert_eq!(graph.in_degree(&"b".to_string()), 1);
        assert_eq!(graph.in_degree(&"a".to_string()), 0);
    }

    #[test]
    fn test_duplicate_edges_count_once() {
        let graph = graph_from(&[("a", "b"), ("a", "b")]);

        assert_eq!(graph.edges_count(), 1);
        assert_eq!(graph.in_degree(&"b".to_string()), 1);
    }

    #[test]
    fn test_neighbors_are_sorted() {
        let graph = graph_from(&[("a", "d"), ("a", "b"), ("a", "c")]);

        let neighbors: Vec<&str> = graph
            .neighbors(&"a".to_string())
            .into_iter()
            .map(String::as_str)
            .collect();
        assert_eq!(neighbors, vec!["b", "c", "d"]);
        assert!(graph.neighbors(&"missing".to_string()).is_empty());
    }

    #[test]
    fn test_sort_respects_edges() {
        let edges = [("a", "b"), ("b", "c"), ("a", "c"), ("d", "c"), ("e", "a")];
        let graph = graph_from(&edges);
        let order = graph.sort().unwrap();

        assert_eq!(order.len(), 5);
        for (from, to) in edges {
            assert!(position(&order, from) < position(&order, to), "{from} before {to}");
        }
    }

    #[test]
    fn test_sort_breaks_ties_by_key() {
        let mut graph = graph_from(&[("c", "x"), ("a", "x"), ("b", "x")]);
        graph.add_node("0".to_string());

        assert_eq!(graph.sort().unwrap(), vec!["0", "a", "b", "c", "x"]);
    }

    #[test]
    fn test_diamond_order() {
        let graph = graph_from(&[
            ("top", "right"),
            ("top", "left"),
            ("left", "bottom"),
            ("right", "bottom"),
        ]);

        assert_eq!(graph.sort().unwrap(), vec!["top", "left", "right", "bottom"]);
    }

    #[test]
    fn test_sort_independent_of_insertion_order() {
        let forward = graph_from(&[("a", "b"), ("b", "c"), ("x", "c"), ("y", "a")]);
        let backward = graph_from(&[("y", "a"), ("x", "c"), ("b", "c"), ("a", "b")]);

        assert_eq!(forward.sort(), backward.sort());
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = graph_from(&[("A", "B"), ("B", "A")]);

        let Err(SortError::Cycle(cycle)) = graph.sort() else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle.remaining_edges["A"], 1);
        assert_eq!(cycle.remaining_edges["B"], 1);
        assert_eq!(cycle.original_edges["A"], 1);
        assert_eq!(cycle.unresolved(), vec!["A", "B"]);
        assert!(cycle.resolved().is_empty());
    }

    #[test]
    fn test_cycle_diagnostics_separate_resolved_nodes() {
        // root -> a <-> b -> tail, free -> other
        let graph = graph_from(&[
            ("root", "a"),
            ("a", "b"),
            ("b", "a"),
            ("b", "tail"),
            ("free", "other"),
        ]);

        let Err(SortError::Cycle(cycle)) = graph.sort() else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle.unresolved(), vec!["a", "b", "tail"]);
        assert_eq!(cycle.resolved(), vec!["free", "other", "root"]);
        assert_eq!(cycle.original_edges["a"], 2);
        assert_eq!(cycle.remaining_edges["a"], 1);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_from(&[("a", "a")]);

        assert!(matches!(graph.sort(), Err(SortError::Cycle(_))));
    }
}
