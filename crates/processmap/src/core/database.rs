//! Core database trait for diagram data storage
//!
//! The node/edge store that parsers fill and renderers read. The `Diagram`
//! aggregate implements it with elements as nodes and connections as edges.

use anyhow::Result;

/// Core trait for diagram databases
///
/// Nodes are the top-level shapes; nested shapes travel inside their node.
/// Edges may name nodes that are not (yet) present.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a top-level node by ID
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;

    /// No nodes and no edges
    fn is_empty(&self) -> bool {
        self.node_count() == 0 && self.edge_count() == 0
    }
}
