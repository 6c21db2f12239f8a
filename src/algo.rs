//! Building blocks for fast routing algorithms.

use crate::datastr::graph::*;

pub mod contraction_hierarchy;
pub mod dijkstra;

/// Simply a source-target pair
#[derive(Debug, Clone, Copy)]
pub struct Query {
    pub from: NodeId,
    pub to: NodeId,
}

/// An answered query: the node path in base-graph ids and the scaled distance.
///
/// Unreachable targets and out of range ids both yield the empty result.
/// Callers that need to distinguish the two can ask the server for the raw
/// distance, which is `None` exactly when no path exists.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub path: Vec<NodeId>,
    pub distance: f64,
}

impl QueryResult {
    pub fn empty() -> QueryResult {
        QueryResult {
            path: Vec::new(),
            distance: 0.0,
        }
    }
}
