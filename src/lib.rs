//! Routing core based on Contraction Hierarchies.
//!
//! Preprocessing contracts the nodes of a static directed road graph in a
//! caller supplied order and augments it with shortcut edges. Queries then
//! run a bidirectional Dijkstra that only climbs to higher ranked nodes and
//! unpack the shortcuts on the result back into the original node sequence.
//! Orders of magnitude faster than plain Dijkstra on road networks, at the
//! price of one preprocessing pass.
//!
//! ```
//! use ch_engine::algo::contraction_hierarchy::{contract, query::Server};
//! use ch_engine::algo::Query;
//! use ch_engine::datastr::graph::{ContractionGraph, Weight};
//!
//! let mut graph = ContractionGraph::new(3);
//! graph.add_edge(0, 1, Weight::new(5.0));
//! graph.add_edge(1, 2, Weight::new(5.0));
//! graph.add_edge(0, 2, Weight::new(100.0));
//! contract(&mut graph, &[1, 0, 2]);
//!
//! let mut server = Server::new(&graph);
//! let result = server.query(Query { from: 0, to: 2 });
//! assert_eq!(result.path, vec![0, 1, 2]);
//! assert_eq!(result.distance, 0.01);
//! ```

#[macro_use]
pub mod report;

pub mod algo;
pub mod datastr;
pub mod util;
