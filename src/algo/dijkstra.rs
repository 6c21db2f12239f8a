//! Basic variant of Dijkstra's algorithm, running on the road edges only.
//!
//! Shortcuts are ignored, so answers are always with respect to the plain
//! input network. Serves as the unoptimized baseline and as ground truth for
//! validating the hierarchy-based query.

use super::*;
use crate::datastr::{index_heap::*, timestamped_vector::*};

/// Priority queue entries
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct State {
    pub key: Weight,
    pub node: NodeId,
}

// slightly optimized version of derived, ignoring the node id
impl PartialOrd for State {
    #[inline]
    fn partial_cmp(&self, rhs: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}

impl Ord for State {
    #[inline]
    fn cmp(&self, rhs: &Self) -> std::cmp::Ordering {
        self.key.cmp(&rhs.key)
    }
}

impl Indexing for State {
    #[inline]
    fn as_index(&self) -> usize {
        self.node as usize
    }
}

/// Scratch state of one Dijkstra search, reusable across queries.
///
/// Predecessor entries are only meaningful where the distance is finite for
/// the current generation, so they need no reset between queries.
pub struct DijkstraData {
    pub distances: TimestampedVector<Weight>,
    pub predecessors: Vec<NodeId>,
    pub queue: IndexedMinHeap<State>,
}

impl DijkstraData {
    pub fn new(n: usize) -> DijkstraData {
        DijkstraData {
            distances: TimestampedVector::new(n, Weight::INFINITY),
            predecessors: vec![n as NodeId; n],
            queue: IndexedMinHeap::new(n),
        }
    }

    /// Wipe the previous search and enqueue the source.
    pub fn init(&mut self, from: NodeId) {
        self.queue.clear();
        self.distances.reset();
        self.distances.set(from as usize, Weight::ZERO);
        self.queue.push(State {
            key: Weight::ZERO,
            node: from,
        });
    }

    /// Relax one link during a search. Returns true on improvement.
    pub fn relax(&mut self, tail: NodeId, key: Weight, link: &Link) -> bool {
        let head = link.node as usize;
        let next = key + link.weight;
        if next < self.distances[head] {
            self.distances.set(head, next);
            self.predecessors[head] = tail;
            let state = State { key: next, node: link.node };
            if self.queue.contains_index(head) {
                self.queue.decrease_key(state);
            } else {
                self.queue.push(state);
            }
            return true;
        }
        false
    }
}

/// Simple Dijkstra query server over the road edges of a frozen graph.
pub struct Server<'a> {
    graph: &'a ContractionGraph,
    data: DijkstraData,
}

impl<'a> Server<'a> {
    pub fn new(graph: &'a ContractionGraph) -> Server<'a> {
        Server {
            graph,
            data: DijkstraData::new(graph.num_nodes()),
        }
    }

    /// Shortest road distance, or `None` if `to` is unreachable or an id is
    /// out of range.
    pub fn distance(&mut self, from: NodeId, to: NodeId) -> Option<Weight> {
        let n = self.graph.num_nodes() as NodeId;
        if from >= n || to >= n {
            return None;
        }

        self.data.init(from);

        while let Some(State { key, node }) = self.data.queue.pop() {
            if node == to {
                return Some(key);
            }
            for link in self.graph.road_links(node) {
                self.data.relax(node, key, link);
            }
        }

        None
    }

    /// The node path of the last successful `distance` call.
    pub fn path(&self, query: Query) -> Vec<NodeId> {
        let mut path = vec![query.to];

        while *path.last().expect("path is never empty") != query.from {
            let next = self.data.predecessors[*path.last().expect("path is never empty") as usize];
            path.push(next);
        }

        path.reverse();
        path
    }
}
