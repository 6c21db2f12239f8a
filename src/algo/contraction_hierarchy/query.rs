//! Contraction Hierarchy query server.
//!
//! A bidirectional Dijkstra where both searches only relax edges leading to
//! higher ranked nodes. Wherever the two search spaces touch, the summed
//! distance is a candidate for the shortest path; the best candidate's
//! meeting node anchors the path reconstruction, which expands shortcuts
//! back into road edges.

use super::*;
use crate::algo::dijkstra::{DijkstraData, State};
use crate::util::in_range_option::InRangeOption;

/// Weight units per distance unit reported to callers. Road weights commonly
/// arrive scaled up by this factor, so query distances divide it back out.
pub const DISTANCE_SCALE: f64 = 1000.0;

/// Query server borrowing a frozen, preprocessed graph.
///
/// Owns all search scratch, so a server serves one query at a time; the
/// graph itself is shared and read-only, one server per thread queries it
/// concurrently.
pub struct Server<'a> {
    graph: &'a ContractionGraph,
    forward: DijkstraData,
    backward: DijkstraData,
    tentative_distance: Weight,
    meeting_node: InRangeOption<NodeId>,
    distance_scale: f64,
}

impl<'a> Server<'a> {
    pub fn new(graph: &'a ContractionGraph) -> Server<'a> {
        let n = graph.num_nodes();
        Server {
            graph,
            forward: DijkstraData::new(n),
            backward: DijkstraData::new(n),
            tentative_distance: Weight::INFINITY,
            meeting_node: InRangeOption::new(None),
            distance_scale: DISTANCE_SCALE,
        }
    }

    /// Override the distance divisor for callers with differently scaled weights.
    pub fn with_distance_scale(mut self, distance_scale: f64) -> Server<'a> {
        self.distance_scale = distance_scale;
        self
    }

    /// Raw shortest path weight, unscaled. `None` if unreachable or an id is
    /// out of range.
    pub fn distance(&mut self, from: NodeId, to: NodeId) -> Option<Weight> {
        let n = self.graph.num_nodes() as NodeId;
        if from >= n || to >= n {
            return None;
        }

        self.tentative_distance = Weight::INFINITY;
        self.meeting_node = InRangeOption::new(None);

        if from == to {
            self.tentative_distance = Weight::ZERO;
            self.meeting_node = InRangeOption::some(from);
            return Some(Weight::ZERO);
        }

        self.forward.init(from);
        self.backward.init(to);

        // advance both frontiers every round and run them dry - entries at or
        // above the best meeting distance are pruned instead of expanded
        while !self.forward.queue.is_empty() || !self.backward.queue.is_empty() {
            if let Some(state) = self.forward.queue.pop() {
                if state.key <= self.tentative_distance {
                    Self::settle(
                        self.graph,
                        self.graph.out_links(state.node),
                        state,
                        &mut self.forward,
                        &self.backward,
                        &mut self.tentative_distance,
                        &mut self.meeting_node,
                    );
                }
            }
            if let Some(state) = self.backward.queue.pop() {
                if state.key <= self.tentative_distance {
                    Self::settle(
                        self.graph,
                        self.graph.in_links(state.node),
                        state,
                        &mut self.backward,
                        &self.forward,
                        &mut self.tentative_distance,
                        &mut self.meeting_node,
                    );
                }
            }
        }

        self.meeting_node.value().map(|_| self.tentative_distance)
    }

    /// Full query: node path in base-graph ids plus the scaled distance.
    /// Invalid ids and unreachable targets yield the empty result.
    pub fn query(&mut self, query: Query) -> QueryResult {
        if query.from == query.to && (query.from as usize) < self.graph.num_nodes() {
            return QueryResult {
                path: vec![query.from],
                distance: 0.0,
            };
        }
        match self.distance(query.from, query.to) {
            Some(distance) => QueryResult {
                path: self.path(query),
                distance: f64::from(distance) / self.distance_scale,
            },
            None => QueryResult::empty(),
        }
    }

    // relax all upward links of one settled node and track where the search
    // spaces meet
    fn settle(
        graph: &ContractionGraph,
        links: &[Link],
        State { key, node }: State,
        own: &mut DijkstraData,
        other: &DijkstraData,
        tentative_distance: &mut Weight,
        meeting_node: &mut InRangeOption<NodeId>,
    ) {
        let rank = graph.rank(node);
        for link in links {
            if graph.rank(link.node) > rank && own.relax(node, key, link) {
                let opposite = other.distances[link.node as usize];
                if opposite < Weight::INFINITY {
                    let total = own.distances[link.node as usize] + opposite;
                    if total < *tentative_distance {
                        *tentative_distance = total;
                        *meeting_node = InRangeOption::some(link.node);
                    }
                }
            }
        }
    }

    // walk the forward parents up to the meeting node, then the backward
    // parents down to the target, expanding every hop into road edges
    fn path(&self, query: Query) -> Vec<NodeId> {
        let meeting_node = match self.meeting_node.value() {
            Some(node) => node,
            None => return Vec::new(),
        };

        let mut ascent = Vec::new();
        let mut node = meeting_node;
        while node != query.from {
            ascent.push(node);
            node = self.forward.predecessors[node as usize];
        }

        let mut path = vec![query.from];
        let mut current = query.from;
        for &next in ascent.iter().rev() {
            self.unpack(current, next, &mut path);
            current = next;
        }

        let mut current = meeting_node;
        while current != query.to {
            let next = self.backward.predecessors[current as usize];
            self.unpack(current, next, &mut path);
            current = next;
        }

        path
    }

    /// Expand the edge from `from` to `to` and append the resulting node
    /// sequence (without `from`) to `path`.
    ///
    /// All parallel edges are scanned and the lightest one wins, since that
    /// is the one the searches relaxed; on equal weight a shortcut wins over
    /// a road edge, because a road edge may coexist with a shortcut standing
    /// for a witness-free path of the same weight. Contraction can also stack
    /// several shortcuts of decreasing weight between one pair, so picking
    /// any non-minimal edge here would inflate the reconstructed path.
    fn unpack(&self, from: NodeId, to: NodeId, path: &mut Vec<NodeId>) {
        let mut best: Option<&Link> = None;
        for link in self.graph.out_links(from) {
            if link.node == to {
                let better = match best {
                    None => true,
                    Some(current) => {
                        link.weight < current.weight || (link.weight == current.weight && link.is_shortcut() && !current.is_shortcut())
                    }
                };
                if better {
                    best = Some(link);
                }
            }
        }

        match best.and_then(|link| link.middle.value()) {
            Some(middle) => {
                self.unpack(from, middle, path);
                self.unpack(middle, to, path);
            }
            None => path.push(to),
        }
    }
}
