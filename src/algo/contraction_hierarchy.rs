//! Contraction Hierarchy preprocessing.
//!
//! Contracts the nodes of a [`ContractionGraph`] in a caller supplied order.
//! Node ordering policies are out of scope here; any permutation works, the
//! order only determines how many shortcuts the hierarchy needs.
//!
//! Contracting a node pairs up its uncontracted in- and out-neighbors. Each
//! pair gets a shortcut summarizing the path through the contracted node,
//! unless a bounded witness search finds a replacement path that is no
//! longer. Two throttles keep dense nodes tractable: above a neighbor-product
//! threshold the witness search hop limit drops (extra shortcuts, same
//! answers), and each contraction stops inserting shortcuts at a hard cap,
//! which trades exactness on pairs routed through a capped node for bounded
//! preprocessing time.

use super::*;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub mod query;

/// Tuning knobs for the preprocessing. `Default` gives the reference values.
#[derive(Debug, Clone)]
pub struct ContractionConfig {
    /// Hard cap of shortcuts per contracted node; the remaining neighbor
    /// pairs of that node are forgone once it is hit.
    pub max_shortcuts_per_node: usize,
    /// In-degree times out-degree above which witness searches switch from
    /// the normal to the fast hop limit.
    pub complexity_threshold: usize,
    /// Witness search hop limit for ordinary nodes.
    pub hop_limit_normal: usize,
    /// Witness search hop limit for nodes above `complexity_threshold`.
    pub hop_limit_fast: usize,
    /// Number of contractions between progress callbacks.
    pub progress_interval: usize,
}

impl Default for ContractionConfig {
    fn default() -> Self {
        ContractionConfig {
            max_shortcuts_per_node: 100,
            complexity_threshold: 500,
            hop_limit_normal: 3,
            hop_limit_fast: 1,
            progress_interval: 5000,
        }
    }
}

/// Counters accumulated over one preprocessing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractionStats {
    /// Total number of shortcuts inserted.
    pub num_shortcuts: usize,
    /// Nodes whose contraction hit `max_shortcuts_per_node`.
    pub num_capped_nodes: usize,
}

/// Contract all nodes of `order` with the default configuration.
///
/// Progress goes to stderr every 5000 contractions, summary counters to the
/// [reporter](crate::report).
pub fn contract(graph: &mut ContractionGraph, order: &[NodeId]) -> ContractionStats {
    let stats = contract_with(graph, order, &ContractionConfig::default(), |done, total| {
        eprintln!("contracted {}/{} nodes", done, total);
    });
    report!("num_shortcuts", stats.num_shortcuts);
    report!("num_capped_nodes", stats.num_capped_nodes);
    stats
}

/// Contract all nodes of `order`, with explicit configuration and progress
/// callback. The callback runs after every `progress_interval` contractions
/// with the number of contracted nodes and the order length.
///
/// Each node of `order` gets the next rank assigned and is then contracted.
/// Order entries have to be in range and free of duplicates; an order
/// covering only a prefix of the eventual permutation is fine and leaves the
/// remaining nodes unranked.
pub fn contract_with(
    graph: &mut ContractionGraph,
    order: &[NodeId],
    config: &ContractionConfig,
    mut progress: impl FnMut(usize, usize),
) -> ContractionStats {
    let mut contractor = Contractor {
        graph,
        config,
        queue: BinaryHeap::new(),
        stats: ContractionStats::default(),
    };

    let total = order.len();
    for (rank, &node) in order.iter().enumerate() {
        contractor.graph.assign_rank(node, rank as Rank);
        let added = contractor.contract_node(node);
        contractor.stats.num_shortcuts += added;

        let done = rank + 1;
        if config.progress_interval != 0 && done % config.progress_interval == 0 {
            progress(done, total);
        }
    }

    contractor.stats
}

/// Witness search states, popped in lexicographic (weight, node, hops) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct WitnessState {
    weight: Weight,
    node: NodeId,
    hops: usize,
}

struct Contractor<'a> {
    graph: &'a mut ContractionGraph,
    config: &'a ContractionConfig,
    // lazy multi-label queue - one node can be queued several times with
    // different hop counts, which keeps longer-but-flatter witnesses reachable
    queue: BinaryHeap<Reverse<WitnessState>>,
    stats: ContractionStats,
}

impl<'a> Contractor<'a> {
    /// Contract `node`: pair up its surviving neighbors and insert the
    /// shortcuts no witness makes redundant. Returns the number inserted.
    fn contract_node(&mut self, node: NodeId) -> usize {
        self.graph.mark_contracted(node);

        let incoming: Vec<(NodeId, Weight)> = self
            .graph
            .in_links(node)
            .iter()
            .filter(|link| !self.graph.is_contracted(link.node))
            .map(|link| (link.node, link.weight))
            .collect();
        let outgoing: Vec<(NodeId, Weight)> = self
            .graph
            .out_links(node)
            .iter()
            .filter(|link| !self.graph.is_contracted(link.node))
            .map(|link| (link.node, link.weight))
            .collect();

        let complexity = incoming.len() * outgoing.len();
        let hop_limit = if complexity > self.config.complexity_threshold {
            self.config.hop_limit_fast
        } else {
            self.config.hop_limit_normal
        };

        let mut added = 0;
        for &(from, from_weight) in &incoming {
            for &(to, to_weight) in &outgoing {
                // no loop shortcuts ever required
                if from == to {
                    continue;
                }
                if added >= self.config.max_shortcuts_per_node {
                    self.stats.num_capped_nodes += 1;
                    return added;
                }

                let shortcut_weight = from_weight + to_weight;
                if !self.witness_exists(from, to, shortcut_weight, node, hop_limit) {
                    self.graph.add_shortcut(from, to, shortcut_weight, node);
                    added += 1;
                }
            }
        }
        added
    }

    /// Bounded Dijkstra from `from` towards `to`, avoiding `excluded`.
    /// True iff some path of weight <= `max_weight` with at most `hop_limit`
    /// edges exists. Relaxations never enter contracted nodes other than `to`.
    fn witness_exists(&mut self, from: NodeId, to: NodeId, max_weight: Weight, excluded: NodeId, hop_limit: usize) -> bool {
        // fast path: an existing direct edge settles it
        if self.graph.out_links(from).iter().any(|link| link.node == to && link.weight <= max_weight) {
            return true;
        }

        self.queue.clear();
        self.queue.push(Reverse(WitnessState {
            weight: Weight::ZERO,
            node: from,
            hops: 0,
        }));

        while let Some(Reverse(WitnessState { weight, node, hops })) = self.queue.pop() {
            if weight > max_weight {
                return false;
            }
            if node == to {
                return true;
            }
            if hops >= hop_limit {
                continue;
            }

            for link in self.graph.out_links(node) {
                if self.graph.is_contracted(link.node) && link.node != to {
                    continue;
                }
                if link.node == excluded {
                    continue;
                }
                let next = weight + link.weight;
                if next <= max_weight {
                    self.queue.push(Reverse(WitnessState {
                        weight: next,
                        node: link.node,
                        hops: hops + 1,
                    }));
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(values: &[(NodeId, NodeId, f64)]) -> ContractionGraph {
        let n = values.iter().map(|&(u, v, _)| u.max(v) + 1).max().unwrap_or(0);
        let mut graph = ContractionGraph::new(n as usize);
        for &(u, v, w) in values {
            graph.add_edge(u, v, Weight::new(w));
        }
        graph
    }

    #[test]
    fn direct_edge_is_a_witness() {
        // 0 -> 1 -> 2 with a cheap direct 0 -> 2
        let mut graph = weights(&[(0, 1, 5.0), (1, 2, 5.0), (0, 2, 8.0)]);
        let stats = contract(&mut graph, &[1, 0, 2]);
        assert_eq!(stats.num_shortcuts, 0);
    }

    #[test]
    fn missing_witness_forces_a_shortcut() {
        // direct edge exists but is too expensive to witness
        let mut graph = weights(&[(0, 1, 5.0), (1, 2, 5.0), (0, 2, 100.0)]);
        let stats = contract(&mut graph, &[1, 0, 2]);
        assert_eq!(stats.num_shortcuts, 1);

        let snapshot = graph.snapshot();
        let shortcut = snapshot.edges.iter().find(|edge| edge.is_shortcut()).unwrap();
        assert_eq!((shortcut.tail, shortcut.head), (0, 2));
        assert_eq!(shortcut.weight, Weight::new(10.0));
        assert_eq!(shortcut.middle, Some(1));
    }

    #[test]
    fn equal_weight_witness_suppresses_the_shortcut() {
        let mut graph = weights(&[(0, 1, 5.0), (1, 2, 5.0), (0, 2, 10.0)]);
        let stats = contract(&mut graph, &[1, 0, 2]);
        assert_eq!(stats.num_shortcuts, 0);
    }

    #[test]
    fn hop_limit_cuts_off_long_witnesses() {
        // witness 1 -> 3 -> 2 needs two hops; with the fast hop limit it is
        // invisible and the shortcut gets inserted anyway
        let edges = [(1, 0, 1.0), (0, 2, 1.0), (1, 3, 1.0), (3, 2, 1.0)];
        let order = [0, 1, 2, 3];

        let mut normal = weights(&edges);
        let stats = contract_with(&mut normal, &order, &ContractionConfig::default(), |_, _| {});
        assert_eq!(stats.num_shortcuts, 0);

        let mut throttled = weights(&edges);
        let config = ContractionConfig {
            complexity_threshold: 0,
            ..ContractionConfig::default()
        };
        let stats = contract_with(&mut throttled, &order, &config, |_, _| {});
        assert_eq!(stats.num_shortcuts, 1);
    }

    #[test]
    #[should_panic]
    fn duplicate_order_entries_are_rejected() {
        let mut graph = weights(&[(0, 1, 1.0)]);
        contract(&mut graph, &[0, 0]);
    }
}
