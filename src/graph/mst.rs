use ndarray::prelude::*;
use rustc_hash::FxHashSet as HashSet;
use std::{cmp::Reverse, collections::BinaryHeap};
use tracing::debug;

use super::Graph;
use crate::error::{Error, Infeasibility, Result};

/// An edge leaving the tree built so far, 0-indexed.
#[derive(PartialEq, Eq, Debug)]
struct PriorityQueueEdge {
    weight: i32,
    /// Insertion order, so equally weighted edges leave the queue first in, first out
    order: usize,
    from: usize,
    to: usize,
}

impl PartialOrd for PriorityQueueEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityQueueEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.order.cmp(&other.order))
    }
}

impl Graph {
    /// Compute the MST with Prim's algorithm in O(E log(V)) time, starting from vertex 1.
    ///
    /// The result is the symmetric adjacency matrix of the tree (0-indexed).
    /// Only connected undirected graphs have one.
    pub fn minimum_spanning_tree(&self) -> Result<Array2<i32>> {
        if !self.is_undirected() || !self.is_connected_from_first()? {
            return Err(Error::Infeasible(Infeasibility::NotConnectedUndirected));
        }

        let n = self.vertex_count();
        let matrix = self.matrix();
        let mut in_mst = HashSet::default();
        in_mst.reserve(n);
        let mut edge_priority_queue = BinaryHeap::new();
        let mut order = 0;

        let mut push_edges_from =
            |from: usize, in_mst: &HashSet<usize>, queue: &mut BinaryHeap<_>| {
                for to in 0..n {
                    let weight = matrix[[from, to]];
                    if weight != 0 && !in_mst.contains(&to) {
                        queue.push(Reverse(PriorityQueueEdge {
                            weight,
                            order,
                            from,
                            to,
                        }));
                        order += 1;
                    }
                }
            };

        // Kickstart MST with 1 vertex
        in_mst.insert(0);
        push_edges_from(0, &in_mst, &mut edge_priority_queue);

        let mut tree = Array2::zeros((n, n));
        while in_mst.len() < n {
            // Connectivity was checked, so the queue cannot run dry first
            let Some(Reverse(shortest_edge)) = edge_priority_queue.pop() else {
                break;
            };
            // Edge would not add a new vertex to the MST
            if in_mst.contains(&shortest_edge.to) {
                continue;
            }
            let PriorityQueueEdge {
                weight, from, to, ..
            } = shortest_edge;
            tree[[from, to]] = weight;
            tree[[to, from]] = weight;
            in_mst.insert(to);
            push_edges_from(to, &in_mst, &mut edge_priority_queue);
        }

        debug!("Spanning tree has {} edges", in_mst.len().saturating_sub(1));
        Ok(tree)
    }
}
