use ndarray::prelude::*;

use super::Graph;
use crate::error::{Error, Result};

/// Distance to a vertex that has not been reached (yet).
const INFINITY: i64 = i64::MAX;

/// Outcome of running Dijkstra's algorithm from a single source, 0-indexed.
struct Dijkstra {
    distance: Vec<i64>,
    /// `None` for the source itself and for vertices that were never reached
    previous: Vec<Option<usize>>,
    visited: Vec<bool>,
}

impl Dijkstra {
    /// Picks the closest vertex with a linear scan over all vertices, which
    /// is as good as a heap for dense adjacency matrices.
    fn run(graph: &Graph, start: usize) -> Self {
        let n = graph.vertex_count();
        let matrix = graph.matrix();
        let mut distance = vec![INFINITY; n];
        let mut previous = vec![None; n];
        let mut visited = vec![false; n];
        distance[start] = 0;

        let mut current = Some(start);
        while let Some(vertex) = current {
            if distance[vertex] == INFINITY {
                break;
            }
            for to in 0..n {
                let weight = matrix[[vertex, to]];
                if to == vertex || weight <= 0 {
                    continue;
                }
                let candidate = distance[vertex] + weight as i64;
                if candidate < distance[to] {
                    distance[to] = candidate;
                    previous[to] = Some(vertex);
                }
            }
            visited[vertex] = true;
            current = (0..n)
                .filter(|&i| !visited[i] && distance[i] != INFINITY)
                .min_by_key(|&i| distance[i]);
        }

        Self {
            distance,
            previous,
            visited,
        }
    }

    fn path_to(&self, finish: usize) -> Vec<usize> {
        let mut path = vec![finish + 1];
        let mut current = finish;
        while let Some(previous) = self.previous[current] {
            path.push(previous + 1);
            current = previous;
        }
        path.reverse();
        path
    }
}

impl Graph {
    /// Length of the shortest path from `start` to `finish` (both 1-indexed).
    pub fn shortest_distance(&self, start: usize, finish: usize) -> Result<i64> {
        self.check_vertex(start)?;
        self.check_vertex(finish)?;
        let dijkstra = Dijkstra::run(self, start - 1);
        if !dijkstra.visited[finish - 1] {
            return Err(Error::Unreachable { start, finish });
        }
        Ok(dijkstra.distance[finish - 1])
    }

    /// Vertices on a shortest path from `start` to `finish`, both ends included.
    ///
    /// Empty when `finish` cannot be reached.
    pub fn shortest_path(&self, start: usize, finish: usize) -> Result<Vec<usize>> {
        self.check_vertex(start)?;
        self.check_vertex(finish)?;
        let dijkstra = Dijkstra::run(self, start - 1);
        if !dijkstra.visited[finish - 1] {
            return Ok(vec![]);
        }
        Ok(dijkstra.path_to(finish - 1))
    }

    /// Shortest distances between every ordered pair of vertices, 0-indexed.
    ///
    /// Unreachable pairs are `-1`, the diagonal is always `0`.
    pub fn all_pairs_shortest_paths(&self) -> Array2<i64> {
        let n = self.vertex_count();
        let mut distance = self.matrix().mapv(|weight| {
            if weight > 0 {
                weight as i64
            } else {
                INFINITY
            }
        });
        distance.diag_mut().fill(0);

        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    // Anything involving infinity overflows and is skipped
                    if let Some(through_k) = distance[[i, k]].checked_add(distance[[k, j]]) {
                        if through_k < distance[[i, j]] {
                            distance[[i, j]] = through_k;
                        }
                    }
                }
            }
        }

        distance.mapv_inplace(|d| if d == INFINITY { -1 } else { d });
        distance
    }
}
