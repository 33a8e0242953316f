use std::collections::VecDeque;

use super::Graph;
use crate::error::Result;

impl Graph {
    /// Vertices reachable from `start` (1-indexed) in the order a depth-first search discovers them.
    ///
    /// Neighbours are scanned in ascending order. The result is shorter than
    /// [Graph::vertex_count] when some vertices cannot be reached from `start`.
    pub fn depth_first_search(&self, start: usize) -> Result<Vec<usize>> {
        self.check_vertex(start)?;
        let n = self.vertex_count();
        let matrix = self.matrix();

        let mut visited = vec![false; n];
        visited[start - 1] = true;
        let mut visited_count = 1;
        let mut order = vec![start];
        let mut stack = vec![start - 1];

        while visited_count != n {
            let Some(&from) = stack.last() else {
                break;
            };
            match (0..n).find(|&to| !visited[to] && matrix[[from, to]] > 0) {
                Some(to) => {
                    visited[to] = true;
                    visited_count += 1;
                    order.push(to + 1);
                    stack.push(to);
                }
                // Backtrack
                None => {
                    stack.pop();
                }
            }
        }
        Ok(order)
    }

    /// Vertices reachable from `start` (1-indexed) in the order a breadth-first search discovers them.
    ///
    /// A vertex is recorded when it is first enqueued, not when it is dequeued.
    pub fn breadth_first_search(&self, start: usize) -> Result<Vec<usize>> {
        self.check_vertex(start)?;
        let n = self.vertex_count();
        let matrix = self.matrix();

        let mut visited = vec![false; n];
        visited[start - 1] = true;
        let mut order = vec![start];
        let mut queue = VecDeque::from([start - 1]);

        while let Some(from) = queue.pop_front() {
            for to in 0..n {
                if !visited[to] && matrix[[from, to]] > 0 {
                    visited[to] = true;
                    order.push(to + 1);
                    queue.push_back(to);
                }
            }
        }
        Ok(order)
    }

    /// Whether every vertex can be reached from vertex 1.
    pub fn is_connected_from_first(&self) -> Result<bool> {
        Ok(self.breadth_first_search(1)?.len() == self.vertex_count())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::error::Error;
    use crate::graph::Graph;
    use pretty_assertions::assert_eq;

    #[test]
    fn dfs_orders() {
        let cases: [(Graph, usize, Vec<usize>); 12] = [
            (three(), 1, vec![1, 2, 4, 8, 9, 10, 11, 12, 5, 3, 6, 7]),
            (three(), 2, vec![2, 1, 3, 6, 7, 4, 8, 9, 10, 11, 12, 5]),
            (full(), 1, vec![1, 2, 3, 4]),
            (full(), 2, vec![2, 1, 3, 4]),
            (line(), 1, vec![1, 2, 3, 4, 5]),
            (line(), 3, vec![3, 2, 1, 4, 5]),
            (star(), 1, vec![1, 2, 3, 4, 5]),
            (star(), 4, vec![4, 1, 2, 3, 5]),
            (one_way_directed(), 1, vec![1, 2, 4, 3]),
            (one_way_directed(), 2, vec![2, 4]),
            (directed(), 1, vec![1, 2, 4, 3]),
            (directed(), 2, vec![2, 4, 1, 3]),
        ];
        for (graph, start, expected) in cases {
            assert_eq!(graph.depth_first_search(start).unwrap(), expected);
        }
    }

    #[test]
    fn bfs_orders() {
        let cases: [(Graph, usize, Vec<usize>); 12] = [
            (three(), 1, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
            (three(), 2, vec![2, 1, 4, 5, 3, 8, 9, 6, 7, 10, 11, 12]),
            (full(), 1, vec![1, 2, 3, 4]),
            (full(), 2, vec![2, 1, 3, 4]),
            (line(), 1, vec![1, 2, 3, 4, 5]),
            (line(), 3, vec![3, 2, 4, 1, 5]),
            (star(), 1, vec![1, 2, 3, 4, 5]),
            (star(), 4, vec![4, 1, 2, 3, 5]),
            (one_way_directed(), 1, vec![1, 2, 3, 4]),
            (one_way_directed(), 2, vec![2, 4]),
            (directed(), 1, vec![1, 2, 3, 4]),
            (directed(), 2, vec![2, 4, 1, 3]),
        ];
        for (graph, start, expected) in cases {
            assert_eq!(graph.breadth_first_search(start).unwrap(), expected);
        }
    }

    #[test]
    fn partial_reachability_is_not_an_error() {
        let graph = disconnected();
        assert_eq!(graph.breadth_first_search(3).unwrap(), vec![3, 4]);
        assert_eq!(graph.depth_first_search(1).unwrap(), vec![1, 2]);
        assert!(!graph.is_connected_from_first().unwrap());
        assert!(line().is_connected_from_first().unwrap());
    }

    #[test]
    fn start_must_be_in_range() {
        let graph = full();
        assert!(matches!(
            graph.depth_first_search(0),
            Err(Error::VertexOutOfRange { vertex: 0, .. })
        ));
        assert!(matches!(
            graph.breadth_first_search(5),
            Err(Error::VertexOutOfRange { vertex: 5, .. })
        ));
        assert!(matches!(
            Graph::empty().breadth_first_search(1),
            Err(Error::EmptyGraph)
        ));
    }
}
