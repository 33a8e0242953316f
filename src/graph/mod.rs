use std::{
    fmt,
    hash::{Hash, Hasher},
};

use ndarray::prelude::*;

use crate::error::{Error, Result};

/// Load from and export to text formats
pub mod io;
/// Find the [Minimum Spanning Tree (MST)](https://en.wikipedia.org/wiki/Minimum_spanning_tree)
pub mod mst;
/// [Dijkstra](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm) and [Floyd–Warshall](https://en.wikipedia.org/wiki/Floyd%E2%80%93Warshall_algorithm) shortest paths
pub mod shortest_path;
/// Breadth-first and depth-first visitation orders
pub mod traversal;
/// Solve the [Traveling Salesman Problem (TSP)](https://en.wikipedia.org/wiki/Travelling_salesman_problem)
pub mod tsp;

/// Smallest weight a cell may hold. Zero means there is no edge.
pub const MIN_WEIGHT: i32 = 0;
/// Largest weight a cell may hold.
pub const MAX_WEIGHT: i32 = i32::MAX - 1;

/// A weighted graph stored as a dense adjacency matrix.
///
/// Cell `(i, j)` holds the weight of the directed edge `i -> j`.
/// Vertices are numbered from 1 in the public API and from 0 in [Graph::matrix].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    matrix: Array2<i32>,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            matrix: Array2::zeros((0, 0)),
        }
    }
}

impl Graph {
    /// An empty graph without any vertices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Takes ownership of `matrix` after checking it is square and every weight is in range.
    pub fn new(matrix: Array2<i32>) -> Result<Self> {
        let (rows, columns) = matrix.dim();
        if rows != columns {
            return Err(Error::NotSquare { rows, columns });
        }
        if let Some(value) = matrix.iter().find(|value| !is_valid_weight(**value)) {
            return Err(weight_out_of_range(*value as i64));
        }
        Ok(Self { matrix })
    }

    /// Copies a row-major matrix, which may be ragged.
    pub fn from_rows(rows: &[Vec<i32>]) -> Result<Self> {
        let vertex_count = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != vertex_count) {
            return Err(Error::NotSquare {
                rows: vertex_count,
                columns: row.len(),
            });
        }
        let matrix = Array2::from_shape_fn((vertex_count, vertex_count), |(i, j)| rows[i][j]);
        Self::new(matrix)
    }

    pub fn vertex_count(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// 0-indexed view of the adjacency matrix.
    pub fn matrix(&self) -> ArrayView2<'_, i32> {
        self.matrix.view()
    }

    /// Weight of the edge `i -> j`, both 1-indexed.
    pub fn get(&self, i: usize, j: usize) -> Result<i32> {
        self.check_vertex(i)?;
        self.check_vertex(j)?;
        Ok(self.matrix[[i - 1, j - 1]])
    }

    /// Overwrite the weight of the edge `i -> j`, both 1-indexed.
    pub fn set(&mut self, i: usize, j: usize, value: i32) -> Result<()> {
        self.check_vertex(i)?;
        self.check_vertex(j)?;
        if !is_valid_weight(value) {
            return Err(weight_out_of_range(value as i64));
        }
        self.matrix[[i - 1, j - 1]] = value;
        Ok(())
    }

    /// A graph is undirected when its adjacency matrix is symmetric.
    /// Graphs without vertices are considered undirected too.
    pub fn is_undirected(&self) -> bool {
        let n = self.vertex_count();
        (0..n).all(|i| ((i + 1)..n).all(|j| self.matrix[[i, j]] == self.matrix[[j, i]]))
    }

    /// Errors unless `vertex` is a valid 1-indexed id for this graph.
    pub fn check_vertex(&self, vertex: usize) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyGraph);
        }
        if vertex == 0 || vertex > self.vertex_count() {
            return Err(Error::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count(),
            });
        }
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.matrix = Array2::zeros((0, 0));
    }
}

pub(crate) fn is_valid_weight(value: i32) -> bool {
    (MIN_WEIGHT..=MAX_WEIGHT).contains(&value)
}

pub(crate) fn weight_out_of_range(value: i64) -> Error {
    Error::WeightOutOfRange {
        value,
        min: MIN_WEIGHT,
        max: MAX_WEIGHT,
    }
}

impl Hash for Graph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertex_count().hash(state);
        for value in self.matrix.iter() {
            value.hash(state);
        }
    }
}

/// Writes nothing for an empty graph.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "Graph with {} vertices.", self.vertex_count())?;
        for (i, row) in self.matrix.outer_iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            for value in row {
                write!(f, "{} ", value)?;
            }
        }
        Ok(())
    }
}
