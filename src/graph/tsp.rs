use std::fmt;

use serde::{Deserialize, Serialize};

use super::Graph;
use crate::{
    error::{Error, Infeasibility, Result},
    optimize::{AntColonyOptimizer, AntColonyParams},
};

/// Seed used by [Graph::solve_traveling_salesman_problem] so repeated calls agree.
pub const DEFAULT_SEED: u64 = 21;

/// A closed tour: the first vertex is repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsmResult {
    pub vertices: Vec<usize>,
    pub distance: f64,
}

impl fmt::Display for TsmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vertex in &self.vertices {
            write!(f, "{} ", vertex)?;
        }
        write!(f, "(distance: {})", self.distance)
    }
}

impl Graph {
    /// Every vertex has an edge to every other vertex.
    pub fn is_full(&self) -> bool {
        let matrix = self.matrix();
        matrix
            .indexed_iter()
            .all(|((i, j), weight)| i == j || *weight > 0)
    }

    /// Cheap filter run before searching for a tour.
    ///
    /// Complete graphs always pass. Otherwise incoming edges are tallied per column,
    /// but the tally restarts on every row, so only the edge arriving from the last
    /// vertex decides a column's parity. More than two odd columns reject the graph.
    pub fn satisfies_tsp_criterion(&self) -> bool {
        if self.is_full() {
            return true;
        }

        // Graphs without vertices are full
        let last = self.vertex_count() - 1;
        let last_row = self.matrix.row(last);
        let odd_vertices = last_row
            .indexed_iter()
            .filter(|(col, weight)| *col != last && **weight > 0)
            .count();
        odd_vertices <= 2
    }

    /// Approximate the shortest closed tour starting and ending at vertex 1.
    ///
    /// Uses an [AntColonyOptimizer] with default parameters and [DEFAULT_SEED].
    pub fn solve_traveling_salesman_problem(&self) -> Result<TsmResult> {
        if !self.satisfies_tsp_criterion() {
            return Err(Error::Infeasible(Infeasibility::TspCriterion));
        }
        AntColonyOptimizer::new(AntColonyParams {
            seed: Some(DEFAULT_SEED),
            ..Default::default()
        })?
        .solve(self, Some(1))
    }
}
