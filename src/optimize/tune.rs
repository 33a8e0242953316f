use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AntColonyOptimizer, AntColonyParams};
use crate::graph::{
    tsp::{TsmResult, DEFAULT_SEED},
    Graph,
};

/// Evenly spaced values from `start` up to and including `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl GridAxis {
    pub const fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value, 1.)
    }

    pub fn values(&self) -> Vec<f64> {
        if !(self.step > 0.) || self.end < self.start {
            return vec![self.start];
        }
        // Tolerate rounding so that `end` itself is part of the axis
        let tolerance = self.step * 1e-9;
        (0..)
            .map(|i| self.start + i as f64 * self.step)
            .take_while(|value| *value <= self.end + tolerance)
            .collect()
    }
}

/// Hyperparameter ranges searched by [grid_search].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub init_amount_of_pheromone: GridAxis,
    pub amount_of_pheromone: GridAxis,
    pub influence_pheromone_rate: GridAxis,
    pub influence_distance_rate: GridAxis,
    pub pheromone_evaporation_coefficient: GridAxis,
    pub steps_count: usize,
    pub seed: u64,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            init_amount_of_pheromone: GridAxis::new(1., 20., 1.),
            amount_of_pheromone: GridAxis::new(1., 20., 1.),
            influence_pheromone_rate: GridAxis::new(0., 5., 0.5),
            influence_distance_rate: GridAxis::new(1., 5., 0.5),
            pheromone_evaporation_coefficient: GridAxis::new(0., 1., 0.05),
            steps_count: 0,
            seed: DEFAULT_SEED,
        }
    }
}

impl ParameterGrid {
    /// Every combination, the evaporation coefficient varying fastest.
    pub fn combinations(&self) -> Vec<AntColonyParams> {
        let evaporation = self.pheromone_evaporation_coefficient.values();
        let distance_rates = self.influence_distance_rate.values();
        let pheromone_rates = self.influence_pheromone_rate.values();
        let amounts = self.amount_of_pheromone.values();

        let mut combinations = vec![];
        for init_amount_of_pheromone in self.init_amount_of_pheromone.values() {
            for &amount_of_pheromone in &amounts {
                for &influence_pheromone_rate in &pheromone_rates {
                    for &influence_distance_rate in &distance_rates {
                        for &pheromone_evaporation_coefficient in &evaporation {
                            combinations.push(AntColonyParams {
                                steps_count: self.steps_count,
                                amount_of_pheromone,
                                init_amount_of_pheromone,
                                influence_distance_rate,
                                influence_pheromone_rate,
                                pheromone_evaporation_coefficient,
                                seed: Some(self.seed),
                            });
                        }
                    }
                }
            }
        }
        combinations
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningOutcome {
    /// Position of the winning combination in [ParameterGrid::combinations]
    pub index: usize,
    pub params: AntColonyParams,
    pub result: TsmResult,
}

/// Solve `graph` from vertex 1 with every combination of `grid`.
///
/// With a `target`, returns the first combination (in grid order) whose tour is
/// shorter than it. Otherwise returns the combination with the shortest tour,
/// earliest first on ties. Combinations that are invalid or find no tour are skipped.
pub fn grid_search(
    graph: &Graph,
    grid: &ParameterGrid,
    target: Option<f64>,
) -> Option<TuningOutcome> {
    let combinations = grid.combinations();
    info!("Searching {} parameter combinations", combinations.len());

    let run = |(index, params): (usize, &AntColonyParams)| {
        let result = AntColonyOptimizer::new(*params)
            .and_then(|optimizer| optimizer.solve(graph, Some(1)))
            .ok()?;
        Some(TuningOutcome {
            index,
            params: *params,
            result,
        })
    };

    let outcome = match target {
        Some(target) => combinations
            .par_iter()
            .enumerate()
            .filter_map(run)
            .find_first(|outcome| outcome.result.distance < target),
        None => combinations
            .par_iter()
            .enumerate()
            .filter_map(run)
            .min_by(|a, b| {
                a.result
                    .distance
                    .total_cmp(&b.result.distance)
                    .then(a.index.cmp(&b.index))
            }),
    };

    if let Some(outcome) = &outcome {
        info!(
            "Combination {} reached distance {}",
            outcome.index, outcome.result.distance
        );
    }
    outcome
}
