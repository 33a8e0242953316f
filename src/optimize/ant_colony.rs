use std::{fs, path::Path};

use ndarray::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Error, Infeasibility, Result},
    graph::{tsp::TsmResult, Graph},
};

/// Lower bound for the automatically chosen number of colony steps.
const MIN_STEPS_COUNT: usize = 60;

/// Hyperparameters of [AntColonyOptimizer].
///
/// Missing fields take their [Default] value when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntColonyParams {
    /// Number of colony steps, `0` picks `max(60, V²)` for each graph
    pub steps_count: usize,
    /// Pheromone an ant spreads over its whole tour
    pub amount_of_pheromone: f64,
    /// Pheromone on every edge before the first step
    pub init_amount_of_pheromone: f64,
    /// Exponent of the inverse edge weight, in `[1, 5]`
    pub influence_distance_rate: f64,
    /// Exponent of the pheromone level, in `[0, 5]`
    pub influence_pheromone_rate: f64,
    /// Share of pheromone lost after every step, in `[0, 1]`
    pub pheromone_evaporation_coefficient: f64,
    /// Fixes the random stream for reproducible tours
    pub seed: Option<u64>,
}

impl Default for AntColonyParams {
    fn default() -> Self {
        Self {
            steps_count: 0,
            amount_of_pheromone: 1.,
            init_amount_of_pheromone: 1.,
            influence_distance_rate: 1.5,
            influence_pheromone_rate: 1.,
            pheromone_evaporation_coefficient: 0.2,
            seed: None,
        }
    }
}

impl AntColonyParams {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|err| Error::Format {
            line: err.line(),
            reason: err.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_range(
            "amount_of_pheromone",
            self.amount_of_pheromone,
            0.,
            f64::INFINITY,
        )?;
        check_range(
            "init_amount_of_pheromone",
            self.init_amount_of_pheromone,
            0.,
            f64::INFINITY,
        )?;
        check_range(
            "influence_distance_rate",
            self.influence_distance_rate,
            1.,
            5.,
        )?;
        check_range(
            "influence_pheromone_rate",
            self.influence_pheromone_rate,
            0.,
            5.,
        )?;
        check_range(
            "pheromone_evaporation_coefficient",
            self.pheromone_evaporation_coefficient,
            0.,
            1.,
        )
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN and infinities are rejected
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Configuration {
            name,
            value,
            min,
            max,
        })
    }
}

/// Approximates the shortest closed tour through every vertex by simulating ants
/// that prefer short edges carrying a lot of pheromone.
///
/// One optimizer can solve any number of graphs, all state lives in a single [AntColonyOptimizer::solve] call.
#[derive(Debug, Clone)]
pub struct AntColonyOptimizer {
    params: AntColonyParams,
}

impl AntColonyOptimizer {
    pub fn new(params: AntColonyParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AntColonyParams {
        &self.params
    }

    /// Find a short closed tour.
    ///
    /// Ants start from every vertex in turn, or all from `start_vertex` when it is given.
    /// Fails when no ant manages to close a tour.
    pub fn solve(&self, graph: &Graph, start_vertex: Option<usize>) -> Result<TsmResult> {
        if let Some(start_vertex) = start_vertex {
            graph.check_vertex(start_vertex)?;
        }
        let n = graph.vertex_count();
        // A tour must reach every vertex from wherever it starts
        if graph.breadth_first_search(start_vertex.unwrap_or(1))?.len() != n {
            return Err(Error::Infeasible(Infeasibility::NoTourFound));
        }

        let steps_count = match self.params.steps_count {
            0 => MIN_STEPS_COUNT.max(n * n),
            steps_count => steps_count,
        };
        info!("Running {} colony steps on {} vertices", steps_count, n);

        let mut colony = Colony::new(&self.params, graph);
        for step in 0..steps_count {
            colony.step(start_vertex);
            debug!(
                "Step {}/{} (best: {:?})",
                step + 1,
                steps_count,
                colony.best_length
            );
        }

        match colony.best_length {
            Some(best_length) => {
                info!("Best tour has length {}", best_length);
                Ok(TsmResult {
                    vertices: colony.best_path,
                    distance: best_length as f64,
                })
            }
            None => Err(Error::Infeasible(Infeasibility::NoTourFound)),
        }
    }
}

/// Working state of one [AntColonyOptimizer::solve] call.
///
/// Matrices are indexed by 1-indexed vertex ids, row and column 0 stay unused.
struct Colony<'a> {
    params: &'a AntColonyParams,
    weights: ArrayView2<'a, i32>,
    vertex_count: usize,
    rng: StdRng,
    desirability: Array2<f64>,
    pheromone: Array2<f64>,
    best_path: Vec<usize>,
    /// `None` until the first tour is closed
    best_length: Option<i64>,
}

impl<'a> Colony<'a> {
    fn new(params: &'a AntColonyParams, graph: &'a Graph) -> Self {
        let vertex_count = graph.vertex_count();
        let weights = graph.matrix();
        let size = (vertex_count + 1, vertex_count + 1);

        let mut desirability = Array2::zeros(size);
        let mut pheromone = Array2::zeros(size);
        for ((from, to), weight) in weights.indexed_iter() {
            if *weight > 0 && from != to {
                desirability[[from + 1, to + 1]] = 1. / *weight as f64;
                pheromone[[from + 1, to + 1]] = params.init_amount_of_pheromone;
            }
        }

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            params,
            weights,
            vertex_count,
            rng,
            desirability,
            pheromone,
            best_path: vec![],
            best_length: None,
        }
    }

    fn weight(&self, from: usize, to: usize) -> i32 {
        self.weights[[from - 1, to - 1]]
    }

    fn step(&mut self, start_vertex: Option<usize>) {
        let mut delta_pheromone = Array2::zeros(self.pheromone.dim());
        match start_vertex {
            None => {
                for start in 1..=self.vertex_count {
                    self.ant_run(start, &mut delta_pheromone);
                }
            }
            Some(start) => {
                for _ in 0..self.vertex_count {
                    self.ant_run(start, &mut delta_pheromone);
                }
            }
        }

        let persistence = 1. - self.params.pheromone_evaporation_coefficient;
        self.pheromone
            .zip_mut_with(&delta_pheromone, |pheromone, delta| {
                *pheromone = persistence * *pheromone + delta
            });
    }

    /// Walks one ant from `start`, giving up quietly on dead ends.
    fn ant_run(&mut self, start: usize, delta_pheromone: &mut Array2<f64>) {
        let mut path = Vec::with_capacity(self.vertex_count + 1);
        path.push(start);
        let mut path_length: i64 = 0;
        let mut visited = vec![false; self.vertex_count + 1];
        visited[start] = true;

        for _ in 1..self.vertex_count {
            let from = path[path.len() - 1];
            let Some(to) = self.choose_next_vertex(from, &visited) else {
                return;
            };
            path.push(to);
            path_length += self.weight(from, to) as i64;
            visited[to] = true;
        }

        let last = path[path.len() - 1];
        let closing_weight = self.weight(last, start);
        if closing_weight == 0 {
            return;
        }
        path.push(start);
        path_length += closing_weight as i64;

        let deposit = self.params.amount_of_pheromone / path_length as f64;
        for edge in path.windows(2) {
            delta_pheromone[[edge[0], edge[1]]] += deposit;
        }

        // Later tours of equal length win
        if self.best_length.map_or(true, |best| path_length <= best) {
            self.best_length = Some(path_length);
            self.best_path = path;
        }
    }

    /// Roulette wheel selection over the unvisited neighbours of `current`.
    fn choose_next_vertex(&mut self, current: usize, visited: &[bool]) -> Option<usize> {
        let choice: f64 = self.rng.gen();
        let probabilities = self.neighbour_probabilities(current, visited)?;

        // Summed left to right so a seed always picks the same vertex
        let mut cumulative = 0.;
        probabilities.iter().position(|probability| {
            cumulative += probability;
            cumulative > choice
        })
    }

    /// Indexed by vertex id, `None` when there is nowhere to go.
    fn neighbour_probabilities(&self, from: usize, visited: &[bool]) -> Option<Vec<f64>> {
        let mut probabilities = vec![0.; self.vertex_count + 1];
        let mut sum = 0.;
        for to in 1..=self.vertex_count {
            if self.weight(from, to) > 0 && !visited[to] {
                probabilities[to] = self.transition_desirability(from, to);
                sum += probabilities[to];
            }
        }
        if sum > 0. {
            probabilities.iter_mut().for_each(|p| *p /= sum);
            Some(probabilities)
        } else {
            None
        }
    }

    fn transition_desirability(&self, from: usize, to: usize) -> f64 {
        self.pheromone[[from, to]].powf(self.params.influence_pheromone_rate)
            * self.desirability[[from, to]].powf(self.params.influence_distance_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::traversal::fixtures::{
        many_vertices_all_connected, special_directed_1, special_directed_2,
    };
    use pretty_assertions::assert_eq;

    fn seeded(seed: u64) -> AntColonyOptimizer {
        AntColonyOptimizer::new(AntColonyParams {
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    fn odd_full() -> Graph {
        Graph::from_rows(&[
            vec![0, 5, 5, 5, 5, 1],
            vec![5, 0, 5, 5, 1, 5],
            vec![1, 5, 0, 5, 5, 5],
            vec![5, 1, 5, 0, 5, 5],
            vec![5, 5, 1, 5, 0, 5],
            vec![5, 5, 5, 1, 5, 0],
        ])
        .unwrap()
    }

    fn assert_is_closed_tour(result: &TsmResult, graph: &Graph) {
        let n = graph.vertex_count();
        assert_eq!(result.vertices.len(), n + 1);
        assert_eq!(result.vertices.first(), result.vertices.last());
        let mut seen = result.vertices[..n].to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (1..=n).collect::<Vec<_>>());
        let length: i64 = result
            .vertices
            .windows(2)
            .map(|edge| graph.get(edge[0], edge[1]).unwrap() as i64)
            .sum();
        assert_eq!(length as f64, result.distance);
    }

    #[test]
    fn rejects_parameters_out_of_range() {
        let cases = [
            AntColonyParams {
                amount_of_pheromone: -1.,
                ..Default::default()
            },
            AntColonyParams {
                init_amount_of_pheromone: -0.5,
                ..Default::default()
            },
            AntColonyParams {
                influence_distance_rate: 0.5,
                ..Default::default()
            },
            AntColonyParams {
                influence_distance_rate: 5.5,
                ..Default::default()
            },
            AntColonyParams {
                influence_pheromone_rate: -1.,
                ..Default::default()
            },
            AntColonyParams {
                pheromone_evaporation_coefficient: 1.1,
                ..Default::default()
            },
            AntColonyParams {
                pheromone_evaporation_coefficient: f64::NAN,
                ..Default::default()
            },
            AntColonyParams {
                pheromone_evaporation_coefficient: -0.1,
                ..Default::default()
            },
            AntColonyParams {
                influence_pheromone_rate: 5.5,
                ..Default::default()
            },
            AntColonyParams {
                amount_of_pheromone: f64::INFINITY,
                ..Default::default()
            },
            AntColonyParams {
                init_amount_of_pheromone: f64::INFINITY,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(matches!(
                AntColonyOptimizer::new(params),
                Err(Error::Configuration { .. })
            ));
        }
        assert!(AntColonyOptimizer::new(AntColonyParams::default()).is_ok());
    }

    #[test]
    fn finds_the_only_short_tour() {
        let graph = odd_full();
        let result = seeded(21).solve(&graph, Some(1)).unwrap();
        assert_is_closed_tour(&result, &graph);
        assert_eq!(result.vertices, vec![1, 6, 4, 2, 5, 3, 1]);
        assert_eq!(result.distance, 6.);
    }

    #[test]
    fn six_vertex_graphs_from_vertex_one() {
        for graph in [
            special_directed_1(),
            special_directed_2(),
            many_vertices_all_connected(),
        ] {
            let result = seeded(21).solve(&graph, Some(1)).unwrap();
            assert_is_closed_tour(&result, &graph);
            assert_eq!(result.vertices[0], 1);
            assert_eq!(result.distance, 6.);
        }
    }

    #[test]
    fn six_vertex_graphs_from_every_vertex() {
        for graph in [special_directed_1(), special_directed_2()] {
            let result = seeded(21).solve(&graph, None).unwrap();
            assert_is_closed_tour(&result, &graph);
            assert!(result.distance >= 6.);
        }
        // Every tour of a complete unit graph is optimal
        let graph = many_vertices_all_connected();
        let result = seeded(21).solve(&graph, None).unwrap();
        assert_is_closed_tour(&result, &graph);
        assert_eq!(result.distance, 6.);
    }

    #[test]
    fn every_vertex_may_start_a_tour() {
        let graph = odd_full();
        let result = seeded(7).solve(&graph, None).unwrap();
        assert_is_closed_tour(&result, &graph);
    }

    #[test]
    fn same_seed_same_tour() {
        let graph = Graph::from_rows(&[
            vec![0, 2, 9, 10, 7],
            vec![1, 0, 6, 4, 3],
            vec![15, 7, 0, 8, 3],
            vec![6, 3, 12, 0, 11],
            vec![9, 7, 5, 6, 0],
        ])
        .unwrap();
        let optimizer = seeded(42);
        let first = optimizer.solve(&graph, None).unwrap();
        let second = optimizer.solve(&graph, None).unwrap();
        assert_eq!(first, second);
        assert_is_closed_tour(&first, &graph);
    }

    #[test]
    fn explicit_steps_count_is_honoured() {
        let graph = odd_full();
        let optimizer = AntColonyOptimizer::new(AntColonyParams {
            steps_count: 1,
            seed: Some(3),
            ..Default::default()
        })
        .unwrap();
        // A single step of six ants on a complete graph always closes a tour
        assert_is_closed_tour(&optimizer.solve(&graph, Some(2)).unwrap(), &graph);
    }

    #[test]
    fn dead_ends_are_infeasible() {
        let path_graph = Graph::from_rows(&[vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]]).unwrap();
        assert!(matches!(
            seeded(1).solve(&path_graph, Some(1)),
            Err(Error::Infeasible(Infeasibility::NoTourFound))
        ));

        let disconnected = Graph::from_rows(&[vec![0, 0], vec![0, 0]]).unwrap();
        assert!(matches!(
            seeded(1).solve(&disconnected, None),
            Err(Error::Infeasible(Infeasibility::NoTourFound))
        ));
    }

    #[test]
    fn start_vertex_is_checked() {
        assert!(matches!(
            seeded(1).solve(&odd_full(), Some(7)),
            Err(Error::VertexOutOfRange { vertex: 7, .. })
        ));
        assert!(matches!(
            seeded(1).solve(&Graph::empty(), None),
            Err(Error::EmptyGraph)
        ));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: AntColonyParams =
            serde_json::from_str(r#"{"influence_distance_rate": 2.0, "seed": 5}"#).unwrap();
        assert_eq!(
            params,
            AntColonyParams {
                influence_distance_rate: 2.,
                seed: Some(5),
                ..Default::default()
            }
        );
    }

    #[test]
    fn params_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, r#"{"steps_count": 10}"#).unwrap();
        assert_eq!(AntColonyParams::from_json_file(&path).unwrap().steps_count, 10);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AntColonyParams::from_json_file(&path),
            Err(Error::Format { .. })
        ));
    }
}
