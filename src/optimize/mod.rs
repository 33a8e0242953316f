//! Stochastic optimizers working on [Graph](crate::graph::Graph)s.

/// [Ant colony optimization](https://en.wikipedia.org/wiki/Ant_colony_optimization_algorithms) for closed tours
pub mod ant_colony;
/// Brute-force search over ant colony hyperparameters
pub mod tune;

pub use ant_colony::{AntColonyOptimizer, AntColonyParams};
