//! Traversals, shortest paths, minimum spanning trees and an ant colony
//! approximation of the traveling salesman problem on adjacency matrix graphs.
//!
//! ```
//! use simple_navigator::Graph;
//!
//! let graph = Graph::from_rows(&[vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]).unwrap();
//! assert_eq!(graph.breadth_first_search(1).unwrap(), vec![1, 2, 3]);
//! assert_eq!(graph.shortest_distance(1, 3).unwrap(), 1);
//! ```

pub mod error;
pub mod graph;
pub mod optimize;

pub use error::{Error, ErrorKind, Infeasibility, Result};
pub use graph::{tsp::TsmResult, Graph};
pub use optimize::{AntColonyOptimizer, AntColonyParams};
