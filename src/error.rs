use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a graph was turned away by an algorithm that needs a particular shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// Minimum spanning trees are only defined for connected undirected graphs.
    NotConnectedUndirected,
    /// The graph failed the traveling salesman feasibility scan.
    TspCriterion,
    /// Every ant of every colony step was abandoned before closing a tour.
    NoTourFound,
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasibility::NotConnectedUndirected => {
                write!(f, "graph must be connected and undirected")
            }
            Infeasibility::TspCriterion => write!(
                f,
                "there is no solution to the traveling salesman problem for the graph"
            ),
            Infeasibility::NoTourFound => write!(
                f,
                "it is impossible to solve the problem with the given graph"
            ),
        }
    }
}

/// Coarse classification of [`Error`] for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Format,
    Range,
    State,
    Unreachable,
    Infeasible,
    Configuration,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("adjacency matrix should be square, got {rows} rows with a row of {columns} columns")]
    NotSquare { rows: usize, columns: usize },

    #[error("weight {value} is outside of [{min}, {max}]")]
    WeightOutOfRange { value: i64, min: i32, max: i32 },

    #[error("wrong file: line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("vertex {vertex} is out of range [1, {vertex_count}]")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("graph contains nothing")]
    EmptyGraph,

    #[error("vertex {finish} is not reachable from {start}")]
    Unreachable { start: usize, finish: usize },

    #[error("{0}")]
    Infeasible(Infeasibility),

    #[error("{name} must be within [{min}, {max}], got {value}")]
    Configuration {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotSquare { .. } | Error::WeightOutOfRange { .. } => ErrorKind::Validation,
            Error::Format { .. } => ErrorKind::Format,
            Error::VertexOutOfRange { .. } => ErrorKind::Range,
            Error::EmptyGraph => ErrorKind::State,
            Error::Unreachable { .. } => ErrorKind::Unreachable,
            Error::Infeasible(_) => ErrorKind::Infeasible,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_offending_values() {
        let err = Error::VertexOutOfRange {
            vertex: 7,
            vertex_count: 6,
        };
        assert_eq!(err.to_string(), "vertex 7 is out of range [1, 6]");
        assert_eq!(err.kind(), ErrorKind::Range);

        let err = Error::Unreachable {
            start: 1,
            finish: 5,
        };
        assert_eq!(err.to_string(), "vertex 5 is not reachable from 1");
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
