use thiserror::Error;

use crate::color::VertexId;

/** errors reported by the coloring algorithms */
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColoringError {
    /// the graph contains a self-loop, no proper coloring exists
    #[error("invalid graph: vertex {vertex} is adjacent to itself")]
    InvalidGraph {
        /// vertex carrying the self-loop
        vertex: VertexId,
    },
    /// an algorithm-specific precondition does not hold
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// the chromatic polynomial is not positive on any x <= bound
    #[error("chromatic number undetermined: no positive evaluation for x <= {bound}")]
    Undetermined {
        /// last evaluated point
        bound: usize,
    },
}

impl ColoringError {
    /// shorthand to build an InvalidParameter error
    pub fn invalid_parameter<S: Into<String>>(msg:S) -> Self {
        ColoringError::InvalidParameter(msg.into())
    }
}

/** errors raised while reading instances, pins or parameters */
#[derive(Debug, Error)]
pub enum InstanceError {
    /// the file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// malformed JSON document
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// malformed DIMACS file
    #[error("parse error at line {line}: {msg}")]
    Parse {
        /// line number (starting at 1)
        line: usize,
        /// what went wrong
        msg: String,
    },
    /// a pinned label does not name a vertex of the graph
    #[error("unknown vertex label {0}")]
    UnknownVertex(String),
    /// invalid command line value
    #[error("invalid argument: {0}")]
    Argument(String),
    /// the algorithm failed
    #[error(transparent)]
    Coloring(#[from] ColoringError),
}
