//! Graph coloring engine: greedy, exact and randomized coloring algorithms

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// coloring instance base trait, colorings, results and checker
pub mod color;

/// error types
pub mod error;

/// graph (adjacency list) and small graph families
pub mod graph;

/// read DIMACS formats
pub mod dimacs;

/// helper and utility methods for the executable (instances, pins, exports)
pub mod util;

/// coloring algorithms
pub mod search;

/// algorithm selection and parameters
pub mod solvers;
