//! Coloring algorithms.

/// greedy colorings (static order and breadth-first order)
pub mod greedy;

/// greedy DSATUR algorithm
pub mod greedy_dsatur;

/// Recursive Largest First algorithm (RLF)
pub mod greedy_rlf;

/// exact backtracking (explicit decision stack)
pub mod backtracking;

/// backtracking where the next vertex is chosen by the DSATUR rule
pub mod backtracking_dsatur;

/// best-first branch-and-bound
pub mod branch_and_bound;

/// chromatic polynomial (deletion-contraction)
pub mod chromatic_polynomial;

/// simulated annealing
pub mod simulated_annealing;

/// genetic algorithm
pub mod genetic;

/// Metropolis sampler (Glauber dynamics)
pub mod metropolis;

/// helpers shared by the local searches
pub mod util;
