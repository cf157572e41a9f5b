//! Solver dispatch: runs any coloring algorithm by name.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance};
use crate::error::ColoringError;
use crate::search::backtracking::backtracking;
use crate::search::backtracking_dsatur::backtracking_dsatur;
use crate::search::branch_and_bound::branch_and_bound;
use crate::search::chromatic_polynomial::polynomial_coloring;
use crate::search::genetic::genetic;
use crate::search::greedy::{greedy, greedy_bfs, GreedyOrder};
use crate::search::greedy_dsatur::greedy_dsatur;
use crate::search::greedy_rlf::greedy_rlf;
use crate::search::metropolis::metropolis;
use crate::search::simulated_annealing::simulated_annealing;

/// tunable parameters of every algorithm
pub mod params;

pub use params::SolverParams;

/** coloring algorithms */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// greedy, input order
    Greedy,
    /// greedy, random order
    GreedyRandom,
    /// greedy, decreasing degree order
    WelshPowell,
    /// greedy, breadth-first order
    GreedyBfs,
    /// DSATUR
    Dsatur,
    /// Recursive Largest First
    Rlf,
    /// exact backtracking (static order)
    Backtracking,
    /// exact backtracking (DSATUR order)
    BacktrackingDsatur,
    /// best-first branch-and-bound
    BranchAndBound,
    /// chromatic polynomial (deletion-contraction)
    ChromaticPolynomial,
    /// simulated annealing
    SimulatedAnnealing,
    /// genetic algorithm
    Genetic,
    /// Metropolis sampler
    Metropolis,
}

impl Algorithm {
    /// every algorithm
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Greedy, Algorithm::GreedyRandom, Algorithm::WelshPowell, Algorithm::GreedyBfs,
        Algorithm::Dsatur, Algorithm::Rlf,
        Algorithm::Backtracking, Algorithm::BacktrackingDsatur, Algorithm::BranchAndBound,
        Algorithm::ChromaticPolynomial,
        Algorithm::SimulatedAnnealing, Algorithm::Genetic, Algorithm::Metropolis,
    ];

    /// name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Greedy => "greedy",
            Algorithm::GreedyRandom => "greedy_random",
            Algorithm::WelshPowell => "welsh_powell",
            Algorithm::GreedyBfs => "greedy_bfs",
            Algorithm::Dsatur => "dsatur",
            Algorithm::Rlf => "rlf",
            Algorithm::Backtracking => "backtracking",
            Algorithm::BacktrackingDsatur => "backtracking_dsatur",
            Algorithm::BranchAndBound => "branch_and_bound",
            Algorithm::ChromaticPolynomial => "chromatic_polynomial",
            Algorithm::SimulatedAnnealing => "simulated_annealing",
            Algorithm::Genetic => "genetic",
            Algorithm::Metropolis => "metropolis",
        }
    }

    /// true iff the algorithm proves the chromatic number
    pub fn is_exact(&self) -> bool {
        matches!(self,
            Algorithm::Backtracking | Algorithm::BacktrackingDsatur |
            Algorithm::BranchAndBound | Algorithm::ChromaticPolynomial
        )
    }

    /// true iff the algorithm draws random numbers
    pub fn is_randomized(&self) -> bool {
        matches!(self,
            Algorithm::GreedyRandom | Algorithm::SimulatedAnnealing |
            Algorithm::Genetic | Algorithm::Metropolis
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ColoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL.iter().copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| ColoringError::invalid_parameter(format!("unknown algorithm {}", s)))
    }
}


/**
runs an algorithm on an instance.

parameters:
 - start: starting coloring (pinned vertices)
 - params: algorithm parameters (only the ones of the selected algorithm are used)
 - record_steps: if true, the result contains the intermediate colorings
 - rng: random generator (used by the randomized algorithms)
*/
pub fn solve<R:Rng>(
    algorithm:Algorithm,
    inst:&dyn ColoringInstance,
    start:Coloring,
    params:&SolverParams,
    record_steps:bool,
    rng:&mut R,
) -> Result<AlgorithmResult, ColoringError> {
    log::info!("running {} ({} vertices, {} pinned)", algorithm, inst.nb_vertices(), start.nb_pinned());
    let res = match algorithm {
        Algorithm::Greedy => greedy(inst, start, GreedyOrder::Input, rng, record_steps),
        Algorithm::GreedyRandom => greedy(inst, start, GreedyOrder::Random, rng, record_steps),
        Algorithm::WelshPowell => greedy(inst, start, GreedyOrder::WelshPowell, rng, record_steps),
        Algorithm::GreedyBfs => greedy_bfs(inst, start, params.bfs_start, record_steps),
        Algorithm::Dsatur => greedy_dsatur(inst, start, record_steps),
        Algorithm::Rlf => greedy_rlf(inst, start, record_steps),
        Algorithm::Backtracking => backtracking(inst, start, record_steps),
        Algorithm::BacktrackingDsatur => backtracking_dsatur(inst, start, record_steps),
        Algorithm::BranchAndBound => branch_and_bound(inst, start, &params.bnb, record_steps),
        Algorithm::ChromaticPolynomial => polynomial_coloring(inst, start, params.polynomial_bound, record_steps),
        Algorithm::SimulatedAnnealing => simulated_annealing(inst, start, &params.sa, rng, record_steps),
        Algorithm::Genetic => genetic(inst, start, &params.ga, rng, record_steps),
        Algorithm::Metropolis => metropolis(inst, start, &params.metropolis, rng, record_steps),
    }?;
    log::info!("{}: {} colors in {:.3} seconds", algorithm, res.k, res.runtime);
    Ok(res)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_names() {
        for a in Algorithm::ALL.iter() {
            assert_eq!(a.to_string().parse::<Algorithm>(), Ok(*a));
            assert_eq!(serde_json::to_string(a).unwrap(), format!("\"{}\"", a.name()));
        }
        assert!(matches!("unknown".parse::<Algorithm>(), Err(ColoringError::InvalidParameter(_))));
        assert_eq!(Algorithm::ALL.iter().filter(|a| a.is_exact()).count(), 4);
    }

    #[test]
    fn test_solve_rejects_unpinned_colors() {
        let inst = Graph::path(3);
        let start = Coloring::from_colors(vec![Some(1), None, None]);
        for a in Algorithm::ALL.iter() {
            let mut rng = StdRng::seed_from_u64(0);
            let res = solve(*a, &inst, start.clone(), &SolverParams::default(), false, &mut rng);
            assert!(matches!(res, Err(ColoringError::InvalidParameter(_))), "{}", a);
        }
        // the same color as a pin is kept by every method supporting pins
        let start = Coloring::with_pins(3, vec![(0, 1)]).unwrap();
        for a in Algorithm::ALL.iter().filter(|a| **a != Algorithm::ChromaticPolynomial) {
            let mut rng = StdRng::seed_from_u64(0);
            let res = solve(*a, &inst, start.clone(), &SolverParams::default(), false, &mut rng).unwrap();
            assert_eq!(res.coloring.get(0), Some(1), "{}", a);
            assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(_)), "{}", a);
        }
    }

    #[test]
    fn test_solve_all() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let params = SolverParams::default();
        for a in Algorithm::ALL.iter() {
            let mut rng = StdRng::seed_from_u64(0);
            let res = solve(*a, &inst, Coloring::new(10), &params, false, &mut rng).unwrap();
            assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(_)), "{}", a);
            if a.is_exact() {
                assert_eq!(res.chromatic_number, Some(3), "{}", a);
            } else {
                assert_eq!(res.chromatic_number, None, "{}", a);
            }
        }
    }
}
