use std::fs;

use serde::{Deserialize, Serialize};

use crate::color::VertexId;
use crate::error::InstanceError;
use crate::search::branch_and_bound::BnbConfig;
use crate::search::genetic::GaConfig;
use crate::search::metropolis::MetropolisConfig;
use crate::search::simulated_annealing::SaConfig;

/** parameters of every algorithm (missing fields take their default value)

```
use kcolor::solvers::SolverParams;

let params = SolverParams::from_json_str(r#"{"ga": {"population_size": 20}, "bfs_start": 2}"#).unwrap();
assert_eq!(params.ga.population_size, 20);
assert_eq!(params.ga.max_generations, 100);
assert_eq!(params.bfs_start, 2);
```
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// simulated annealing
    pub sa: SaConfig,
    /// genetic algorithm
    pub ga: GaConfig,
    /// Metropolis sampler
    pub metropolis: MetropolisConfig,
    /// branch-and-bound
    pub bnb: BnbConfig,
    /// first vertex of the breadth-first greedy
    pub bfs_start: VertexId,
    /// highest value scanned by the chromatic polynomial (default: number of vertices)
    pub polynomial_bound: Option<usize>,
}

impl SolverParams {
    /// reads parameters from a JSON string
    pub fn from_json_str(s:&str) -> Result<Self, InstanceError> {
        Ok(serde_json::from_str(s)?)
    }

    /// reads parameters from a JSON file
    pub fn from_file(filename:&str) -> Result<Self, InstanceError> {
        let content = fs::read_to_string(filename)?;
        Self::from_json_str(&content)
    }
}
