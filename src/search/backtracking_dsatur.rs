use crate::color::{AlgorithmResult, Coloring, ColoringInstance};
use crate::error::ColoringError;
use crate::search::backtracking::{backtracking_driver, OrderingType};

/**
exact backtracking where the next vertex to branch on is chosen by the DSATUR rule
(most distinct colors among its colored neighbors, then largest degree, then smallest id).
Saturation degrees are updated incrementally when a decision is applied or undone.
*/
pub fn backtracking_dsatur(
    inst:&dyn ColoringInstance,
    start:Coloring,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    backtracking_driver(inst, start, OrderingType::Dsatur, record_steps)
}
