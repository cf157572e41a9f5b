use std::cmp::{max, min, Ordering};
use std::collections::BinaryHeap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, StepTrace, VertexId, validate_start};
use crate::error::ColoringError;
use crate::search::greedy::degree_order;

/** branch-and-bound parameters */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BnbConfig {
    /// if set, the search stops as soon as a coloring with this many colors is found
    pub known_optimal: Option<usize>,
}

impl BnbConfig {
    /// sets the known optimal number of colors
    pub fn with_known_optimal(mut self, k:usize) -> Self {
        self.known_optimal = Some(k);
        self
    }

    /// checks the parameters (a non-empty graph needs at least one color)
    pub fn validate(&self, inst:&dyn ColoringInstance) -> Result<(), ColoringError> {
        if self.known_optimal == Some(0) && inst.nb_vertices() > 0 {
            return Err(ColoringError::invalid_parameter(
                format!("known optimal 0 on a graph with {} vertices", inst.nb_vertices())
            ));
        }
        Ok(())
    }
}


/** outcome of a branch-and-bound run */
#[derive(Debug, Clone)]
pub struct BnbOutcome {
    /// best coloring found
    pub result: AlgorithmResult,
    /// number of nodes taken from the queue (pruned ones included)
    pub nb_visited: usize,
    /// number of nodes whose children were generated
    pub nb_expanded: usize,
}


/** search node: a partial coloring and its priority */
#[derive(Debug)]
struct BnbNode {
    /// number of colors of the greedy completion
    bound: usize,
    /// creation rank (ties are served first-generated-first)
    seq: usize,
    /// partial coloring
    coloring: Coloring,
    /// snapshots leading to this node (if recorded)
    steps: Option<StepTrace>,
}

impl Ord for BnbNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        other.bound.cmp(&self.bound)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for BnbNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BnbNode {
    fn eq(&self, other: &Self) -> bool {
        self.bound == other.bound && self.seq == other.seq
    }
}

impl Eq for BnbNode {}


/**
number of colors used once the partial coloring is greedily completed
(vertices visited in the given order, smallest feasible color, new color if needed).
It is the size of a feasible coloring, hence an upper bound.
*/
fn greedy_extension(inst:&dyn ColoringInstance, coloring:&Coloring, order:&[VertexId]) -> usize {
    let mut completion = coloring.clone();
    let mut current_max = completion.max_color();
    for v in order {
        if completion.is_colored(*v) { continue; }
        let c = completion.smallest_free_color(inst, *v);
        completion.assign(*v, c);
        current_max = max(current_max, c);
    }
    current_max
}

/**
best-first branch-and-bound.

Nodes are partial colorings, expanded by increasing greedy-completion bound.
A node is discarded as soon as its bound is not smaller than the best complete coloring.
Each expansion colors the next uncolored vertex (decreasing degree order) with the
colors 1..min(current max + 2, best + 1) that do not conflict with its neighbors.
*/
pub fn branch_and_bound_run(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&BnbConfig,
    record_steps:bool,
) -> Result<BnbOutcome, ColoringError> {
    validate_start(inst, &start)?;
    config.validate(inst)?;
    let start_time = Instant::now();
    let n = inst.nb_vertices();
    let order = degree_order(inst);
    let mut best:usize = max(n, start.max_pinned_color()) + 1;
    let mut best_node:Option<BnbNode> = None;
    let mut nb_expanded:usize = 0;
    let mut nb_visited:usize = 0;
    let mut seq:usize = 0;
    let root_steps = if record_steps {
        let mut trace = StepTrace::default();
        trace.push(start.as_slice());
        Some(trace)
    } else { None };
    let mut heap:BinaryHeap<BnbNode> = BinaryHeap::new();
    heap.push(BnbNode {
        bound: greedy_extension(inst, &start, &order),
        seq,
        coloring: start,
        steps: root_steps,
    });
    while let Some(node) = heap.pop() {
        nb_visited += 1;
        if node.bound >= best { continue; } // prune
        if node.coloring.is_complete() {
            let nb_colors = node.coloring.max_color();
            if nb_colors < best {
                best = nb_colors;
                log::debug!("branch-and-bound: new best {} ({} nodes expanded)", best, nb_expanded);
                best_node = Some(node);
                if config.known_optimal == Some(best) { break; }
            }
            continue;
        }
        let v = match order.iter().find(|v| !node.coloring.is_colored(**v)) {
            None => continue,
            Some(v) => *v,
        };
        nb_expanded += 1;
        let current_max = node.coloring.max_color();
        for c in 1..min(current_max+2, best+1) {
            if !node.coloring.is_safe(inst, v, c) { continue; }
            let mut child = node.coloring.clone();
            child.assign(v, c);
            let bound = greedy_extension(inst, &child, &order);
            if bound < best {
                let steps = node.steps.as_ref().map(|s| {
                    let mut s = s.clone();
                    s.push(child.as_slice());
                    s
                });
                seq += 1;
                heap.push(BnbNode { bound, seq, coloring: child, steps });
            }
        }
    }
    log::debug!("branch-and-bound: {} nodes visited, {} expanded", nb_visited, nb_expanded);
    match best_node {
        None => Err(ColoringError::invalid_parameter(
            format!("no coloring with less than {} colors", best)
        )),
        Some(node) => Ok(BnbOutcome {
            result: AlgorithmResult::new(node.coloring, Some(best), start_time, node.steps),
            nb_visited,
            nb_expanded,
        }),
    }
}

/** best-first branch-and-bound (see branch_and_bound_run) */
pub fn branch_and_bound(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&BnbConfig,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    Ok(branch_and_bound_run(inst, start, config, record_steps)?.result)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    fn solve(inst:&Graph) -> AlgorithmResult {
        branch_and_bound(inst, Coloring::new(inst.nb_vertices()), &BnbConfig::default(), false).unwrap()
    }

    #[test]
    fn test_families() {
        assert_eq!(solve(&Graph::cycle(5)).chromatic_number, Some(3));
        assert_eq!(solve(&Graph::cycle(8)).chromatic_number, Some(2));
        assert_eq!(solve(&Graph::complete(5)).chromatic_number, Some(5));
        assert_eq!(solve(&Graph::complete_bipartite(3, 3)).chromatic_number, Some(2));
        let res = solve(&Graph::new(vec![]));
        assert_eq!((res.k, res.chromatic_number), (0, Some(0)));
    }

    #[test]
    fn test_instances() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let res = solve(&inst);
        assert_eq!(checker(&inst, &res.coloring), CheckerResult::Ok(3));
        let inst = Graph::from_file("insts/other-instances/myciel3.col").unwrap();
        let res = solve(&inst);
        assert_eq!(checker(&inst, &res.coloring), CheckerResult::Ok(4));
        assert_eq!(res.chromatic_number, Some(4));
    }

    #[test]
    fn test_known_optimal_and_steps() {
        let inst = Graph::cycle(7);
        let config = BnbConfig::default().with_known_optimal(3);
        let res = branch_and_bound(&inst, Coloring::new(7), &config, true).unwrap();
        assert_eq!(res.chromatic_number, Some(3));
        let steps = res.steps.unwrap();
        // root snapshot plus one snapshot per colored vertex
        assert_eq!(steps.len(), 8);
        assert_eq!(steps.steps()[0], vec![None ; 7]);
        assert_eq!(steps.last(), Some(&res.coloring.as_slice().to_vec()));
    }

    #[test]
    fn test_known_optimal_stops_early() {
        let inst = Graph::cycle(7);
        let full = branch_and_bound_run(&inst, Coloring::new(7), &BnbConfig::default(), false).unwrap();
        let config = BnbConfig::default().with_known_optimal(3);
        let early = branch_and_bound_run(&inst, Coloring::new(7), &config, false).unwrap();
        assert_eq!(full.result.chromatic_number, Some(3));
        assert_eq!(early.result.chromatic_number, Some(3));
        // the bound never goes below 3, so both expand the same nodes,
        // the early stop leaves the remaining queue unvisited
        assert_eq!(full.nb_expanded, 33);
        assert_eq!(early.nb_expanded, 33);
        assert_eq!(full.nb_visited, 80);
        assert_eq!(early.nb_visited, 34);
    }

    #[test]
    fn test_validate_config() {
        let config = BnbConfig::default().with_known_optimal(0);
        assert!(matches!(
            branch_and_bound(&Graph::path(2), Coloring::new(2), &config, false),
            Err(ColoringError::InvalidParameter(_))
        ));
        assert!(config.validate(&Graph::new(vec![])).is_ok());
        assert!(BnbConfig::default().with_known_optimal(2).validate(&Graph::path(2)).is_ok());
    }

    #[test]
    fn test_pins() {
        let inst = Graph::path(3);
        let start = Coloring::with_pins(3, vec![(0, 1), (2, 2)]).unwrap();
        let res = branch_and_bound(&inst, start, &BnbConfig::default(), false).unwrap();
        assert_eq!(res.coloring.as_slice(), &[Some(1), Some(3), Some(2)]);
        assert_eq!(res.chromatic_number, Some(3));
    }

    #[test]
    fn test_self_loop() {
        let inst = Graph::new(vec![vec![1], vec![1]]);
        let res = branch_and_bound(&inst, Coloring::new(2), &BnbConfig::default(), false);
        assert_eq!(res.unwrap_err(), ColoringError::InvalidGraph { vertex: 1 });
    }
}
