use std::collections::VecDeque;
use std::time::Instant;

use bit_set::BitSet;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;

/** order in which the greedy visits the vertices */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreedyOrder {
    /// vertex ids in increasing order
    Input,
    /// uniformly random permutation
    Random,
    /// decreasing degree (Welsh-Powell)
    WelshPowell,
}

/// vertices sorted by decreasing degree (ties: smallest id first)
pub fn degree_order(inst:&dyn ColoringInstance) -> Vec<VertexId> {
    let mut res:Vec<VertexId> = inst.vertices().collect();
    res.sort_by(|a,b| inst.degree(*b).cmp(&inst.degree(*a)).then_with(|| a.cmp(b)));
    res
}

/// builds the visiting order
pub fn vertex_order<R:Rng>(inst:&dyn ColoringInstance, order:GreedyOrder, rng:&mut R) -> Vec<VertexId> {
    match order {
        GreedyOrder::Input => inst.vertices().collect(),
        GreedyOrder::Random => {
            let mut res:Vec<VertexId> = inst.vertices().collect();
            res.shuffle(rng);
            res
        },
        GreedyOrder::WelshPowell => degree_order(inst),
    }
}

/**
colors every uncolored vertex of `order` with the smallest color unused by its colored neighbors.
Already colored vertices (e.g. pinned ones) are left untouched.
*/
pub(crate) fn greedy_complete(
    inst:&dyn ColoringInstance,
    coloring:&mut Coloring,
    order:&[VertexId],
    tracer:&mut Tracer
) {
    for v in order {
        if coloring.is_colored(*v) { continue; }
        let c = coloring.smallest_free_color(inst, *v);
        coloring.assign(*v, c);
        tracer.record(coloring.as_slice());
    }
}

/** greedy coloring. Visits the vertices in the given order and assigns each
the smallest color not used by its already colored neighbors. O(V+E).
*/
pub fn greedy<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    order:GreedyOrder,
    rng:&mut R,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let mut coloring = start;
    let vertices = vertex_order(inst, order, rng);
    greedy_complete(inst, &mut coloring, &vertices, &mut tracer);
    let res = AlgorithmResult::new(coloring, None, start_time, tracer.finish());
    log::debug!("greedy ({:?}): {} colors", order, res.k);
    Ok(res)
}

/** greedy coloring following a breadth-first traversal from start_vertex.
When a connected component is exhausted, the traversal restarts from the
smallest unvisited vertex, so that every vertex ends up colored.
*/
pub fn greedy_bfs(
    inst:&dyn ColoringInstance,
    start:Coloring,
    start_vertex:VertexId,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let n = inst.nb_vertices();
    if n > 0 && start_vertex >= n {
        return Err(ColoringError::invalid_parameter(
            format!("bfs start vertex {} out of range (n={})", start_vertex, n)
        ));
    }
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let mut coloring = start;
    let mut visited = BitSet::with_capacity(n);
    let mut queue:VecDeque<VertexId> = VecDeque::new();
    let roots = std::iter::once(start_vertex).chain(0..n).take_while(|_| n > 0);
    for root in roots {
        if visited.contains(root) { continue; }
        visited.insert(root);
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            for v in inst.neighbors(u) {
                if visited.insert(*v) { queue.push_back(*v); }
            }
            if !coloring.is_colored(u) {
                let c = coloring.smallest_free_color(inst, u);
                coloring.assign(u, c);
                tracer.record(coloring.as_slice());
            }
        }
    }
    Ok(AlgorithmResult::new(coloring, None, start_time, tracer.finish()))
}
