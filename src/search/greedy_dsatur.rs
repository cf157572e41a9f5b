use std::cmp::{Ordering, Ord};
use std::time::Instant;

use priority_queue::PriorityQueue;
use bit_set::BitSet;

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;

#[derive(Debug, PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
    vertex: VertexId,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat)
            .then_with(|| self.degree.cmp(&other.degree))
            .then_with(|| other.vertex.cmp(&self.vertex)) // smallest id first
    }
}

impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/** implements a greedy DSATUR algorithm.
    1. choose an uncolored vertex that sees the most colors (break ties by the largest degree,
       then by the smallest id)
    2. give it the first color available
    3. mark all its uncolored neighbors seeing this color
    4. repeat until every vertex is colored

Pinned vertices of `start` are colored from the beginning: the colors their
neighbors see are initialized from them.

parameters:
 - inst: reference to an instance
 - start: starting coloring (pinned vertices only)
 - record_steps: if true, a snapshot is recorded after each assignment
*/
pub fn greedy_dsatur(
    inst:&dyn ColoringInstance,
    start:Coloring,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let n:usize = inst.nb_vertices();
    let mut coloring = start;
    let mut adj_colors:Vec<BitSet> = vec![BitSet::default() ; n]; // adj_colors[v] -> colors v sees
    for u in coloring.pinned_vertices().collect::<Vec<_>>() {
        if let Some(c) = coloring.get(u) {
            for v in inst.neighbors(u) { adj_colors[*v].insert(c); }
        }
    }
    let mut remaining_vertices:PriorityQueue<VertexId, DSatInfo> = PriorityQueue::new();
    for v in inst.vertices().filter(|v| !coloring.is_colored(*v)) {
        remaining_vertices.push(v, DSatInfo { dsat:adj_colors[v].len(), degree:inst.degree(v), vertex:v });
    }
    while let Some((current_vertex,_)) = remaining_vertices.pop() {
        // assign it a color
        let mut color:usize = 1;
        while adj_colors[current_vertex].contains(color) { color += 1; }
        coloring.assign(current_vertex, color);
        tracer.record(coloring.as_slice());
        // update saturation degree information
        for conflict_vertex in inst.neighbors(current_vertex).iter()
        .filter(|conflict_vertex| !coloring.is_colored(**conflict_vertex)) {
            if adj_colors[*conflict_vertex].insert(color) {
                remaining_vertices.change_priority_by(conflict_vertex, |p| { p.dsat += 1; });
            }
        }
    }
    let res = AlgorithmResult::new(coloring, None, start_time, tracer.finish());
    log::debug!("dsatur: {} colors", res.k);
    Ok(res)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_dsatur_petersen() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        inst.display_statistics();
        let res = greedy_dsatur(&inst, Coloring::new(10), false).unwrap();
        assert_eq!(checker(&inst, &res.coloring), CheckerResult::Ok(3));
    }

    #[test]
    fn test_dsatur_exact_on_bipartite() {
        // DSATUR is exact on bipartite graphs
        let inst = Graph::from_edges(6, &[(0,3), (0,5), (2,1), (2,5), (4,1), (4,3)]);
        let res = greedy_dsatur(&inst, Coloring::new(6), true).unwrap();
        assert_eq!(res.k, 2);
        assert_eq!(res.steps.unwrap().len(), 6);
        let res = greedy_dsatur(&Graph::cycle(7), Coloring::new(7), false).unwrap();
        assert_eq!(res.k, 3);
    }

    #[test]
    fn test_dsatur_tie_breaking() {
        // every vertex of a cycle has the same degree: vertex 0 goes first
        let res = greedy_dsatur(&Graph::cycle(4), Coloring::new(4), true).unwrap();
        let steps = res.steps.unwrap();
        assert_eq!(steps.steps()[0], vec![Some(1), None, None, None]);
        assert_eq!(res.coloring.as_slice(), &[Some(1), Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_dsatur_keeps_pins() {
        let inst = Graph::cycle(5);
        let start = Coloring::with_pins(5, vec![(0, 3), (2, 1)]).unwrap();
        let res = greedy_dsatur(&inst, start, false).unwrap();
        assert_eq!(res.coloring.get(0), Some(3));
        assert_eq!(res.coloring.get(2), Some(1));
        assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(_)));
    }

    #[test]
    fn test_dsatur_empty() {
        let res = greedy_dsatur(&Graph::new(vec![]), Coloring::new(0), false).unwrap();
        assert_eq!(res.k, 0);
        assert!(res.coloring.is_complete());
    }
}
