use std::time::Instant;

use bit_set::BitSet;

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;

/** implements a greedy RLF algorithm. That colors vertices one color at a time
    1. selects the uncolored vertex with the most uncolored neighbors and gives it the current color
    2. mark its uncolored neighbors blocked
    3. select a free vertex that has the most neighbors among the blocked vertices,
       color it and block its free neighbors
    4. when there are no free vertices, start over with a new color

Pinned vertices of color c are members of the c-th class from the beginning:
their uncolored neighbors start blocked.
*/
pub fn greedy_rlf(
    inst:&dyn ColoringInstance,
    start:Coloring,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let n:usize = inst.nb_vertices();
    let mut coloring = start;
    let mut nb_uncolored:usize = n - coloring.nb_colored();
    let mut current_color:usize = 0;
    while nb_uncolored > 0 {
        current_color += 1;
        let mut blocked:BitSet = BitSet::with_capacity(n);
        let mut nb_blocked_neighbors:Vec<usize> = vec![0 ; n];
        // blocks u and updates the counters of its neighbors
        let block = |u:VertexId, blocked:&mut BitSet, counters:&mut [usize]| {
            if blocked.insert(u) {
                for w in inst.neighbors(u) { counters[*w] += 1; }
            }
        };
        for u in coloring.pinned_vertices().filter(|u| coloring.get(*u) == Some(current_color)) {
            for v in inst.neighbors(u).iter().filter(|v| !coloring.is_colored(**v)) {
                block(*v, &mut blocked, &mut nb_blocked_neighbors);
            }
        }
        // seed: free vertex with the most uncolored neighbors
        let seed = inst.vertices()
            .filter(|v| !coloring.is_colored(*v) && !blocked.contains(*v))
            .max_by(|a,b| {
                let da = inst.neighbors(*a).iter().filter(|w| !coloring.is_colored(**w)).count();
                let db = inst.neighbors(*b).iter().filter(|w| !coloring.is_colored(**w)).count();
                da.cmp(&db).then_with(|| b.cmp(a))
            });
        let mut current = seed;
        while let Some(current_vertex) = current {
            coloring.assign(current_vertex, current_color);
            nb_uncolored -= 1;
            tracer.record(coloring.as_slice());
            for v in inst.neighbors(current_vertex) {
                if !coloring.is_colored(*v) {
                    block(*v, &mut blocked, &mut nb_blocked_neighbors);
                }
            }
            // free vertex that sees the most blocked vertices
            current = inst.vertices()
                .filter(|v| !coloring.is_colored(*v) && !blocked.contains(*v))
                .max_by(|a,b| {
                    nb_blocked_neighbors[*a].cmp(&nb_blocked_neighbors[*b]).then_with(|| b.cmp(a))
                });
        }
    }
    let res = AlgorithmResult::new(coloring, None, start_time, tracer.finish());
    log::debug!("rlf: {} colors", res.k);
    Ok(res)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_rlf_instances() {
        let inst = Graph::from_file("insts/other-instances/myciel3.col").unwrap();
        let res = greedy_rlf(&inst, Coloring::new(11), false).unwrap();
        assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(k) if k >= 4));
        let inst = Graph::complete_bipartite(3, 4);
        let res = greedy_rlf(&inst, Coloring::new(7), true).unwrap();
        assert_eq!(res.k, 2);
        assert_eq!(res.steps.unwrap().len(), 7);
    }

    #[test]
    fn test_rlf_classes() {
        // star: the center is the seed, leaves form the second class
        let inst = Graph::from_edges(4, &[(2,0), (2,1), (2,3)]);
        let res = greedy_rlf(&inst, Coloring::new(4), false).unwrap();
        assert_eq!(res.coloring.as_slice(), &[Some(2), Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_rlf_keeps_pins() {
        let inst = Graph::path(4);
        let start = Coloring::with_pins(4, vec![(1, 2), (3, 4)]).unwrap();
        let res = greedy_rlf(&inst, start, false).unwrap();
        assert_eq!(res.coloring.get(1), Some(2));
        assert_eq!(res.coloring.get(3), Some(4));
        assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(_)));
    }

    #[test]
    fn test_rlf_empty() {
        let res = greedy_rlf(&Graph::new(vec![]), Coloring::new(0), false).unwrap();
        assert_eq!(res.k, 0);
    }
}
