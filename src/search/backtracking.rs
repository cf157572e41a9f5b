use std::cmp::max;
use std::time::Instant;

use bit_set::BitSet;

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;
use crate::search::greedy::degree_order;


/** Vertex ordering type */
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderingType {
    /** static order: decreasing degree */
    Static,
    /** DSATUR: choose first the vertex that has in its neighborhood the most colors.
    breaks ties by the degree, then by the smallest id. */
    Dsatur,
}

/** represents a decision (assigning color c to vertex v) */
#[derive(Debug, Clone, Copy)]
struct Decision {
    v: VertexId,
    c: usize,
}

/// either a decision to apply, either a decision to undo
#[derive(Debug)]
enum BacktrackEvent {
    Commit(Decision), // decision to commit
    Restore(Decision) // decision taken
}


/**
Backtracking search space deciding if the graph can be colored with colors 1..k.
Pinned vertices keep their color, the other vertices are colored one at a time.
*/
#[derive(Debug)]
pub(crate) struct BacktrackingSpace<'a> {
    /// instance
    inst: &'a dyn ColoringInstance,
    /// vertex selection rule
    ordering: OrderingType,
    /// number of colors available
    k: usize,
    /// free vertices sorted by decreasing degree (static ordering)
    order: Vec<VertexId>,
    /// current partial coloring
    coloring: Coloring,
    /// uncolored vertices
    uncolored: BitSet,
    /// dsat[v]: saturation degree of vertex v
    dsat: Vec<usize>,
    /// nb_adj_colored[v][c]: number of vertices adjacent to v colored with c
    nb_adj_colored: Vec<Vec<usize>>,
    /// decision history
    decisions: Vec<BacktrackEvent>,
    /// number of expanded nodes
    nb_expanded: usize,
}

impl<'a> BacktrackingSpace<'a> {
    /** creates a new search space. Only the pinned colors of start are kept.
    Every pinned color must be at most k. */
    pub fn new(inst:&'a dyn ColoringInstance, start:&Coloring, k:usize, ordering:OrderingType) -> Self {
        let n = inst.nb_vertices();
        debug_assert!(start.max_pinned_color() <= k);
        let mut coloring = start.clone();
        let mut uncolored = BitSet::with_capacity(n);
        let mut dsat = vec![0 ; n];
        let mut nb_adj_colored = vec![vec![0 ; k+1] ; n];
        for v in inst.vertices() {
            coloring.unassign(v);
            match coloring.get(v) {
                None => { uncolored.insert(v); },
                Some(c) => {
                    for u in inst.neighbors(v) {
                        nb_adj_colored[*u][c] += 1;
                        if nb_adj_colored[*u][c] == 1 { dsat[*u] += 1; }
                    }
                }
            }
        }
        let order = degree_order(inst).into_iter().filter(|v| uncolored.contains(*v)).collect();
        Self {
            inst, ordering, k, order, coloring, uncolored, dsat, nb_adj_colored,
            decisions: Vec::with_capacity(2*n*k),
            nb_expanded: 0,
        }
    }

    /// finds the next vertex to color
    fn next_vertex(&self) -> Option<VertexId> {
        match self.ordering {
            OrderingType::Static => self.order.iter().copied().find(|v| self.uncolored.contains(*v)),
            OrderingType::Dsatur => self.uncolored.iter().max_by(|a,b| {
                self.dsat[*a].cmp(&self.dsat[*b])
                    .then_with(|| self.inst.degree(*a).cmp(&self.inst.degree(*b)))
                    .then_with(|| b.cmp(a))
            }),
        }
    }

    /// pushes the children of the current node (colors are tried in increasing order)
    fn push_next_decisions(&mut self) {
        if let Some(v) = self.next_vertex() {
            self.nb_expanded += 1;
            let candidate_colors:Vec<usize> = (1..=self.k)
                .filter(|c| self.nb_adj_colored[v][*c] == 0).collect();
            for c in candidate_colors.into_iter().rev() {
                let decision = Decision { v, c };
                self.decisions.push(BacktrackEvent::Restore(decision)); // prepare to backtrack
                self.decisions.push(BacktrackEvent::Commit(decision)); // decision to apply
            }
        }
    }

    /// applies a decision to the search space
    fn commit(&mut self, decision:Decision) {
        debug_assert!(!self.coloring.is_colored(decision.v));
        self.coloring.assign(decision.v, decision.c);
        self.uncolored.remove(decision.v);
        for u in self.inst.neighbors(decision.v) {
            self.nb_adj_colored[*u][decision.c] += 1;
            if self.nb_adj_colored[*u][decision.c] == 1 { self.dsat[*u] += 1; }
        }
    }

    /// restores the search space from a decision
    fn restore(&mut self, decision:Decision) {
        debug_assert_eq!(self.coloring.get(decision.v), Some(decision.c));
        self.coloring.unassign(decision.v);
        self.uncolored.insert(decision.v);
        for u in self.inst.neighbors(decision.v) {
            self.nb_adj_colored[*u][decision.c] -= 1;
            if self.nb_adj_colored[*u][decision.c] == 0 { self.dsat[*u] -= 1; }
        }
    }

    /** depth-first search.

    Stores the decisions to be taken in a stack,
    pops each decision and applies (or undoes) it.
    returns the first complete coloring found (None if the k colors do not suffice).
    */
    pub fn dfs_search(&mut self, tracer:&mut Tracer) -> Option<Coloring> {
        if self.uncolored.is_empty() { return Some(self.coloring.clone()); }
        self.push_next_decisions();
        while let Some(event) = self.decisions.pop() {
            match event {
                BacktrackEvent::Restore(decision) => { // restore the state
                    self.restore(decision);
                    tracer.record(self.coloring.as_slice());
                },
                BacktrackEvent::Commit(decision) => { // apply the decision and generate children
                    self.commit(decision);
                    tracer.record(self.coloring.as_slice());
                    if self.uncolored.is_empty() {
                        return Some(self.coloring.clone());
                    }
                    self.push_next_decisions();
                }
            }
        }
        None
    }

    /// number of expanded nodes
    pub fn nb_expanded(&self) -> usize { self.nb_expanded }
}


/** returns a coloring using colors 1..k that keeps the pinned colors of start (None if none exists). */
pub fn color_with_k(
    inst:&dyn ColoringInstance,
    start:&Coloring,
    k:usize,
) -> Result<Option<Coloring>, ColoringError> {
    validate_start(inst, start)?;
    if start.max_pinned_color() > k { return Ok(None); }
    if inst.nb_vertices() > 0 && k == 0 { return Ok(None); }
    let mut space = BacktrackingSpace::new(inst, start, k, OrderingType::Static);
    Ok(space.dfs_search(&mut Tracer::new(false)))
}

/**
increases k from 1 (or the highest pinned color) until the backtracking finds a coloring.
The first k admitting a coloring is reported as the chromatic number.
*/
pub(crate) fn backtracking_driver(
    inst:&dyn ColoringInstance,
    start:Coloring,
    ordering:OrderingType,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let n = inst.nb_vertices();
    if n == 0 {
        return Ok(AlgorithmResult::new(start, Some(0), start_time, tracer.finish()));
    }
    let max_pinned = start.max_pinned_color();
    // k = max(n, max_pinned) is always feasible (pins are pairwise consistent)
    for k in max(1, max_pinned)..=max(n, max_pinned) {
        let mut space = BacktrackingSpace::new(inst, &start, k, ordering);
        let found = space.dfs_search(&mut tracer);
        log::debug!("backtracking ({:?}): k={} feasible={} ({} nodes)", ordering, k, found.is_some(), space.nb_expanded());
        if let Some(coloring) = found {
            return Ok(AlgorithmResult::new(coloring, Some(k), start_time, tracer.finish()));
        }
    }
    Err(ColoringError::invalid_parameter("no coloring found with pinned vertices"))
}

/** exact backtracking with a static (decreasing degree) vertex order */
pub fn backtracking(
    inst:&dyn ColoringInstance,
    start:Coloring,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    backtracking_driver(inst, start, OrderingType::Static, record_steps)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_backtracking_families() {
        assert_eq!(backtracking(&Graph::cycle(5), Coloring::new(5), false).unwrap().chromatic_number, Some(3));
        assert_eq!(backtracking(&Graph::cycle(6), Coloring::new(6), false).unwrap().chromatic_number, Some(2));
        assert_eq!(backtracking(&Graph::complete(5), Coloring::new(5), false).unwrap().chromatic_number, Some(5));
        let res = backtracking(&Graph::new(vec![vec![] ; 3]), Coloring::new(3), false).unwrap();
        assert_eq!(res.chromatic_number, Some(1));
        assert_eq!(res.k, 1);
    }

    #[test]
    fn test_backtracking_instances() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let res = backtracking(&inst, Coloring::new(10), false).unwrap();
        assert_eq!(checker(&inst, &res.coloring), CheckerResult::Ok(3));
        assert_eq!(res.chromatic_number, Some(3));
        let inst = Graph::from_file("insts/other-instances/myciel3.col").unwrap();
        let res = backtracking(&inst, Coloring::new(11), false).unwrap();
        assert_eq!(res.chromatic_number, Some(4));
    }

    #[test]
    fn test_color_with_k() {
        let inst = Graph::cycle(5);
        assert_eq!(color_with_k(&inst, &Coloring::new(5), 2).unwrap(), None);
        let coloring = color_with_k(&inst, &Coloring::new(5), 3).unwrap().unwrap();
        assert_eq!(checker(&inst, &coloring), CheckerResult::Ok(3));
        let pinned = Coloring::with_pins(5, vec![(0, 4)]).unwrap();
        assert_eq!(color_with_k(&inst, &pinned, 3).unwrap(), None);
        assert!(color_with_k(&Graph::new(vec![]), &Coloring::new(0), 0).unwrap().is_some());
    }

    #[test]
    fn test_backtracking_keeps_pins() {
        let inst = Graph::path(3);
        let start = Coloring::with_pins(3, vec![(0, 1), (2, 2)]).unwrap();
        let res = backtracking(&inst, start, false).unwrap();
        assert_eq!(res.coloring.as_slice(), &[Some(1), Some(3), Some(2)]);
        assert_eq!(res.chromatic_number, Some(3));
    }

    #[test]
    fn test_backtracking_steps() {
        // triangle: k=1 and k=2 fail, k=3 succeeds at the first leaf
        let res = backtracking(&Graph::complete(3), Coloring::new(3), true).unwrap();
        let steps = res.steps.unwrap();
        assert_eq!(steps.last(), Some(&vec![Some(1), Some(2), Some(3)]));
        assert!(steps.len() > 3);
    }

    #[test]
    fn test_backtracking_errors() {
        let inst = Graph::new(vec![vec![0]]);
        assert_eq!(
            backtracking(&inst, Coloring::new(1), false).unwrap_err(),
            ColoringError::InvalidGraph { vertex: 0 }
        );
        let res = backtracking(&Graph::new(vec![]), Coloring::new(0), false).unwrap();
        assert_eq!((res.k, res.chromatic_number), (0, Some(0)));
    }
}
