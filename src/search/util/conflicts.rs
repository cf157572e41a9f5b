use bit_set::BitSet;
use rand::Rng;

use crate::color::{Coloring, ColoringInstance, VertexId};
use crate::error::ColoringError;

/** colors of a complete coloring as a dense vector (fails if a vertex is uncolored) */
pub fn dense_colors(coloring:&Coloring) -> Result<Vec<usize>, ColoringError> {
    coloring.as_slice().iter().copied().collect::<Option<Vec<usize>>>()
        .ok_or_else(|| ColoringError::invalid_parameter("the coloring is not complete"))
}

/** number of neighbors of v sharing its color (complete coloring, colors[v] >= 1) */
pub fn local_conflicts(inst:&dyn ColoringInstance, colors:&[usize], v:VertexId) -> usize {
    local_conflicts_with(inst, colors, v, colors[v])
}

/** number of neighbors of v colored with c */
pub fn local_conflicts_with(inst:&dyn ColoringInstance, colors:&[usize], v:VertexId, c:usize) -> usize {
    inst.neighbors(v).iter().filter(|u| colors[**u] == c).count()
}

/** number of conflicting edges (each edge counted once) */
pub fn nb_conflicts(inst:&dyn ColoringInstance, colors:&[usize]) -> usize {
    inst.edges().iter().filter(|(u,v)| colors[*u] == colors[*v]).count()
}

/** number of distinct colors */
pub fn distinct_colors(colors:&[usize]) -> usize {
    let used:BitSet = colors.iter().copied().collect();
    used.len()
}

/**
penalized cost of a complete coloring: (n+1).conflicts + (distinct colors - 1).
A single conflict costs more than any reduction of the number of colors.
*/
pub fn penalized_cost(n:usize, nb_conflicts:usize, nb_distinct:usize) -> u64 {
    ((n as u64) + 1) * (nb_conflicts as u64) + (nb_distinct as u64).saturating_sub(1)
}

/** penalized cost of a complete coloring */
pub fn coloring_cost(inst:&dyn ColoringInstance, colors:&[usize]) -> u64 {
    penalized_cost(inst.nb_vertices(), nb_conflicts(inst, colors), distinct_colors(colors))
}


/**
set of vertices supporting O(1) insertion, removal and uniform sampling.
(used to pick a random conflicting vertex)
*/
#[derive(Debug, Clone)]
pub struct VertexSet {
    /// elements of the set (unordered)
    elements: Vec<VertexId>,
    /// positions[v]: index of v in elements (if present)
    positions: Vec<Option<usize>>,
}

impl VertexSet {
    /// empty set over n vertices
    pub fn new(n:usize) -> Self {
        Self { elements: Vec::new(), positions: vec![None ; n] }
    }

    /// number of vertices in the set
    pub fn len(&self) -> usize { self.elements.len() }

    /// true iff the set is empty
    pub fn is_empty(&self) -> bool { self.elements.is_empty() }

    /// true iff v is in the set
    pub fn contains(&self, v:VertexId) -> bool { self.positions[v].is_some() }

    /// inserts v (no-op if already present)
    pub fn insert(&mut self, v:VertexId) {
        if self.positions[v].is_none() {
            self.positions[v] = Some(self.elements.len());
            self.elements.push(v);
        }
    }

    /// removes v (no-op if absent)
    pub fn remove(&mut self, v:VertexId) {
        if let Some(pos) = self.positions[v].take() {
            let last = self.elements.len() - 1;
            self.elements.swap(pos, last);
            self.elements.pop();
            if pos < last {
                let moved = self.elements[pos];
                self.positions[moved] = Some(pos);
            }
        }
    }

    /// uniformly random element
    pub fn choose<R:Rng>(&self, rng:&mut R) -> Option<VertexId> {
        if self.elements.is_empty() { return None; }
        Some(self.elements[rng.gen_range(0..self.elements.len())])
    }
}
