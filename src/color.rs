use std::time::Instant;

use bit_set::BitSet;
use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

use crate::error::ColoringError;

/** Vertex Id */
pub type VertexId = usize;

/** Solution of a graph coloring problem
(represented as a partition, res[i]: vertices using color i+1).
*/
pub type Solution = Vec<Vec<VertexId>>;

/** models a graph coloring instance (undirected, vertices are 0..n-1) */
pub trait ColoringInstance: std::fmt::Debug {
    /// number of vertices
    fn nb_vertices(&self) -> usize;

    /// list of vertices adjacent to u
    fn neighbors(&self, u:VertexId) -> &[VertexId];

    /// degree of vertex u
    fn degree(&self, u:VertexId) -> usize { self.neighbors(u).len() }

    /// returns true if u and v are adjacent
    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool;

    /// edge list (u < v)
    fn edges(&self) -> &[(VertexId, VertexId)];

    /// number of edges
    fn nb_edges(&self) -> usize { self.edges().len() }

    /// vertex iterator
    fn vertices(&self) -> std::ops::Range<VertexId> { 0..self.nb_vertices() }

    /// maximum degree Δ (0 on the empty graph)
    fn max_degree(&self) -> usize {
        self.vertices().map(|u| self.degree(u)).max().unwrap_or(0)
    }

    /// logs some statistics of the instance
    fn display_statistics(&self) {
        log::info!("\t{} \t vertices", self.nb_vertices());
        log::info!("\t{} \t edges", self.nb_edges());
        let min_degree = self.vertices().map(|u| self.degree(u)).min().unwrap_or(0);
        log::info!("\t{} \t min degree", min_degree);
        log::info!("\t{} \t max degree", self.max_degree());
    }
}

/**
checks that no vertex is adjacent to itself.
*/
pub fn validate(inst:&dyn ColoringInstance) -> Result<(), ColoringError> {
    for u in inst.vertices() {
        if inst.neighbors(u).contains(&u) {
            return Err(ColoringError::InvalidGraph { vertex: u });
        }
    }
    Ok(())
}

/**
validates the graph and a starting coloring (size, pinned colors, conflicts between pins).
Only pinned vertices may be colored in a starting coloring.
Every algorithm calls this before running.
*/
pub fn validate_start(inst:&dyn ColoringInstance, start:&Coloring) -> Result<(), ColoringError> {
    validate(inst)?;
    if start.nb_vertices() != inst.nb_vertices() {
        return Err(ColoringError::invalid_parameter(format!(
            "starting coloring has {} vertices, graph has {}",
            start.nb_vertices(), inst.nb_vertices()
        )));
    }
    if let Some(u) = inst.vertices().find(|u| start.is_colored(*u) && !start.is_pinned(*u)) {
        return Err(ColoringError::invalid_parameter(
            format!("vertex {} is colored but not pinned in the starting coloring", u)
        ));
    }
    for u in start.pinned_vertices() {
        match start.get(u) {
            None | Some(0) => return Err(ColoringError::invalid_parameter(
                format!("pinned vertex {} has no positive color", u)
            )),
            Some(c) => {
                if let Some(v) = inst.neighbors(u).iter().find(|v| start.is_pinned(**v) && start.get(**v) == Some(c)) {
                    return Err(ColoringError::invalid_parameter(
                        format!("pinned vertices {} and {} are adjacent and share color {}", u, v, c)
                    ));
                }
            }
        }
    }
    Ok(())
}


/**
Partial vertex coloring (colors are positive integers).
A subset of vertices may be pinned: their color is fixed before the run
and is never changed afterwards.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    /// colors[v]: color assigned to vertex v (if any)
    colors: Vec<Option<usize>>,
    /// pinned vertices
    pinned: BitSet,
}

impl Coloring {
    /// empty coloring of n vertices
    pub fn new(n:usize) -> Self {
        Self { colors: vec![None ; n], pinned: BitSet::default() }
    }

    /** coloring of n vertices where each (v,c) of pins is fixed.
    fails if a vertex is out of range, pinned twice with different colors, or if c = 0.
    */
    pub fn with_pins<I>(n:usize, pins:I) -> Result<Self, ColoringError>
    where I: IntoIterator<Item=(VertexId, usize)> {
        let mut res = Self::new(n);
        for (v,c) in pins {
            if v >= n {
                return Err(ColoringError::invalid_parameter(
                    format!("pinned vertex {} out of range (n={})", v, n)
                ));
            }
            if c == 0 {
                return Err(ColoringError::invalid_parameter(
                    format!("pinned vertex {}: colors start at 1", v)
                ));
            }
            if res.pinned.contains(v) && res.colors[v] != Some(c) {
                return Err(ColoringError::invalid_parameter(
                    format!("vertex {} pinned twice with different colors", v)
                ));
            }
            res.colors[v] = Some(c);
            res.pinned.insert(v);
        }
        Ok(res)
    }

    /// builds a (non-pinned) coloring from a color vector
    pub fn from_colors(colors:Vec<Option<usize>>) -> Self {
        Self { colors, pinned: BitSet::default() }
    }

    /// number of vertices
    pub fn nb_vertices(&self) -> usize { self.colors.len() }

    /// color of vertex v
    pub fn get(&self, v:VertexId) -> Option<usize> { self.colors[v] }

    /// colors as a slice (colors[v]: color of v)
    pub fn as_slice(&self) -> &[Option<usize>] { &self.colors }

    /// true iff v is pinned
    pub fn is_pinned(&self, v:VertexId) -> bool { self.pinned.contains(v) }

    /// pinned vertices
    pub fn pinned_vertices(&self) -> impl Iterator<Item=VertexId> + '_ { self.pinned.iter() }

    /// number of pinned vertices
    pub fn nb_pinned(&self) -> usize { self.pinned.len() }

    /// highest pinned color (0 if nothing is pinned)
    pub fn max_pinned_color(&self) -> usize {
        self.pinned.iter().filter_map(|v| self.colors[v]).max().unwrap_or(0)
    }

    /** assigns color c to v. Pinned vertices keep their color (returns false). */
    pub fn assign(&mut self, v:VertexId, c:usize) -> bool {
        debug_assert!(c > 0, "colors start at 1");
        if self.pinned.contains(v) { return false; }
        self.colors[v] = Some(c);
        true
    }

    /** removes the color of v (no-op on pinned vertices). */
    pub fn unassign(&mut self, v:VertexId) -> bool {
        if self.pinned.contains(v) { return false; }
        self.colors[v] = None;
        true
    }

    /// true iff v is colored
    pub fn is_colored(&self, v:VertexId) -> bool { self.colors[v].is_some() }

    /// number of colored vertices
    pub fn nb_colored(&self) -> usize { self.colors.iter().filter(|c| c.is_some()).count() }

    /// true iff every vertex is colored
    pub fn is_complete(&self) -> bool { self.colors.iter().all(|c| c.is_some()) }

    /// highest color used (0 if nothing is colored)
    pub fn max_color(&self) -> usize { self.colors.iter().filter_map(|c| *c).max().unwrap_or(0) }

    /// number of distinct colors used
    pub fn nb_colors(&self) -> usize {
        let used:BitSet = self.colors.iter().filter_map(|c| *c).collect();
        used.len()
    }

    /// true iff color c can be given to u without conflicting with a colored neighbor
    pub fn is_safe(&self, inst:&dyn ColoringInstance, u:VertexId, c:usize) -> bool {
        inst.neighbors(u).iter().all(|v| self.colors[*v] != Some(c))
    }

    /// smallest color not used by a colored neighbor of u
    pub fn smallest_free_color(&self, inst:&dyn ColoringInstance, u:VertexId) -> usize {
        let used:BitSet = inst.neighbors(u).iter().filter_map(|v| self.colors[*v]).collect();
        (1..).find(|c| !used.contains(*c)).unwrap_or(1)
    }

    /// number of edges whose two endpoints share a color
    pub fn nb_conflicts(&self, inst:&dyn ColoringInstance) -> usize {
        inst.edges().iter()
            .filter(|(u,v)| self.colors[*u].is_some() && self.colors[*u] == self.colors[*v])
            .count()
    }

    /// true iff no two adjacent vertices share a color
    pub fn is_proper(&self, inst:&dyn ColoringInstance) -> bool { self.nb_conflicts(inst) == 0 }

    /// partition view (res[i]: vertices with color i+1), uncolored vertices are ignored
    pub fn to_solution(&self) -> Solution {
        let mut res = vec![vec![] ; self.max_color()];
        for (v,c) in self.colors.iter().enumerate() {
            if let Some(c) = c { res[c-1].push(v); }
        }
        res
    }
}

impl Serialize for Coloring {
    /// serializes as a map vertex -> color (uncolored vertices are omitted)
    fn serialize<S: Serializer>(&self, serializer:S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nb_colored()))?;
        for (v,c) in self.colors.iter().enumerate() {
            if let Some(c) = c { map.serialize_entry(&v, c)?; }
        }
        map.end()
    }
}


/** sequence of coloring snapshots (only recorded on demand) */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepTrace {
    /// steps[i]: i-th snapshot (steps[i][v]: color of v)
    steps: Vec<Vec<Option<usize>>>,
}

impl StepTrace {
    /// appends a snapshot
    pub fn push(&mut self, colors:&[Option<usize>]) { self.steps.push(colors.to_vec()); }

    /// number of snapshots
    pub fn len(&self) -> usize { self.steps.len() }

    /// true iff no snapshot has been recorded
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// snapshots
    pub fn steps(&self) -> &[Vec<Option<usize>>] { &self.steps }

    /// last snapshot
    pub fn last(&self) -> Option<&Vec<Option<usize>>> { self.steps.last() }
}

/** records a step trace only if requested */
#[derive(Debug)]
pub(crate) struct Tracer {
    trace: Option<StepTrace>,
}

impl Tracer {
    pub fn new(enabled:bool) -> Self {
        Self { trace: if enabled { Some(StepTrace::default()) } else { None } }
    }

    pub fn is_enabled(&self) -> bool { self.trace.is_some() }

    pub fn record(&mut self, colors:&[Option<usize>]) {
        if let Some(trace) = &mut self.trace { trace.push(colors); }
    }

    pub fn finish(self) -> Option<StepTrace> { self.trace }
}


/** result of any coloring algorithm */
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmResult {
    /// final coloring
    pub coloring: Coloring,
    /// number of distinct colors used
    pub k: usize,
    /// proven chromatic number (only set by exact methods)
    pub chromatic_number: Option<usize>,
    /// elapsed time in seconds
    pub runtime: f64,
    /// coloring snapshots (if requested)
    pub steps: Option<StepTrace>,
}

impl AlgorithmResult {
    /// builds a result, measuring the time elapsed since start_time
    pub fn new(
        coloring:Coloring,
        chromatic_number:Option<usize>,
        start_time:Instant,
        steps:Option<StepTrace>,
    ) -> Self {
        let k = coloring.nb_colors();
        Self { coloring, k, chromatic_number, runtime: start_time.elapsed().as_secs_f64(), steps }
    }
}


/** checker result */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerResult {
    /// the coloring is complete and proper and uses the given number of colors
    Ok(usize),
    /// the vertex is not colored
    Incomplete(VertexId),
    /// the two adjacent vertices share a color
    Conflict(VertexId, VertexId),
}

/**
checks that a coloring is complete and proper.
returns the number of colors if it is.
*/
pub fn checker(inst:&dyn ColoringInstance, coloring:&Coloring) -> CheckerResult {
    if let Some(v) = inst.vertices().find(|v| !coloring.is_colored(*v)) {
        return CheckerResult::Incomplete(v);
    }
    for (u,v) in inst.edges() {
        if coloring.get(*u) == coloring.get(*v) {
            return CheckerResult::Conflict(*u, *v);
        }
    }
    CheckerResult::Ok(coloring.nb_colors())
}
