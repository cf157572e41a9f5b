use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate, validate_start};
use crate::error::ColoringError;
use crate::search::backtracking::color_with_k;

/// adjacency map used by the deletion-contraction recurrence
pub type Adjacency = BTreeMap<VertexId, BTreeSet<VertexId>>;

/** chromatic polynomial P(G,x): number of proper colorings of G using x colors.
Coefficients are ordered from the highest degree to the constant term.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromaticPolynomial {
    /// number of vertices of the graph
    nb_vertices: usize,
    /// coefficients (highest degree first)
    coefficients: Vec<i64>,
}

impl ChromaticPolynomial {
    /** computes the polynomial of a graph given as an adjacency map.
    Returns the zero polynomial if the graph contains a self-loop.
    exponential time: intended for small graphs.
    */
    pub fn from_adjacency(adj:&Adjacency) -> Self {
        Self { nb_vertices: adj.len(), coefficients: deletion_contraction(adj) }
    }

    /// coefficients (highest degree first)
    pub fn coefficients(&self) -> &[i64] { &self.coefficients }

    /// degree of the polynomial
    pub fn degree(&self) -> usize { self.coefficients.len() - 1 }

    /// evaluates P(x) (Horner's method)
    pub fn evaluate(&self, x:i64) -> i128 {
        self.coefficients.iter().fold(0i128, |acc, c| acc * (x as i128) + (*c as i128))
    }

    /**
    smallest positive x such that P(x) > 0, scanning x = 1..=bound.
    The graph without vertices has chromatic number 0.
    */
    pub fn chromatic_number(&self, bound:usize) -> Result<usize, ColoringError> {
        if self.nb_vertices == 0 { return Ok(0); }
        (1..=bound)
            .find(|x| self.evaluate(*x as i64) > 0)
            .ok_or(ColoringError::Undetermined { bound })
    }
}

impl fmt::Display for ChromaticPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.degree();
        let mut first = true;
        for (i,c) in self.coefficients.iter().enumerate() {
            if *c == 0 { continue; }
            let power = d - i;
            let sign = if *c < 0 { "-" } else { "+" };
            if first {
                if *c < 0 { write!(f, "-")?; }
            } else {
                write!(f, " {} ", sign)?;
            }
            let a = c.abs();
            match (a, power) {
                (_, 0) => write!(f, "{}", a)?,
                (1, 1) => write!(f, "x")?,
                (1, p) => write!(f, "x^{}", p)?,
                (_, 1) => write!(f, "{}x", a)?,
                (_, p) => write!(f, "{}x^{}", a, p)?,
            }
            first = false;
        }
        if first { write!(f, "0")?; }
        Ok(())
    }
}

/// adjacency map of an instance
pub fn adjacency_of(inst:&dyn ColoringInstance) -> Adjacency {
    inst.vertices().map(|u| (u, inst.neighbors(u).iter().copied().collect())).collect()
}

/// P(G,x) = P(G-e,x) - P(G/e,x)
fn deletion_contraction(adj:&Adjacency) -> Vec<i64> {
    if adj.iter().any(|(u,neighbors)| neighbors.contains(u)) {
        return vec![0];
    }
    let edge = adj.iter().find_map(|(u,neighbors)| neighbors.iter().next().map(|v| (*u, *v)));
    let (u,v) = match edge {
        None => { // no edges: x^n
            let mut res = vec![0 ; adj.len()+1];
            res[0] = 1;
            return res;
        },
        Some(e) => e,
    };
    let mut deleted = adj.clone();
    if let Some(neighbors) = deleted.get_mut(&u) { neighbors.remove(&v); }
    if let Some(neighbors) = deleted.get_mut(&v) { neighbors.remove(&u); }
    let coeffs_deleted = deletion_contraction(&deleted);
    let coeffs_contracted = deletion_contraction(&contract_edge(adj, u, v));
    // left-pad to align the degrees
    let len = std::cmp::max(coeffs_deleted.len(), coeffs_contracted.len());
    let pad = |coeffs:Vec<i64>| -> Vec<i64> {
        let mut res = vec![0 ; len - coeffs.len()];
        res.extend(coeffs);
        res
    };
    pad(coeffs_deleted).iter().zip(pad(coeffs_contracted).iter())
        .map(|(d,c)| d - c)
        .collect()
}

/** merges v into u: u gets the union of both neighborhoods and every
reference to v is rewritten to u (self-loops and duplicates removed). */
pub fn contract_edge(adj:&Adjacency, u:VertexId, v:VertexId) -> Adjacency {
    let mut res:Adjacency = adj.iter()
        .filter(|(w,_)| **w != v)
        .map(|(w,neighbors)| {
            let rewritten = neighbors.iter()
                .map(|x| if *x == v { u } else { *x })
                .filter(|x| x != w)
                .collect();
            (*w, rewritten)
        })
        .collect();
    if let Some(v_neighbors) = adj.get(&v) {
        let u_neighbors = res.entry(u).or_default();
        u_neighbors.extend(v_neighbors.iter().filter(|x| **x != u && **x != v));
    }
    res
}

/** chromatic polynomial of an instance (fails on self-loops) */
pub fn chromatic_polynomial(inst:&dyn ColoringInstance) -> Result<ChromaticPolynomial, ColoringError> {
    validate(inst)?;
    Ok(ChromaticPolynomial::from_adjacency(&adjacency_of(inst)))
}

/**
computes the chromatic number from the chromatic polynomial (scanning x up to bound,
defaults to the number of vertices), then builds a coloring using that many colors.
Pinned vertices are not supported.
*/
pub fn polynomial_coloring(
    inst:&dyn ColoringInstance,
    start:Coloring,
    bound:Option<usize>,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    if start.nb_pinned() > 0 {
        return Err(ColoringError::invalid_parameter(
            "the chromatic polynomial does not support pinned vertices"
        ));
    }
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let polynomial = chromatic_polynomial(inst)?;
    log::debug!("chromatic polynomial: {}", polynomial);
    let chi = polynomial.chromatic_number(bound.unwrap_or_else(|| inst.nb_vertices()))?;
    let coloring = color_with_k(inst, &start, chi)?.ok_or_else(|| ColoringError::invalid_parameter(
        format!("no coloring with {} colors", chi)
    ))?;
    tracer.record(coloring.as_slice());
    Ok(AlgorithmResult::new(coloring, Some(chi), start_time, tracer.finish()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_triangle() {
        let p = chromatic_polynomial(&Graph::complete(3)).unwrap();
        assert_eq!(p.coefficients(), &[1, -3, 2, 0]);
        assert_eq!(p.evaluate(3), 6);
        assert_eq!(p.evaluate(2), 0);
        assert_eq!(p.chromatic_number(10), Ok(3));
        assert_eq!(p.chromatic_number(2), Err(ColoringError::Undetermined { bound: 2 }));
        assert_eq!(p.to_string(), "x^3 - 3x^2 + 2x");
    }

    #[test]
    fn test_cycle_and_path() {
        // C_4: (x-1)^4 + (x-1)
        let p = chromatic_polynomial(&Graph::cycle(4)).unwrap();
        assert_eq!(p.coefficients(), &[1, -4, 6, -3, 0]);
        // trees: x(x-1)^(n-1)
        let p = chromatic_polynomial(&Graph::path(4)).unwrap();
        assert_eq!(p.coefficients(), &[1, -3, 3, -1, 0]);
        assert_eq!(p.chromatic_number(4), Ok(2));
    }

    #[test]
    fn test_base_cases() {
        let p = chromatic_polynomial(&Graph::new(vec![vec![] ; 3])).unwrap();
        assert_eq!(p.coefficients(), &[1, 0, 0, 0]);
        assert_eq!(p.chromatic_number(3), Ok(1));
        let p = chromatic_polynomial(&Graph::new(vec![])).unwrap();
        assert_eq!(p.coefficients(), &[1]);
        assert_eq!(p.chromatic_number(0), Ok(0));
        let mut adj = Adjacency::new();
        adj.insert(0, vec![0, 1].into_iter().collect());
        adj.insert(1, vec![0].into_iter().collect());
        assert_eq!(ChromaticPolynomial::from_adjacency(&adj).coefficients(), &[0]);
        assert!(chromatic_polynomial(&Graph::new(vec![vec![0]])).is_err());
    }

    #[test]
    fn test_contract_edge() {
        // triangle 0-1-2: contracting (0,1) gives the edge 0-2
        let adj = adjacency_of(&Graph::complete(3));
        let contracted = contract_edge(&adj, 0, 1);
        assert_eq!(contracted.len(), 2);
        assert_eq!(contracted[&0], vec![2].into_iter().collect());
        assert_eq!(contracted[&2], vec![0].into_iter().collect());
    }

    #[test]
    fn test_polynomial_coloring() {
        let inst = Graph::cycle(5);
        let res = polynomial_coloring(&inst, Coloring::new(5), None, true).unwrap();
        assert_eq!(res.chromatic_number, Some(3));
        assert_eq!(res.k, 3);
        assert!(res.coloring.is_proper(&inst));
        assert_eq!(res.steps.unwrap().len(), 1);
        let pinned = Coloring::with_pins(5, vec![(0, 1)]).unwrap();
        assert!(matches!(
            polynomial_coloring(&inst, pinned, None, false),
            Err(ColoringError::InvalidParameter(_))
        ));
        assert!(matches!(
            polynomial_coloring(&inst, Coloring::new(5), Some(2), false),
            Err(ColoringError::Undetermined { bound: 2 })
        ));
    }
}
