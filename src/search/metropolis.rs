use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;
use crate::search::greedy::greedy_complete;

/** Configuration of the Metropolis (Glauber dynamics) sampler */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetropolisConfig {
    /// palette size q, must be greater than 4 times the maximum degree (default: 4 max degree + 1)
    pub q: Option<usize>,
    /// number of single-site steps (default: ceil(q n ln(2n) / (q - 4 max degree)))
    pub iterations: Option<usize>,
}

impl MetropolisConfig {
    /// sets the palette size
    pub fn with_q(mut self, q:usize) -> Self {
        self.q = Some(q);
        self
    }

    /// sets the number of steps
    pub fn with_iterations(mut self, n:usize) -> Self {
        self.iterations = Some(n);
        self
    }

    /// checks the palette against the instance (q > 4 max degree, q >= highest pinned color)
    pub fn validate(&self, inst:&dyn ColoringInstance, start:&Coloring) -> Result<usize, ColoringError> {
        let delta = inst.max_degree();
        let q = self.q.unwrap_or(4*delta + 1);
        if q <= 4*delta {
            return Err(ColoringError::invalid_parameter(
                format!("metropolis requires q > 4 max degree (q={}, max degree={})", q, delta)
            ));
        }
        if q < start.max_pinned_color() {
            return Err(ColoringError::invalid_parameter(
                format!("q={} is smaller than the highest pinned color {}", q, start.max_pinned_color())
            ));
        }
        Ok(q)
    }
}

/// mixing time bound ceil(q n ln(2n) / (q - 4 max degree)), requires q > 4 max degree
pub fn mixing_steps(q:usize, n:usize, max_degree:usize) -> usize {
    if n == 0 { return 0; }
    let num = (q * n) as f64 * ((2 * n) as f64).ln();
    (num / (q - 4*max_degree) as f64).ceil() as usize
}

/**
Metropolis sampler (Glauber dynamics) over proper q-colorings.

Starts from a greedy coloring, then repeatedly picks a random vertex and a random
color in [1,q], and recolors the vertex if no neighbor holds that color.
Picking a pinned vertex leaves the coloring unchanged.
The coloring stays proper at every step. No chromatic number is reported.
*/
pub fn metropolis<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&MetropolisConfig,
    rng:&mut R,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    validate_start(inst, &start)?;
    let q = config.validate(inst, &start)?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let n = inst.nb_vertices();
    let mut coloring = start;
    let order:Vec<VertexId> = inst.vertices().collect();
    greedy_complete(inst, &mut coloring, &order, &mut Tracer::new(false));
    tracer.record(coloring.as_slice());
    if n > 0 {
        let nb_steps = config.iterations.unwrap_or_else(|| mixing_steps(q, n, inst.max_degree()));
        log::debug!("metropolis: q={}, {} steps", q, nb_steps);
        for _ in 0..nb_steps {
            let v = rng.gen_range(0..n);
            let c = rng.gen_range(1..=q);
            if !coloring.is_pinned(v) && coloring.is_safe(inst, v, c) {
                coloring.assign(v, c);
            }
            tracer.record(coloring.as_slice());
        }
    }
    Ok(AlgorithmResult::new(coloring, None, start_time, tracer.finish()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_mixing_steps() {
        // q=9, n=4, max degree 2: ceil(36 ln 8)
        assert_eq!(mixing_steps(9, 4, 2), 75);
        assert_eq!(mixing_steps(5, 0, 1), 0);
    }

    #[test]
    fn test_metropolis_petersen() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let res = metropolis(&inst, Coloring::new(10), &MetropolisConfig::default(), &mut rng, true).unwrap();
        assert!(matches!(checker(&inst, &res.coloring), CheckerResult::Ok(k) if k <= 13));
        assert_eq!(res.chromatic_number, None);
        let steps = res.steps.unwrap();
        assert_eq!(steps.len(), 1 + mixing_steps(13, 10, 3));
    }

    #[test]
    fn test_metropolis_bad_q() {
        let inst = Graph::cycle(5);
        let mut rng = StdRng::seed_from_u64(0);
        let config = MetropolisConfig::default().with_q(8);
        assert!(matches!(
            metropolis(&inst, Coloring::new(5), &config, &mut rng, false),
            Err(ColoringError::InvalidParameter(_))
        ));
        let start = Coloring::with_pins(5, vec![(0, 12)]).unwrap();
        assert!(metropolis(&inst, start, &MetropolisConfig::default(), &mut rng, false).is_err());
    }

    #[test]
    fn test_metropolis_pins() {
        let inst = Graph::cycle(6);
        let start = Coloring::with_pins(6, vec![(2, 7)]).unwrap();
        let config = MetropolisConfig::default().with_iterations(500);
        let mut rng = StdRng::seed_from_u64(11);
        let res = metropolis(&inst, start, &config, &mut rng, false).unwrap();
        assert_eq!(res.coloring.get(2), Some(7));
        assert!(res.coloring.is_proper(&inst));
    }

    #[test]
    fn test_metropolis_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let res = metropolis(&Graph::new(vec![]), Coloring::new(0), &MetropolisConfig::default(), &mut rng, false).unwrap();
        assert_eq!(res.k, 0);
    }
}
