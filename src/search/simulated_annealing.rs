use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;
use crate::search::greedy::greedy_complete;
use crate::search::util::conflicts::{
    dense_colors, distinct_colors, local_conflicts_with, nb_conflicts, penalized_cost, VertexSet
};

/** Configuration of the simulated annealing.
Unset values are derived from the instance size n.
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaConfig {
    /// total number of iterations (default: 1000 n)
    pub max_iterations: Option<usize>,
    /// cooling constant c in T = T0 / (1 + iteration/c) (default: 100 n)
    pub cooling_constant: Option<f64>,
    /// stop after this many iterations without improving the best cost (default: max_iterations / 5)
    pub max_no_improvement: Option<usize>,
    /// initial temperature T0 (default: initial cost, 1 if it is 0)
    pub initial_temperature: Option<f64>,
}

impl SaConfig {
    /// sets the iteration budget
    pub fn with_max_iterations(mut self, n:usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// sets the cooling constant
    pub fn with_cooling_constant(mut self, c:f64) -> Self {
        self.cooling_constant = Some(c);
        self
    }

    /// sets the no-improvement threshold
    pub fn with_max_no_improvement(mut self, n:usize) -> Self {
        self.max_no_improvement = Some(n);
        self
    }

    /// sets the initial temperature
    pub fn with_initial_temperature(mut self, t:f64) -> Self {
        self.initial_temperature = Some(t);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ColoringError> {
        if let Some(c) = self.cooling_constant {
            if !(c.is_finite() && c > 0.) {
                return Err(ColoringError::invalid_parameter(
                    format!("cooling constant must be positive, got {}", c)
                ));
            }
        }
        if let Some(t) = self.initial_temperature {
            if !(t.is_finite() && t > 0.) {
                return Err(ColoringError::invalid_parameter(
                    format!("initial temperature must be positive, got {}", t)
                ));
            }
        }
        Ok(())
    }
}


/** outcome of a simulated annealing run */
#[derive(Debug, Clone, Serialize)]
pub struct SaOutcome {
    /// best coloring found
    pub result: AlgorithmResult,
    /// penalized cost of the best coloring
    pub best_cost: u64,
    /// number of iterations performed
    pub iterations: usize,
    /// number of accepted moves
    pub accepted_moves: usize,
    /// best cost sampled at regular intervals (first entry: initial cost)
    pub cost_history: Vec<u64>,
}


/** current state of the annealing (complete coloring and its bookkeeping) */
struct SaState {
    /// colors[v]: color of v
    colors: Vec<usize>,
    /// color_counts[c]: number of vertices using c
    color_counts: Vec<usize>,
    /// nb_conf[v]: number of neighbors of v sharing its color
    nb_conf: Vec<usize>,
    /// free vertices in conflict
    conflicting: VertexSet,
    /// number of conflicting edges
    conflicts: usize,
    /// number of distinct colors
    distinct: usize,
    /// highest color used
    max_color: usize,
}

impl SaState {
    fn new(inst:&dyn ColoringInstance, colors:Vec<usize>, free:&[bool]) -> Self {
        let n = inst.nb_vertices();
        let max_color = colors.iter().copied().max().unwrap_or(0);
        let mut color_counts = vec![0 ; max_color+2];
        for c in &colors { color_counts[*c] += 1; }
        let nb_conf:Vec<usize> = inst.vertices().map(|v| local_conflicts_with(inst, &colors, v, colors[v])).collect();
        let mut conflicting = VertexSet::new(n);
        for v in inst.vertices().filter(|v| free[*v] && nb_conf[*v] > 0) { conflicting.insert(v); }
        let conflicts = nb_conflicts(inst, &colors);
        let distinct = distinct_colors(&colors);
        Self { colors, color_counts, nb_conf, conflicting, conflicts, distinct, max_color }
    }

    fn cost(&self, n:usize) -> u64 { penalized_cost(n, self.conflicts, self.distinct) }

    /// (conflict variation, distinct color variation) if v is recolored with c
    fn delta(&self, inst:&dyn ColoringInstance, v:VertexId, c:usize) -> (i64, i64) {
        let old = self.colors[v];
        let after = local_conflicts_with(inst, &self.colors, v, c) as i64;
        let mut delta_distinct = 0;
        if self.color_counts[old] == 1 { delta_distinct -= 1; }
        if c >= self.color_counts.len() || self.color_counts[c] == 0 { delta_distinct += 1; }
        (after - self.nb_conf[v] as i64, delta_distinct)
    }

    fn recolor(&mut self, inst:&dyn ColoringInstance, v:VertexId, c:usize, free:&[bool]) {
        let old = self.colors[v];
        for u in inst.neighbors(v) {
            if self.colors[*u] == old {
                self.nb_conf[*u] -= 1;
                self.conflicts -= 1;
            } else if self.colors[*u] == c {
                self.nb_conf[*u] += 1;
                self.conflicts += 1;
            } else { continue; }
            if free[*u] {
                if self.nb_conf[*u] > 0 { self.conflicting.insert(*u); } else { self.conflicting.remove(*u); }
            }
        }
        self.colors[v] = c;
        self.nb_conf[v] = local_conflicts_with(inst, &self.colors, v, c);
        if self.nb_conf[v] > 0 { self.conflicting.insert(v); } else { self.conflicting.remove(v); }
        // color counts
        self.color_counts[old] -= 1;
        if self.color_counts[old] == 0 { self.distinct -= 1; }
        if c >= self.color_counts.len() { self.color_counts.resize(c+2, 0); }
        if self.color_counts[c] == 0 { self.distinct += 1; }
        self.color_counts[c] += 1;
        if c > self.max_color { self.max_color = c; }
        while self.max_color > 0 && self.color_counts[self.max_color] == 0 { self.max_color -= 1; }
    }
}


/**
simulated annealing minimizing (n+1).conflicts + (distinct colors - 1).

Starts from a greedy coloring (input order, pinned vertices kept).
At each iteration, a free vertex is picked (among the conflicting ones if any)
and a new color is proposed uniformly in [1, max+1] minus its current color.
Improving moves are accepted, other moves with probability exp(-delta/T).
Returns the best coloring observed and the run statistics.
*/
pub fn simulated_annealing_run<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&SaConfig,
    rng:&mut R,
    record_steps:bool,
) -> Result<SaOutcome, ColoringError> {
    validate_start(inst, &start)?;
    config.validate()?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let n = inst.nb_vertices();
    let mut initial = start.clone();
    let order:Vec<VertexId> = inst.vertices().collect();
    greedy_complete(inst, &mut initial, &order, &mut Tracer::new(false));
    tracer.record(initial.as_slice());
    let free:Vec<bool> = inst.vertices().map(|v| !start.is_pinned(v)).collect();
    let free_vertices:Vec<VertexId> = inst.vertices().filter(|v| free[*v]).collect();
    let mut state = SaState::new(inst, dense_colors(&initial)?, &free);
    let mut current_cost = state.cost(n);
    let mut best_colors = state.colors.clone();
    let mut best_cost = current_cost;
    // parameters
    let max_iterations = config.max_iterations.unwrap_or(1000*n);
    let cooling_constant = config.cooling_constant.unwrap_or(100. * n as f64);
    let max_no_improvement = config.max_no_improvement.unwrap_or(max_iterations / 5);
    let t0 = config.initial_temperature.unwrap_or(if current_cost > 0 { current_cost as f64 } else { 1. });
    let history_interval = std::cmp::max(100, n);
    let mut cost_history = vec![best_cost];
    let mut no_improvement:usize = 0;
    let mut accepted_moves:usize = 0;
    let mut iterations:usize = 0;
    if !free_vertices.is_empty() {
        while iterations < max_iterations {
            let temperature = t0 / (1. + iterations as f64 / cooling_constant);
            let v = match state.conflicting.choose(rng) {
                Some(v) => v,
                None => free_vertices[rng.gen_range(0..free_vertices.len())],
            };
            let old_color = state.colors[v];
            let mut new_color = rng.gen_range(1..=state.max_color);
            if new_color >= old_color { new_color += 1; }
            let (delta_conflicts, delta_distinct) = state.delta(inst, v, new_color);
            let delta = (n as i64 + 1) * delta_conflicts + delta_distinct;
            if delta <= 0 || rng.gen::<f64>() < (-(delta as f64) / temperature).exp() {
                state.recolor(inst, v, new_color, &free);
                accepted_moves += 1;
                current_cost = state.cost(n);
                if tracer.is_enabled() {
                    tracer.record(&state.colors.iter().map(|c| Some(*c)).collect::<Vec<_>>());
                }
            }
            iterations += 1;
            if current_cost < best_cost {
                best_cost = current_cost;
                best_colors.clone_from(&state.colors);
                no_improvement = 0;
            } else {
                no_improvement += 1;
            }
            if iterations % history_interval == 0 { cost_history.push(best_cost); }
            if no_improvement > max_no_improvement {
                log::debug!("simulated annealing: no improvement for {} iterations", no_improvement);
                break;
            }
        }
    }
    if cost_history.last() != Some(&best_cost) { cost_history.push(best_cost); }
    let mut coloring = start;
    for v in &free_vertices { coloring.assign(*v, best_colors[*v]); }
    log::debug!("simulated annealing: best cost {} after {} iterations", best_cost, iterations);
    Ok(SaOutcome {
        result: AlgorithmResult::new(coloring, None, start_time, tracer.finish()),
        best_cost,
        iterations,
        accepted_moves,
        cost_history,
    })
}

/** simulated annealing (see simulated_annealing_run) */
pub fn simulated_annealing<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&SaConfig,
    rng:&mut R,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    Ok(simulated_annealing_run(inst, start, config, rng, record_steps)?.result)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;
    use crate::search::util::conflicts::coloring_cost;

    #[test]
    fn test_default_config() {
        assert!(SaConfig::default().validate().is_ok());
        assert!(SaConfig::default().with_cooling_constant(0.).validate().is_err());
        assert!(SaConfig::default().with_initial_temperature(-1.).validate().is_err());
    }

    #[test]
    fn test_sa_crown() {
        // input-order greedy uses 3 colors on this bipartite graph
        let inst = Graph::from_edges(6, &[(0,3), (0,5), (2,1), (2,5), (4,1), (4,3)]);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = simulated_annealing_run(&inst, Coloring::new(6), &SaConfig::default(), &mut rng, false).unwrap();
        assert!(matches!(checker(&inst, &outcome.result.coloring), CheckerResult::Ok(k) if k <= 3));
        assert!(outcome.cost_history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(outcome.cost_history[0], 2);
        let colors = dense_colors(&outcome.result.coloring).unwrap();
        assert_eq!(coloring_cost(&inst, &colors), outcome.best_cost);
    }

    #[test]
    fn test_sa_petersen() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let config = SaConfig::default().with_max_iterations(2000);
        let outcome = simulated_annealing_run(&inst, Coloring::new(10), &config, &mut rng, true).unwrap();
        assert!(outcome.iterations <= 2000);
        assert!(outcome.result.coloring.is_proper(&inst));
        assert!(!outcome.result.steps.unwrap().is_empty());
    }

    #[test]
    fn test_sa_pins_and_seed() {
        let inst = Graph::cycle(6);
        let start = Coloring::with_pins(6, vec![(0, 3), (3, 1)]).unwrap();
        let config = SaConfig::default().with_max_iterations(500);
        let run = |seed:u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            simulated_annealing(&inst, start.clone(), &config, &mut rng, false).unwrap()
        };
        let res = run(3);
        assert_eq!(res.coloring.get(0), Some(3));
        assert_eq!(res.coloring.get(3), Some(1));
        assert!(res.coloring.is_proper(&inst));
        assert_eq!(res.coloring, run(3).coloring);
    }

    #[test]
    fn test_sa_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let res = simulated_annealing(&Graph::new(vec![]), Coloring::new(0), &SaConfig::default(), &mut rng, false).unwrap();
        assert_eq!(res.k, 0);
    }
}
