use std::cmp::max;
use std::time::Instant;

use ordered_float::OrderedFloat;
use rand::Rng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::color::{AlgorithmResult, Coloring, ColoringInstance, Tracer, VertexId, validate_start};
use crate::error::ColoringError;
use crate::search::greedy_dsatur::greedy_dsatur;
use crate::search::util::conflicts::{
    coloring_cost, dense_colors, local_conflicts, local_conflicts_with, VertexSet
};

/** Configuration for the genetic algorithm.

```
use kcolor::search::genetic::GaConfig;

let config = GaConfig::default()
    .with_population_size(30)
    .with_max_generations(20)
    .with_mutation_rate(0.1);
assert!(config.validate().is_ok());
```
*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// palette size (default: max degree + 1). Raised to the highest pinned color.
    pub q: Option<usize>,
    /// number of individuals
    pub population_size: usize,
    /// number of generations
    pub max_generations: usize,
    /// probability of applying crossover to a pair of parents
    pub crossover_rate: f64,
    /// probability of repairing a conflicting vertex of an offspring
    pub mutation_rate: f64,
    /// number of individuals taking part in a tournament
    pub tournament_size: usize,
    /// fraction of the initial population seeded from DSATUR
    pub heuristic_ratio: f64,
    /// probability of recoloring a vertex of a DSATUR seed
    pub perturbation_rate: f64,
    /// hill-climbing iterations applied to each offspring (0: disabled)
    pub local_search_iterations: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            q: None,
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.05,
            tournament_size: 3,
            heuristic_ratio: 0.2,
            perturbation_rate: 0.1,
            local_search_iterations: 0,
        }
    }
}

impl GaConfig {
    /// Sets the palette size.
    pub fn with_q(mut self, q:usize) -> Self {
        self.q = Some(q);
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n:usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n:usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate:f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate:f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k:usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the number of hill-climbing iterations per offspring.
    pub fn with_local_search_iterations(mut self, n:usize) -> Self {
        self.local_search_iterations = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ColoringError> {
        let rates = [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("heuristic_ratio", self.heuristic_ratio),
            ("perturbation_rate", self.perturbation_rate),
        ];
        for (name, rate) in rates.iter() {
            if !(0. ..=1.).contains(rate) {
                return Err(ColoringError::invalid_parameter(
                    format!("{} must be in [0,1], got {}", name, rate)
                ));
            }
        }
        if self.population_size == 0 {
            return Err(ColoringError::invalid_parameter("population_size must be positive"));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ColoringError::invalid_parameter(format!(
                "tournament_size must be in [1,{}], got {}", self.population_size, self.tournament_size
            )));
        }
        if self.q == Some(0) {
            return Err(ColoringError::invalid_parameter("q must be positive"));
        }
        Ok(())
    }
}


/** outcome of a genetic algorithm run */
#[derive(Debug, Clone, Serialize)]
pub struct GaOutcome {
    /// best individual found
    pub result: AlgorithmResult,
    /// penalized cost of the best individual
    pub best_cost: u64,
    /// palette size used
    pub q: usize,
    /// best cost after the initialization and after each generation
    pub cost_history: Vec<u64>,
}


/** complete coloring and its penalized cost */
#[derive(Debug, Clone)]
struct Individual {
    colors: Vec<usize>,
    cost: u64,
}

impl Individual {
    fn new(inst:&dyn ColoringInstance, colors:Vec<usize>) -> Self {
        let cost = coloring_cost(inst, &colors);
        Self { colors, cost }
    }

    fn fitness(&self) -> OrderedFloat<f64> { OrderedFloat(1. / (1. + self.cost as f64)) }
}


/** local conflicts of a child and its conflicting free vertices, updated move by move */
#[derive(Debug)]
struct ConflictTracker {
    /// nb_conf[v]: number of neighbors of v sharing its color
    nb_conf: Vec<usize>,
    /// free vertices in conflict
    conflicting: VertexSet,
    /// free[v]: true iff v is not pinned
    free: Vec<bool>,
}

impl ConflictTracker {
    fn new(inst:&dyn ColoringInstance, colors:&[usize], free_vertices:&[VertexId]) -> Self {
        let n = inst.nb_vertices();
        let nb_conf:Vec<usize> = inst.vertices().map(|v| local_conflicts(inst, colors, v)).collect();
        let mut free = vec![false ; n];
        let mut conflicting = VertexSet::new(n);
        for v in free_vertices {
            free[*v] = true;
            if nb_conf[*v] > 0 { conflicting.insert(*v); }
        }
        Self { nb_conf, conflicting, free }
    }

    /// recolors v with c, updating v and its neighbors only
    fn recolor(&mut self, inst:&dyn ColoringInstance, colors:&mut [usize], v:VertexId, c:usize) {
        let old = colors[v];
        if old == c { return; }
        for u in inst.neighbors(v) {
            if colors[*u] == old {
                self.nb_conf[*u] -= 1;
                self.nb_conf[v] -= 1;
            } else if colors[*u] == c {
                self.nb_conf[*u] += 1;
                self.nb_conf[v] += 1;
            } else { continue; }
            self.update(*u);
        }
        colors[v] = c;
        self.update(v);
    }

    fn update(&mut self, u:VertexId) {
        if !self.free[u] { return; }
        if self.nb_conf[u] > 0 { self.conflicting.insert(u); } else { self.conflicting.remove(u); }
    }
}


/** state shared by the genetic operators */
struct Ga<'a, R:Rng> {
    inst: &'a dyn ColoringInstance,
    config: &'a GaConfig,
    rng: &'a mut R,
    /// palette size
    q: usize,
    /// vertices that are not pinned
    free_vertices: Vec<VertexId>,
}

impl<'a, R:Rng> Ga<'a, R> {
    /// DSATUR seed and its perturbations, then random individuals
    fn initial_population(&mut self, start:&Coloring) -> Result<Vec<Individual>, ColoringError> {
        let size = self.config.population_size;
        let mut population = Vec::with_capacity(size);
        let heuristic_count = max(1, (self.config.heuristic_ratio * size as f64) as usize).min(size);
        let seed = dense_colors(&greedy_dsatur(self.inst, start.clone(), false)?.coloring)?;
        population.push(Individual::new(self.inst, seed.clone()));
        for _ in 1..heuristic_count {
            let mut colors = seed.clone();
            for v in &self.free_vertices {
                if self.rng.gen::<f64>() < self.config.perturbation_rate {
                    colors[*v] = self.rng.gen_range(1..=self.q);
                }
            }
            population.push(Individual::new(self.inst, colors));
        }
        while population.len() < size {
            let mut colors = seed.clone(); // pinned colors
            for v in &self.free_vertices {
                colors[*v] = self.rng.gen_range(1..=self.q);
            }
            population.push(Individual::new(self.inst, colors));
        }
        Ok(population)
    }

    /// tournament selection: best of tournament_size distinct individuals
    fn select<'p>(&mut self, population:&'p [Individual]) -> &'p Individual {
        let mut best:Option<&Individual> = None;
        for i in sample(&mut *self.rng, population.len(), self.config.tournament_size).iter() {
            let candidate = &population[i];
            if best.map_or(true, |b| candidate.fitness() > b.fitness()) {
                best = Some(candidate);
            }
        }
        best.unwrap_or(&population[0])
    }

    /// per vertex: common color, or the color with fewer local conflicts in its parent
    fn informed_crossover(&mut self, p1:&Individual, p2:&Individual) -> Vec<usize> {
        let mut child = p1.colors.clone();
        for v in self.inst.vertices() {
            let (c1, c2) = (p1.colors[v], p2.colors[v]);
            if c1 == c2 { continue; }
            let lc1 = local_conflicts(self.inst, &p1.colors, v);
            let lc2 = local_conflicts(self.inst, &p2.colors, v);
            child[v] = match lc1.cmp(&lc2) {
                std::cmp::Ordering::Less => c1,
                std::cmp::Ordering::Greater => c2,
                std::cmp::Ordering::Equal => if self.rng.gen::<bool>() { c1 } else { c2 },
            };
        }
        child
    }

    /// conflicting vertices may take the candidate color minimizing their conflicts
    fn mutate(&mut self, colors:&mut [usize]) {
        for i in 0..self.free_vertices.len() {
            let v = self.free_vertices[i];
            if local_conflicts(self.inst, colors, v) == 0 { continue; }
            if self.rng.gen::<f64>() >= self.config.mutation_rate { continue; }
            let mut candidates:Vec<usize> = self.inst.neighbors(v).iter().map(|u| colors[*u]).collect();
            candidates.push(self.rng.gen_range(1..=self.q));
            let mut best_color = colors[v];
            let mut best_local = local_conflicts(self.inst, colors, v);
            for c in candidates {
                let local = local_conflicts_with(self.inst, colors, v, c);
                if local < best_local {
                    best_local = local;
                    best_color = c;
                }
            }
            colors[v] = best_color;
        }
    }

    /// hill-climbing: moves a random conflicting vertex to its least conflicting color
    fn local_search(&mut self, colors:&mut [usize]) -> ConflictTracker {
        let mut tracker = ConflictTracker::new(self.inst, colors, &self.free_vertices);
        let mut neighbor_colors = vec![0 ; self.q+1];
        for _ in 0..self.config.local_search_iterations {
            let v = match tracker.conflicting.choose(&mut *self.rng) {
                None => break,
                Some(v) => v,
            };
            for u in self.inst.neighbors(v) {
                if colors[*u] <= self.q { neighbor_colors[colors[*u]] += 1; }
            }
            let mut best_color = colors[v];
            let mut best_local = tracker.nb_conf[v];
            for (c, nb) in neighbor_colors.iter().enumerate().skip(1) {
                if *nb < best_local {
                    best_local = *nb;
                    best_color = c;
                }
            }
            for u in self.inst.neighbors(v) {
                if colors[*u] <= self.q { neighbor_colors[colors[*u]] = 0; }
            }
            tracker.recolor(self.inst, colors, v, best_color);
        }
        tracker
    }

    /// builds an offspring from its colors (mutation, local search, evaluation)
    fn offspring(&mut self, mut colors:Vec<usize>) -> Individual {
        self.mutate(&mut colors);
        if self.config.local_search_iterations > 0 {
            self.local_search(&mut colors);
        }
        Individual::new(self.inst, colors)
    }
}


/**
genetic algorithm minimizing (n+1).conflicts + (distinct colors - 1) over colorings
using the palette 1..q. Pinned vertices keep their color in every individual.
The best individual of each generation replaces the worst one of the next generation.
*/
pub fn genetic_run<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&GaConfig,
    rng:&mut R,
    record_steps:bool,
) -> Result<GaOutcome, ColoringError> {
    validate_start(inst, &start)?;
    config.validate()?;
    let start_time = Instant::now();
    let mut tracer = Tracer::new(record_steps);
    let q = max(config.q.unwrap_or(inst.max_degree() + 1), start.max_pinned_color());
    if inst.nb_vertices() == 0 {
        return Ok(GaOutcome {
            result: AlgorithmResult::new(start, None, start_time, tracer.finish()),
            best_cost: 0,
            q,
            cost_history: vec![0],
        });
    }
    let free_vertices:Vec<VertexId> = inst.vertices().filter(|v| !start.is_pinned(*v)).collect();
    let mut ga = Ga { inst, config, rng, q, free_vertices };
    let mut population = ga.initial_population(&start)?;
    let mut best = population.iter().min_by_key(|ind| ind.cost).cloned()
        .ok_or_else(|| ColoringError::invalid_parameter("empty population"))?;
    let mut cost_history = vec![best.cost];
    for generation in 0..config.max_generations {
        let mut new_population:Vec<Individual> = Vec::with_capacity(config.population_size);
        while new_population.len() < config.population_size {
            let p1 = ga.select(&population);
            let p2 = ga.select(&population);
            let (c1, c2) = if ga.rng.gen::<f64>() < config.crossover_rate {
                (ga.informed_crossover(p1, p2), ga.informed_crossover(p2, p1))
            } else {
                (p1.colors.clone(), p2.colors.clone())
            };
            new_population.push(ga.offspring(c1));
            if new_population.len() < config.population_size {
                new_population.push(ga.offspring(c2));
            }
        }
        // elitism
        if let Some(worst) = new_population.iter_mut().max_by_key(|ind| ind.cost) {
            *worst = best.clone();
        }
        population = new_population;
        if let Some(generation_best) = population.iter().min_by_key(|ind| ind.cost) {
            if generation_best.cost < best.cost {
                best = generation_best.clone();
                log::debug!("genetic: generation {} new best cost {}", generation, best.cost);
            }
        }
        cost_history.push(best.cost);
        if tracer.is_enabled() {
            tracer.record(&best.colors.iter().map(|c| Some(*c)).collect::<Vec<_>>());
        }
    }
    let mut coloring = start;
    for v in inst.vertices() { coloring.assign(v, best.colors[v]); }
    Ok(GaOutcome {
        result: AlgorithmResult::new(coloring, None, start_time, tracer.finish()),
        best_cost: best.cost,
        q,
        cost_history,
    })
}

/** genetic algorithm (see genetic_run) */
pub fn genetic<R:Rng>(
    inst:&dyn ColoringInstance,
    start:Coloring,
    config:&GaConfig,
    rng:&mut R,
    record_steps:bool,
) -> Result<AlgorithmResult, ColoringError> {
    Ok(genetic_run(inst, start, config, rng, record_steps)?.result)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::color::{checker, CheckerResult};
    use crate::graph::Graph;

    #[test]
    fn test_validate() {
        assert!(GaConfig::default().validate().is_ok());
        assert!(GaConfig::default().with_crossover_rate(1.5).validate().is_err());
        assert!(GaConfig::default().with_mutation_rate(-0.1).validate().is_err());
        assert!(GaConfig::default().with_population_size(0).validate().is_err());
        assert!(GaConfig::default().with_population_size(2).validate().is_err());
        assert!(GaConfig::default().with_tournament_size(0).validate().is_err());
        assert!(GaConfig::default().with_q(0).validate().is_err());
    }

    #[test]
    fn test_genetic_petersen() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let config = GaConfig::default().with_population_size(20).with_max_generations(30);
        let outcome = genetic_run(&inst, Coloring::new(10), &config, &mut rng, true).unwrap();
        assert_eq!(outcome.q, 4);
        assert_eq!(outcome.cost_history.len(), 31);
        assert!(outcome.cost_history.windows(2).all(|w| w[1] <= w[0]));
        // the DSATUR seed is proper, so is the best individual
        assert!(matches!(checker(&inst, &outcome.result.coloring), CheckerResult::Ok(_)));
        assert_eq!(outcome.result.steps.unwrap().len(), 30);
    }

    #[test]
    fn test_genetic_memetic_and_pins() {
        let inst = Graph::cycle(7);
        let start = Coloring::with_pins(7, vec![(0, 3), (1, 1)]).unwrap();
        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_generations(10)
            .with_local_search_iterations(5);
        let run = |seed:u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            genetic(&inst, start.clone(), &config, &mut rng, false).unwrap()
        };
        let res = run(5);
        assert_eq!(res.coloring.get(0), Some(3));
        assert_eq!(res.coloring.get(1), Some(1));
        assert!(res.coloring.is_proper(&inst));
        assert_eq!(res.coloring, run(5).coloring);
    }

    /// conflicts recomputed from scratch: (nb_conf, conflicting free vertices)
    fn recount(inst:&Graph, colors:&[usize], free_vertices:&[VertexId]) -> (Vec<usize>, Vec<VertexId>) {
        let nb_conf:Vec<usize> = inst.vertices().map(|v| local_conflicts(inst, colors, v)).collect();
        let conflicting = free_vertices.iter().copied().filter(|v| nb_conf[*v] > 0).collect();
        (nb_conf, conflicting)
    }

    #[test]
    fn test_conflict_tracker() {
        let inst = Graph::from_file("insts/other-instances/myciel3.col").unwrap();
        let free_vertices:Vec<VertexId> = (1..11).collect(); // 0 is pinned
        let mut rng = StdRng::seed_from_u64(4);
        let mut colors:Vec<usize> = (0..11).map(|_| rng.gen_range(1..=3)).collect();
        let mut tracker = ConflictTracker::new(&inst, &colors, &free_vertices);
        for _ in 0..200 {
            let v = free_vertices[rng.gen_range(0..free_vertices.len())];
            let c = rng.gen_range(1..=4);
            tracker.recolor(&inst, &mut colors, v, c);
            let (nb_conf, conflicting) = recount(&inst, &colors, &free_vertices);
            assert_eq!(tracker.nb_conf, nb_conf);
            assert_eq!(tracker.conflicting.len(), conflicting.len());
            assert!(conflicting.iter().all(|v| tracker.conflicting.contains(*v)));
        }
    }

    #[test]
    fn test_local_search_keeps_conflicts_consistent() {
        let inst = Graph::from_file("insts/other-instances/peterson.col").unwrap();
        let config = GaConfig::default().with_local_search_iterations(50);
        let mut rng = StdRng::seed_from_u64(9);
        let free_vertices:Vec<VertexId> = (1..10).collect();
        let mut colors = vec![1 ; 10];
        let before = coloring_cost(&inst, &colors);
        let mut ga = Ga { inst:&inst, config:&config, rng:&mut rng, q:4, free_vertices: free_vertices.clone() };
        let tracker = ga.local_search(&mut colors);
        let (nb_conf, conflicting) = recount(&inst, &colors, &free_vertices);
        assert_eq!(tracker.nb_conf, nb_conf);
        assert_eq!(tracker.conflicting.len(), conflicting.len());
        assert!(conflicting.iter().all(|v| tracker.conflicting.contains(*v)));
        assert!(coloring_cost(&inst, &colors) < before);
        assert_eq!(colors[0], 1);
    }

    #[test]
    fn test_genetic_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let res = genetic(&Graph::new(vec![]), Coloring::new(0), &GaConfig::default(), &mut rng, false).unwrap();
        assert_eq!(res.k, 0);
    }
}
