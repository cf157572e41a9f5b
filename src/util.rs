use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use clap::ArgMatches;
use serde_json::{json, Value};

use crate::{
    color::{AlgorithmResult, Coloring, ColoringInstance, VertexId, checker, CheckerResult},
    dimacs,
    error::InstanceError,
    graph::Graph,
    solvers::{Algorithm, SolverParams},
};

/** graph and the label of each vertex (labels[v]: label of v) */
#[derive(Debug, Clone)]
pub struct LabeledGraph {
    /// graph
    pub graph: Graph,
    /// vertex labels
    pub labels: Vec<String>,
}

impl LabeledGraph {
    /// vertex id of a label
    pub fn vertex(&self, label:&str) -> Option<VertexId> {
        self.labels.iter().position(|l| l == label)
    }

    /// reads a DIMACS file (labels are the 1-based DIMACS indices)
    pub fn from_dimacs(filename:&str) -> Result<Self, InstanceError> {
        let (n,_,adj_list) = dimacs::read_from_file(filename)?;
        Ok(Self { graph: Graph::new(adj_list), labels: (1..=n).map(|i| i.to_string()).collect() })
    }

    /// reads a JSON adjacency map file
    pub fn from_json_file(filename:&str) -> Result<Self, InstanceError> {
        Self::from_json_str(&fs::read_to_string(filename)?)
    }

    /** reads a JSON adjacency map `{"a": ["b", "c"], ...}`.
    Keys are numbered in label order (numeric labels in numeric order),
    neighbors that are not keys are numbered afterwards.
    */
    pub fn from_json_str(s:&str) -> Result<Self, InstanceError> {
        let adj_map:BTreeMap<String, Vec<String>> = serde_json::from_str(s)?;
        let mut labels:Vec<String> = adj_map.keys().cloned().collect();
        labels.sort_by(|a,b| label_cmp(a, b));
        let mut undeclared:Vec<String> = adj_map.values().flatten()
            .filter(|l| !adj_map.contains_key(*l))
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter().collect();
        undeclared.sort_by(|a,b| label_cmp(a, b));
        labels.extend(undeclared);
        let ids:BTreeMap<&str, VertexId> = labels.iter().enumerate().map(|(i,l)| (l.as_str(), i)).collect();
        let mut adj_list = vec![Vec::new() ; labels.len()];
        for (label, neighbors) in &adj_map {
            let u = ids[label.as_str()];
            for neighbor in neighbors {
                adj_list[u].push(ids[neighbor.as_str()]);
            }
        }
        Ok(Self { graph: Graph::new(adj_list), labels })
    }

    /// reads pinned vertices from a JSON map `{"label": color}`
    pub fn pins_from_json_str(&self, s:&str) -> Result<Coloring, InstanceError> {
        let pins:BTreeMap<String, usize> = serde_json::from_str(s)?;
        let mut res = Vec::with_capacity(pins.len());
        for (label, c) in pins {
            let v = self.vertex(&label).ok_or(InstanceError::UnknownVertex(label))?;
            res.push((v, c));
        }
        Ok(Coloring::with_pins(self.graph.nb_vertices(), res)?)
    }

    /// reads pinned vertices from a JSON file
    pub fn pins_from_file(&self, filename:&str) -> Result<Coloring, InstanceError> {
        self.pins_from_json_str(&fs::read_to_string(filename)?)
    }

    /// color classes of a coloring, as labels (res[i]: vertices with color i+1)
    pub fn labelled_classes(&self, coloring:&Coloring) -> Vec<Vec<&str>> {
        coloring.to_solution().iter()
            .map(|class| class.iter().map(|v| self.labels[*v].as_str()).collect())
            .collect()
    }

    /// labelled view of a coloring
    pub fn labelled_coloring(&self, coloring:&Coloring) -> BTreeMap<String, usize> {
        self.graph.vertices()
            .filter_map(|v| coloring.get(v).map(|c| (self.labels[v].clone(), c)))
            .collect()
    }
}

/// numeric labels first (by value), then the other labels (lexicographic)
fn label_cmp(a:&str, b:&str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}


/// instances up to this size get an adjacency matrix
const ADJ_MATRIX_MAX_VERTICES:usize = 10_000;

/** command line parameters */
#[derive(Debug)]
pub struct CliParams {
    /// instance filename
    pub inst_filename: String,
    /// instance
    pub instance: LabeledGraph,
    /// algorithm to run
    pub algorithm: Algorithm,
    /// random seed
    pub seed: u64,
    /// algorithm parameters
    pub solver_params: SolverParams,
    /// starting coloring (pinned vertices)
    pub start: Coloring,
    /// true iff the intermediate colorings are recorded
    pub record_steps: bool,
    /// solution file (if any)
    pub sol_file: Option<String>,
    /// performance file (if any)
    pub perf_file: Option<String>,
}

/** reads command line input: instance, algorithm, seed, parameters, pins and output files */
pub fn read_params(main_args:&ArgMatches) -> Result<CliParams, InstanceError> {
    let inst_filename = main_args.value_of("instance")
        .ok_or_else(|| InstanceError::Argument("missing instance".to_string()))?;
    let instance_type = main_args.value_of("type").unwrap_or("dimacs");
    let algorithm:Algorithm = main_args.value_of("algorithm").unwrap_or("dsatur").parse()?;
    let seed:u64 = match main_args.value_of("seed") {
        None => rand::random(),
        Some(s) => s.parse::<u64>().map_err(|_| InstanceError::Argument(format!("invalid seed {}", s)))?,
    };
    // read value of the solution filename
    let sol_file: Option<String> = main_args.value_of("solution").map(|e| {
        println!("printing solutions in: {}", e);
        e.to_string()
    });
    // read value of the performance logs filename
    let perf_file: Option<String> = main_args.value_of("perf").map(|e| {
        println!("printing perfs in: {}", e);
        e.to_string()
    });
    // read instance file
    let mut instance = match instance_type {
        "dimacs" => LabeledGraph::from_dimacs(inst_filename)?,
        "json" => LabeledGraph::from_json_file(inst_filename)?,
        _ => return Err(InstanceError::Argument(format!("instance type unknown {}", instance_type))),
    };
    let solver_params = match main_args.value_of("params") {
        None => SolverParams::default(),
        Some(filename) => SolverParams::from_file(filename)?,
    };
    let start = match main_args.value_of("pins") {
        None => Coloring::new(instance.graph.nb_vertices()),
        Some(filename) => instance.pins_from_file(filename)?,
    };
    if instance.graph.nb_vertices() <= ADJ_MATRIX_MAX_VERTICES {
        instance.graph.populate_adj_matrix();
    }
    log::info!("instance {} ({})", inst_filename, instance_type);
    instance.graph.display_statistics();
    println!("=======================");
    Ok(CliParams {
        inst_filename: inst_filename.to_string(),
        instance,
        algorithm,
        seed,
        solver_params,
        start,
        record_steps: main_args.is_present("steps"),
        sol_file,
        perf_file,
    })
}

/// statistics of a run (written in the performance file)
pub fn run_statistics(cli:&CliParams, result:&AlgorithmResult) -> Value {
    json!({
        "inst_name": cli.inst_filename,
        "algorithm": cli.algorithm.name(),
        "seed": cli.seed,
        "k": result.k,
        "chromatic_number": result.chromatic_number,
        "time_searched": result.runtime,
    })
}

/// exports search results to files
pub fn export_results(
    cli:&CliParams,
    result:&AlgorithmResult,
    check_result:bool,
) -> Result<(), InstanceError> {
    // export statistics
    if let Some(filename) = &cli.perf_file {
        fs::write(filename, serde_json::to_string(&run_statistics(cli, result))?)?;
    }
    // export solution
    if let Some(filename) = &cli.sol_file {
        if check_result {
            match checker(&cli.instance.graph, &result.coloring) {
                CheckerResult::Ok(_) => {},
                checker_result => log::warn!("invalid solution (reason: {:?})", checker_result),
            }
        }
        let solution = json!({
            "algorithm": cli.algorithm.name(),
            "instance": cli.inst_filename,
            "labels": cli.instance.labels,
            "coloring": cli.instance.labelled_coloring(&result.coloring),
            "color_classes": cli.instance.labelled_classes(&result.coloring),
            "result": result,
        });
        fs::write(filename, serde_json::to_string_pretty(&solution)?)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_adjacency() {
        let inst = LabeledGraph::from_json_file("insts/other-instances/small.json").unwrap();
        assert_eq!(inst.labels, vec!["a", "b", "c", "d"]);
        assert_eq!(inst.graph.nb_edges(), 3);
        assert_eq!(inst.graph.neighbors(0), &[1, 2]);
        assert_eq!(inst.graph.neighbors(3), &[2]);
        assert_eq!(inst.vertex("c"), Some(2));
        assert_eq!(inst.vertex("z"), None);
    }

    #[test]
    fn test_numeric_labels() {
        let inst = LabeledGraph::from_json_str(r#"{"10": ["2"], "2": ["1"], "1": []}"#).unwrap();
        assert_eq!(inst.labels, vec!["1", "2", "10"]);
        assert!(inst.graph.are_adjacent(1, 2));
        assert!(inst.graph.are_adjacent(0, 1));
        assert!(LabeledGraph::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_pins() {
        let inst = LabeledGraph::from_json_file("insts/other-instances/small.json").unwrap();
        let pins = inst.pins_from_json_str(r#"{"a": 2, "d": 1}"#).unwrap();
        assert_eq!(pins.get(0), Some(2));
        assert_eq!(pins.get(3), Some(1));
        assert!(pins.is_pinned(3));
        assert!(matches!(inst.pins_from_json_str(r#"{"x": 1}"#), Err(InstanceError::UnknownVertex(_))));
        assert!(matches!(inst.pins_from_json_str(r#"{"a": 0}"#), Err(InstanceError::Coloring(_))));
        let labelled = inst.labelled_coloring(&pins);
        assert_eq!(labelled.get("a"), Some(&2));
        assert_eq!(labelled.len(), 2);
        assert_eq!(inst.labelled_classes(&pins), vec![vec!["d"], vec!["a"]]);
    }

    #[test]
    fn test_dimacs_labels() {
        let inst = LabeledGraph::from_dimacs("insts/grid-instances/grid2x2").unwrap();
        assert_eq!(inst.labels, vec!["1", "2", "3", "4"]);
    }
}
