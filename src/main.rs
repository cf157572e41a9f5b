//! Command line interface of the kcolor graph coloring engine


// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

use clap::{App, ArgMatches, load_yaml};
use rand::SeedableRng;
use rand::rngs::StdRng;

use kcolor::error::InstanceError;
use kcolor::solvers::solve;
use kcolor::util::{read_params, export_results};


/// reads the instance and parameters, runs the algorithm and exports the results
fn run(main_args:&ArgMatches) -> Result<(), InstanceError> {
    let params = read_params(main_args)?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let result = solve(
        params.algorithm,
        &params.instance.graph,
        params.start.clone(),
        &params.solver_params,
        params.record_steps,
        &mut rng,
    )?;
    println!("{} took {:.3} seconds. Nb colors: {}", params.algorithm, result.runtime, result.k);
    if let Some(chi) = result.chromatic_number {
        println!("chromatic number: {}", chi);
    }
    if let Some(steps) = &result.steps {
        println!("{} steps recorded", steps.len());
    }
    export_results(&params, &result, true)
}

/**
reads an instance, colors it with the requested algorithm, and writes the results.
*/
pub fn main() {
    env_logger::init();
    // parse arguments
    let yaml = load_yaml!("main_args.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    if let Err(e) = run(&main_args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
