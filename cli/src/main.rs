use std::env;
use std::fs;

use bed_assign_core_rs::{BedAssigner, Scenario};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("bed-assign-cli <command>");
    println!("commands:");
    println!("  run <scenario.json> [passes]");
    println!("    runs the reassignment pipeline for every pawn, once per pass (default 1)");
    println!("    prints each notification, then final occupancy and registry as JSON");
    println!("  check <scenario.json>");
    println!("    loads the scenario and reports what it contains");
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: Option<&String>) -> Result<(BedAssigner, usize), String> {
    let path = path.ok_or_else(|| "missing scenario path".to_string())?;
    let json = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
    let scenario = Scenario::from_json(&json).map_err(|err| err.to_string())?;
    scenario.into_assigner().map_err(|err| err.to_string())
}

fn parse_passes(value: Option<&String>) -> Result<u32, String> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| format!("invalid passes: {raw}"))
        })
        .transpose()
        .map(|passes| passes.unwrap_or(1))
}

fn run(args: &[String]) -> Result<(), String> {
    let (mut assigner, dropped) = load(args.get(2))?;
    let passes = parse_passes(args.get(3))?;
    tracing::debug!(passes, pawns = assigner.state().num_pawns(), "running scenario");
    if dropped > 0 {
        println!("dropped {dropped} unresolvable registry entries");
    }

    for pass in 1..=passes {
        let result = assigner.run_pass();
        println!(
            "pass {pass}: evaluated={} reassigned={}",
            result.evaluated,
            result.events.len()
        );
        for event in &result.events {
            println!("  [{}] {}", event.event_type(), event.message(assigner.state()));
        }
    }

    let occupancy = serde_json::to_string_pretty(&assigner.state().occupancy())
        .map_err(|err| format!("cannot render occupancy: {err}"))?;
    println!("occupancy: {occupancy}");
    let registry = assigner
        .save_registry_json()
        .map_err(|err| err.to_string())?;
    println!("registry: {registry}");
    Ok(())
}

fn check(args: &[String]) -> Result<(), String> {
    let (assigner, dropped) = load(args.get(2))?;
    let state = assigner.state();
    println!(
        "pawns={} beds={} forced={} unusable={} dropped={} consistent={}",
        state.num_pawns(),
        state.num_beds(),
        assigner.registry().forced_len(),
        assigner.registry().unusable_len(),
        dropped,
        state.occupancy_consistent()
    );
    Ok(())
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let result = match command {
        Some("run") => run(&args),
        Some("check") => check(&args),
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
