//! kick-runner: headless batch runner for the merger simulation.
//!
//! Usage:
//!   kick-runner --runs 10 --config cluster.json --db runs.db
//!   kick-runner --seed 12345 --stop-time 1e9 --sort-mass --tree
//!   kick-runner --runs 100 --json

use anyhow::Result;
use bhkick_core::{
    ancestry::{self, HoleField},
    config::{ClusterParams, SimConfig},
    engine::{MergerEngine, RunSummary},
    store::SimStore,
};
use rand::Rng;
use std::env;

/// Seeds drawn when none is given fall in [0, MAX_RANDOM_SEED).
const MAX_RANDOM_SEED: u64 = 1_000_000_000;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let runs = parse_arg(&args, "--runs", 1u64);
    let base_seed: Option<u64> = parse_opt_arg(&args, "--seed")?;
    let stop_time: Option<f64> = parse_opt_arg(&args, "--stop-time")?;
    let sort_mass = args.iter().any(|a| a == "--sort-mass");
    let show_tree = args.iter().any(|a| a == "--tree");
    let json = args.iter().any(|a| a == "--json");
    let db = find_arg(&args, "--db").unwrap_or(":memory:");

    let config = match find_arg(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::from_params(&ClusterParams::default())?,
    };

    if !json {
        println!("kick-runner");
        println!("  runs:      {runs}");
        println!("  db:        {db}");
        println!("  stop time: {}", stop_time.map_or("none".to_string(), |t| format!("{t:e}")));
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;

    for i in 0..runs {
        let seed = match base_seed {
            Some(s) => s.wrapping_add(i),
            None => rand::thread_rng().gen_range(0..MAX_RANDOM_SEED),
        };
        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now().to_rfc3339();
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), &started_at, &config)?;

        let mut engine = MergerEngine::new(config.clone(), seed)?;
        let summary = engine.run(stop_time, sort_mass)?;

        store.save_run(&engine.snapshot(run_id.clone()), engine.events())?;
        if json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            print_summary(&run_id, &summary, &engine);
        }

        if show_tree {
            print_heaviest_tree(&engine)?;
        }
    }

    log::info!("{} runs stored in {db}", store.run_count()?);
    Ok(())
}

fn print_summary(run_id: &str, summary: &RunSummary, engine: &MergerEngine) {
    let cluster = engine.cluster();
    let ratios = engine.mass_ratios();
    let mean_q = if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };
    let retained_mass: f64 = cluster.live_holes().map(|h| h.mass).sum();
    let max_ejected_speed = cluster
        .ejected_holes()
        .map(|h| h.initial_speed)
        .fold(0.0, f64::max);

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {run_id}");
    println!("  seed:            {}", summary.seed);
    println!("  v_esc:           {:.2} km/s", cluster.escape_velocity());
    println!("  initial holes:   {}", summary.initial_count);
    println!("  mergers:         {}", summary.mergers);
    println!("  live:            {}", summary.live);
    println!("  ejected:         {}", summary.ejected);
    println!("  retained mass:   {retained_mass:.2} Msun");
    println!("  mean q:          {mean_q:.3}");
    println!("  max eject kick:  {max_ejected_speed:.1} km/s");
    println!("  final time:      {:.4e} s", summary.final_time);
    println!("  stop reason:     {:?}", summary.reason);
    println!();
}

fn print_heaviest_tree(engine: &MergerEngine) -> Result<()> {
    let cluster = engine.cluster();
    let heaviest = cluster
        .live_holes()
        .max_by(|a, b| a.mass.total_cmp(&b.mass))
        .map(|h| h.id);
    if let Some(id) = heaviest {
        let fields = [HoleField::Label, HoleField::Mass, HoleField::MassRatio, HoleField::Speed];
        println!("=== ANCESTRY (generation {}) ===", ancestry::generation(cluster, id)?);
        print!("{}", ancestry::render_tree(cluster, id, &fields)?);
        println!();
    }
    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Absent flag is `None`; a present value that fails to parse is an error.
fn parse_opt_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    find_arg(args, flag)
        .map(|v| {
            v.parse()
                .map_err(|_| anyhow::anyhow!("Invalid value for {flag}: {v:?}"))
        })
        .transpose()
}
