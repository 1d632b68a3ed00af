use anyhow::{Context, Result};
use clap::Parser;
use flock_cli::{build_simulation, drive, ConsolePresenter};
use flock_core::Bounds;
use flock_shared::{PopulationReport, ScenarioSettings};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predator/prey flocking simulation", long_about = None)]
struct Args {
    /// Scenario file (JSON). The stock prey/predator scenario is used when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Run every event dated up to this tick
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the world width
    #[arg(long)]
    width: Option<f64>,

    /// Override the world height
    #[arg(long)]
    height: Option<f64>,

    /// Ticks between two population reports
    #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    report_every: u64,

    /// Print reports as JSON lines
    #[arg(short, long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the effective scenario and exit
    #[arg(long)]
    dump_scenario: bool,
}

fn load_scenario(args: &Args) -> Result<ScenarioSettings> {
    let mut scenario = match &args.scenario {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read scenario {}", path.display()))?;
            ScenarioSettings::from_json(&json)
                .with_context(|| format!("Failed to parse scenario {}", path.display()))?
        }
        None => ScenarioSettings::default(),
    };

    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(width) = args.width {
        scenario.width = width;
    }
    if let Some(height) = args.height {
        scenario.height = height;
    }
    Ok(scenario)
}

fn print_report(report: &PopulationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    let groups: Vec<String> = report
        .groups
        .iter()
        .map(|g| format!("{} {} (energy {:.1})", g.name, g.alive, g.mean_energy))
        .collect();
    println!("date {:>6}: {}", report.date, groups.join(", "));
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let scenario = load_scenario(&args).context("Failed to load scenario")?;

    if args.dump_scenario {
        println!("{}", scenario.to_json_pretty()?);
        return Ok(());
    }

    log::info!("Flock simulation starting...");
    log::info!(
        "World {}x{}, seed {}, {} groups, {} ticks",
        scenario.width,
        scenario.height,
        scenario.seed,
        scenario.groups.len(),
        args.ticks
    );

    let viewport = Bounds::new(scenario.width, scenario.height).context("Invalid world size")?;
    let presenter = Rc::new(ConsolePresenter::new(viewport));
    let mut sim = build_simulation(&scenario, presenter.clone())
        .context("Failed to initialize simulation")?;

    let mut output = Ok(());
    let events = drive(&mut sim, &presenter, args.ticks, args.report_every, |report| {
        if output.is_ok() {
            output = print_report(report, args.json);
        }
    });
    output.context("Failed to write report")?;

    log::info!(
        "Ran {} events up to date {}",
        events,
        sim.current_date()
    );

    Ok(())
}
