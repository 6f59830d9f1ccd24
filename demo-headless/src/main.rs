use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wildfire_core::core_types::{HOUR_IN_MINUTES, YEAR_IN_MINUTES};
use wildfire_core::simulation::YearlyStats;
use wildfire_core::{
    Phase, Session, Simulation, SimulationConfig, SimulationEvent, SimulationObserver, Vegetation,
    PRESET_NAMES,
};

/// Headless wildfire and succession run
#[derive(Parser, Debug)]
#[command(name = "wildfire-demo")]
#[command(about = "Runs a wildfire succession scenario to its end year", long_about = None)]
struct Args {
    /// Configuration preset
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// JSON object applied on top of the preset, e.g. '{"windSpeed": 8}'
    #[arg(short, long)]
    overrides: Option<String>,

    /// Random seed (OS entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the simulation end year
    #[arg(short, long)]
    end_year: Option<u32>,

    /// Spark position in model feet as X,Y (repeatable)
    #[arg(long = "spark", value_parser = parse_spark)]
    sparks: Vec<[f64; 2]>,

    /// Minutes per tick while fire is active
    #[arg(long, default_value_t = 3.0 * HOUR_IN_MINUTES)]
    fire_step: f64,

    /// Print vegetation statistics every N years
    #[arg(short, long, default_value_t = 10)]
    report_every: u32,

    /// Print the yearly statistics as JSON when done
    #[arg(long)]
    json: bool,

    /// List the available presets and exit
    #[arg(long)]
    list_presets: bool,
}

fn parse_spark(value: &str) -> Result<[f64; 2], String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("'{part}': {e}"))
    };
    Ok([parse(x)?, parse(y)?])
}

/// Prints a table row on report years and a summary when a fire ends
struct Reporter {
    every: u32,
}

impl SimulationObserver for Reporter {
    fn on_event(&mut self, event: SimulationEvent, simulation: &Simulation) {
        match event {
            SimulationEvent::YearChange => {
                let Some(stats) = simulation.yearly_stats().last() else {
                    return;
                };
                if stats.year % self.every == 0 {
                    print_row(stats);
                }
            }
            SimulationEvent::FireEventEnded => {
                let zones = simulation.grid().map_or(0, |g| g.zones().len());
                let burned: Vec<String> = (0..zones)
                    .map(|z| format!("zone {z}: {:.1}%", simulation.zone_burn_percentage(z) * 100.0))
                    .collect();
                println!(
                    "Fire ended at year {:.2} ({})",
                    simulation.year(),
                    burned.join(", ")
                );
            }
            _ => {}
        }
    }
}

fn print_row(stats: &YearlyStats) {
    let veg = &stats.vegetation;
    println!(
        "{:5} | {:5.1} | {:5.1} | {:9.1} | {:10.1} | {:6.1} | {:14.0}",
        stats.year,
        veg.fraction(Vegetation::Grass) * 100.0,
        veg.fraction(Vegetation::Shrub) * 100.0,
        veg.fraction(Vegetation::DeciduousForest) * 100.0,
        veg.fraction(Vegetation::ConiferousForest) * 100.0,
        veg.burned * 100.0,
        stats.total_carbon
    );
}

fn build_config(args: &Args) -> wildfire_core::Result<SimulationConfig> {
    let mut config = SimulationConfig::preset(&args.preset)?;
    if let Some(overrides) = &args.overrides {
        config = config.with_overrides(overrides)?;
    }
    if let Some(seed) = args.seed {
        config.rng_seed = Some(seed);
    }
    if let Some(end_year) = args.end_year {
        config.simulation_end_year = end_year;
    }
    if !args.sparks.is_empty() {
        config.sparks.clone_from(&args.sparks);
    }
    Ok(config)
}

fn run(args: &Args) -> wildfire_core::Result<()> {
    let config = build_config(args)?;
    let end_year = config.simulation_end_year;
    info!(
        "Preset '{}': {}x{} cells, {} sparks, {} years",
        args.preset,
        config.grid_width,
        config.grid_height(),
        config.sparks.len(),
        end_year
    );

    let mut session = Session::new(config)?;
    session.add_observer(Box::new(Reporter {
        every: args.report_every.max(1),
    }));
    session.load_terrain_from_config();

    println!("Year  | Grass | Shrub | Deciduous | Coniferous | Burned | Carbon (t)");
    println!("------|-------|-------|-----------|------------|--------|---------------");
    session.start();
    while session.simulation().is_running() {
        let step = if session.simulation().phase() == Phase::FireActive {
            args.fire_step
        } else {
            YEAR_IN_MINUTES
        };
        session.tick(step);
    }

    let simulation = session.simulation();
    println!(
        "\nFinished at year {:.0} with {} snapshots in {} buffers",
        simulation.year(),
        session.snapshots().len(),
        session.snapshots().buffer_count()
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(simulation.yearly_stats())?);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.list_presets {
        for name in PRESET_NAMES {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
