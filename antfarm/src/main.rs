use antfarm::config::SimulationConfig;
use antfarm::simulation::{
    Brush, MAX_BRUSH_RADIUS, MapSnapshot, Simulation, TileGrid, TileKind,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::IVec2;
use std::path::PathBuf;

/// Headless ant colony foraging simulation.
#[derive(Debug, Parser)]
#[command(name = "antfarm", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map snapshot to start from instead of an empty walled map.
    #[arg(short, long)]
    map: Option<PathBuf>,

    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Seconds simulated per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Log statistics every N ticks (0 disables periodic reports).
    #[arg(long, default_value_t = 600)]
    report_every: u64,

    /// Food disc as X,Y,RADIUS. May be repeated.
    #[arg(long, value_parser = parse_disc)]
    food: Vec<Disc>,

    /// Wall disc as X,Y,RADIUS. May be repeated.
    #[arg(long, value_parser = parse_disc)]
    wall: Vec<Disc>,

    /// Write the final map snapshot to this file.
    #[arg(long)]
    save_map: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
struct Disc {
    center: IVec2,
    radius: i32,
}

/// Keeps disc centers far enough from the `i32` limits for any brush.
const MAX_DISC_COORD: i32 = i32::MAX / 2;

fn parse_disc(arg: &str) -> Result<Disc, String> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    let [x, y, radius] = parts[..] else {
        return Err(format!("expected X,Y,RADIUS but got '{arg}'"));
    };
    let parse = |value: &str| {
        value
            .parse::<i32>()
            .map_err(|e| format!("invalid number '{value}': {e}"))
    };
    let (x, y, radius) = (parse(x)?, parse(y)?, parse(radius)?);
    if !(0..=MAX_BRUSH_RADIUS).contains(&radius) {
        return Err(format!(
            "radius must be in 0..={MAX_BRUSH_RADIUS}, got {radius}"
        ));
    }
    for coord in [x, y] {
        if !(-MAX_DISC_COORD..=MAX_DISC_COORD).contains(&coord) {
            return Err(format!(
                "coordinate must be in {}..={MAX_DISC_COORD}, got {coord}",
                -MAX_DISC_COORD
            ));
        }
    }
    Ok(Disc {
        center: IVec2::new(x, y),
        radius,
    })
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();
    log::debug!("{args:#?}");

    if !args.dt.is_finite() || args.dt <= 0.0 {
        bail!("dt must be a positive number of seconds, got {}", args.dt);
    }

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            log::info!("No config file provided, using defaults");
            SimulationConfig::default()
        }
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("failed to validate config")?;

    let (grid, nest_sites) = match &args.map {
        Some(path) => MapSnapshot::load(path)?
            .into_grid(&config.world)
            .with_context(|| format!("unusable map {}", path.display()))?,
        None => {
            let mut grid = TileGrid::new(
                config.world.width,
                config.world.height,
                config.world.food_default_amount,
            );
            grid.wall_border();
            (grid, Vec::new())
        }
    };

    let mut sim = Simulation::new(&config, grid, &nest_sites);
    for disc in &args.wall {
        sim.paint(Brush::Round { radius: disc.radius }, disc.center, TileKind::Wall);
    }
    for disc in &args.food {
        sim.paint(Brush::Round { radius: disc.radius }, disc.center, TileKind::Food);
    }
    log::info!(
        "Running {} ticks of {:.4}s with {} ants and {} food on the map",
        args.ticks,
        args.dt,
        sim.total_ant_count(),
        sim.grid().food_remaining()
    );

    sim.unpause();
    for _ in 0..args.ticks {
        sim.tick(args.dt);
        if args.report_every > 0 && sim.tick_count() % args.report_every == 0 {
            report(&sim);
        }
    }

    let stats = sim.statistics();
    println!(
        "ticks={} ants={} food_collected={} food_delivered={} food_tiles_depleted={} ants_spawned={} ants_removed={}",
        sim.tick_count(),
        sim.total_ant_count(),
        stats.food_collected,
        stats.food_delivered,
        stats.food_tiles_depleted,
        stats.ants_spawned,
        stats.ants_removed
    );

    if let Some(path) = &args.save_map {
        sim.map_snapshot()
            .save(path)
            .context("failed to save final map")?;
    }

    Ok(())
}

fn report(sim: &Simulation) {
    let stats = sim.statistics();
    log::info!(
        "tick {}: {} ants, {} collected, {} delivered, {} food left",
        sim.tick_count(),
        sim.total_ant_count(),
        stats.food_collected,
        stats.food_delivered,
        sim.grid().food_remaining()
    );
}
