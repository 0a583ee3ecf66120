use anyhow::Context;
use clap::{Parser, ValueEnum};
use fleetcore::clock::{Clock, SystemClock};
use fleetcore::projection::ProjectionMode;
use generator::profile::seed_fleet;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::FleetConfig;
use workflow::runner::Runner;

mod backend;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProjectionArg {
    Local,
    TileMap,
}

impl From<ProjectionArg> for ProjectionMode {
    fn from(arg: ProjectionArg) -> Self {
        match arg {
            ProjectionArg::Local => ProjectionMode::Local,
            ProjectionArg::TileMap => ProjectionMode::TileMap,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Live device fleet telemetry engine")]
struct Args {
    /// Load engine configuration from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run a fixed number of ticks and print each render plan
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, default_value_t = 5)]
    ticks: usize,
    /// Keep the HTTP bridge alive with the simulator running
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Seed for the drift generator
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    projection: Option<ProjectionArg>,
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => FleetConfig::load(path)?,
        None => FleetConfig::default(),
    }
    .with_overrides(
        args.interval_ms,
        args.seed,
        args.projection.map(ProjectionMode::from),
        args.bind.clone(),
    );
    config.validate()?;

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let runner = Arc::new(runtime.block_on(async { Runner::from_config(&config) })?);
    if config.seed_fleet {
        runner.seed(seed_fleet(SystemClock.now_ms()))?;
    }

    if args.offline {
        runtime.block_on(run_offline(&runner, args.ticks))?;
    }

    if args.serve {
        let addr = config.bind_address()?;
        runtime.block_on(async {
            runner.activate()?;
            let shutdown = async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("awaiting Ctrl+C failed: {}", err);
                }
            };
            println!("HTTP bridge running on {} (Ctrl+C to stop)...", addr);
            gui_bridge::bridge::serve(runner.clone(), addr, shutdown).await?;
            runner.deactivate();
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

async fn run_offline(runner: &Runner, ticks: usize) -> anyhow::Result<()> {
    let frame = runner.render_frame();
    println!(
        "Initial frame ({:?}) -> create {}, zones {}",
        frame.mode,
        frame.plan.to_create.len(),
        frame.zones.len()
    );
    for tick in 1..=ticks {
        runner.tick_once()?;
        let frame = runner.render_frame();
        println!(
            "Tick {} -> create {}, update {}, remove {}",
            tick,
            frame.plan.to_create.len(),
            frame.plan.to_update.len(),
            frame.plan.to_remove.len()
        );
    }
    let counts = runner.counts();
    println!(
        "Fleet -> total {}, at risk {}, high risk {}, online {}",
        counts.total, counts.at_risk, counts.high_risk, counts.online
    );
    println!("Summary -> {}", runner.summary().await);
    info!("offline metrics: {:?}", runner.metrics());
    Ok(())
}
