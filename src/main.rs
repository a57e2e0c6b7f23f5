//! `worker-pool`: run a resizable worker pool from an interactive console.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use elastic_pool::builders::build_logging_pool;
use elastic_pool::config::{AppConfig, ConfigSource};
use elastic_pool::core::AppResult;
use elastic_pool::runtime::run_console;
use elastic_pool::util::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "worker-pool")]
#[command(version)]
#[command(about = "An application for demonstrating a dynamically resizable worker pool")]
#[command(propagate_version = true)]
struct Args {
    /// Config file (default is ./.worker-pool.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run pool workers in interactive mode.
    ///
    /// Type `add` to add a worker, `remove` to remove one, `exit` to shut
    /// down. Any other text is submitted as a job.
    Run {
        /// Override the configured initial worker count
        #[arg(long)]
        workers: Option<i64>,
    },
}

fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let (mut cfg, source) = AppConfig::load(args.config.as_deref())?;
    init_tracing(&cfg.log.level);

    match source {
        ConfigSource::File(path) => info!(path = %path.display(), "Using config file"),
        ConfigSource::Defaults => warn!("Config file not found, using defaults"),
    }

    match args.command {
        Commands::Run { workers } => {
            if let Some(workers) = workers {
                cfg.workers.initial = workers;
            }
            info!(initial_workers = cfg.workers.initial, "Running worker pool");

            let pool = build_logging_pool(&cfg)?;
            pool.start()?;

            let stdin = io::stdin();
            run_console(&pool, stdin.lock(), io::stdout())?;
        }
    }

    Ok(())
}
