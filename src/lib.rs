pub mod backtest;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod head_to_head;
pub mod poisson;
pub mod prediction;
pub mod predictor;
pub mod rules;
pub mod team_stats;

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber for the binaries; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,goalline=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads `.env.local` then `.env`; missing files are fine.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}
