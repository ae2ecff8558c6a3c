// Runs the stimulus sweep: every configured grid size, `batch_size` times, three
// images each. Configuration comes from `SweepConfig` defaults and `DOT_STIMULI_*`
// environment overrides; logging is controlled with `RUST_LOG`.

mod batch;
mod config;
mod folders;

use config::SweepConfig;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SweepConfig::from_env()?;
    let output_root = config.output_root.clone();
    let summary = batch::run_sweep(config).await?;

    info!(
        "done: {} triplets under {} (seed {})",
        summary.reports.len(),
        output_root.display(),
        summary.seed
    );
    Ok(())
}
