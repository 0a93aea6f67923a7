use std::path::PathBuf;

use fofa_m3u_lib::config::PipelineConfig;
use fofa_m3u_lib::{pipeline, setup, telemetry};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Load configuration from this JSON file instead of the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved configuration and input layout, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    telemetry::init()?;
    let config = PipelineConfig::load(args.config.as_deref())?;

    if args.check {
        println!("{}", serde_json::to_string_pretty(&config)?);
        for line in setup::layout_report(&config) {
            println!("{}", line);
        }
        return Ok(());
    }

    let summary = pipeline::run(&config).await?;
    tracing::info!(
        batches = summary.batches,
        probes = summary.probes,
        reachable = summary.reachable,
        records = summary.records,
        "run complete"
    );
    Ok(())
}
