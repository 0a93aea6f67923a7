use clap::Parser;
use fofa_m3u_lib::config::PipelineConfig;
use fofa_m3u_lib::probe::{parse_endpoint, relay_url, Probe, TcpProbe};
use std::path::PathBuf;

/// Probe a single relay the way the playlist run does and print the verdict
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Full `http://HOST[:PORT]/...` URL, or a relay IP when --template is given
    target: String,

    /// Channel template URL to rewrite onto `target`, e.g. rtp://239.3.1.1:8000
    #[arg(short, long)]
    template: Option<String>,

    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let config = PipelineConfig::load(args.config.as_deref())?;

    let url = match &args.template {
        Some(template) => relay_url(&args.target, template),
        None => args.target.clone(),
    };
    println!("Probing: {}", url);

    match parse_endpoint(&url, config.default_port) {
        Ok(endpoint) => println!("  Endpoint: {}", endpoint),
        Err(e) => {
            println!("  [X] {}", e);
            return Ok(());
        }
    }

    let probe = TcpProbe::new(config.probe_timeout(), config.default_port);
    match probe.probe(&url).await {
        Ok(_) => println!("  [✓] reachable within {}ms", config.probe_timeout_ms),
        Err(e) => println!("  [X] unreachable ({}): {}", e.kind(), e),
    }
    Ok(())
}
