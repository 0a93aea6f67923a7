//! Diagnostic logging setup.
//!
//! Progress lines meant for the operator go to stdout with `println!`; this
//! subscriber carries the structured diagnostics on stderr.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to construct tracing filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing subscriber: {err}"))?;

    Ok(())
}
