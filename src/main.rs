use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use page_mirror::{telemetry, HttpTransport, Mirror, MirrorCommand};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = MirrorCommand::parse();
    telemetry::init_tracing(args.verbose);

    let config = args.to_config();
    let transport = HttpTransport::new(&config.user_agent, config.timeout)
        .context("Failed to build HTTP client")?;

    let mirror = Mirror::new(config, Arc::new(transport));
    let summary = mirror.run(&args.urls).await;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
