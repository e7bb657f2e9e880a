// Entry point the browser launches through the native messaging manifest.

use std::env::args;

use anyhow::Result;
use clap::Parser;
use tabtally::{
    tracker::{args::HostArgs, config::TrackerConfig, start_tracker},
    utils::{
        logging::{enable_logging, HOST_PREFIX},
        runtime::run_abandoning_blocking,
    },
};
use tracing::{error, info};

fn main() {
    if let Err(e) = run(HostArgs::parse_from(args())) {
        error!("Host stopped with an error {e:?}");
        // The browser collects stderr of hosts, logging may not be set up yet.
        eprintln!("tabtally-host: {e:?}");
        std::process::exit(1);
    }
}

fn run(args: HostArgs) -> Result<()> {
    let config = TrackerConfig::from_args(&args.serve)?;
    enable_logging(HOST_PREFIX, &config.dir, args.serve.log_filter, args.serve.log_console)?;
    if let Some(origin) = &args.origin {
        info!("Started by {origin}");
    }

    run_abandoning_blocking(start_tracker(config))?
}
