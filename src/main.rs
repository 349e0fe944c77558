use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use pcm_pause_resume::{alsa, cli::Args, device, runner};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    alsa::silence_driver_errors();

    if args.list {
        let list = device::discover(&args.discovery()).context("device discovery failed")?;
        list.print();
        return Ok(!list.has_no_pairs());
    }

    let config = args.config();
    log::debug!("{config:?}");
    let summary = runner::run(&args.selection(), &config).context("pause/resume test aborted")?;
    summary.report();
    Ok(summary.passed())
}
