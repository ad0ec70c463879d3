use clap::Parser;
use log::{debug, info, warn};
use snafu::ErrorCompat;

mod args;
mod poll;

use crate::args::{Args, Command};
use crate::poll::config_reader::{read_config, PollConfig, StoreConfig};
use crate::poll::*;

fn run(args: &Args) -> StoreResult<()> {
    let file_config = match &args.config {
        Some(p) => read_config(p)?,
        None => PollConfig::default(),
    };
    let config = StoreConfig::from_env(&file_config, args.data_file.as_deref());
    debug!("store config: {:?}", config.data_file);
    let store = RecordStore::open(&config);
    info!("store backend: {}", store.backend_name());

    match &args.command {
        Command::Submit(s) => {
            let ballot = ballot_from_args(s)?;
            run_submit(&store, ballot)?;
        }
        Command::Results(r) => {
            run_results(&store, r.json, r.out.clone(), r.reference.clone())?;
        }
        Command::List => run_list(&store),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occurred {:?}", e);
        eprintln!("An error occurred: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        let code = match e.kind() {
            ErrorKind::InvalidBallot => 2,
            ErrorKind::Persistence | ErrorKind::Other => 1,
        };
        std::process::exit(code);
    }
}
