//! HBnB console entry point.
//!
//! # Responsibility
//! - Parse process arguments into an `AppConfig`.
//! - Load the object store once, then hand stdin/stdout to the console loop.
//!
//! # Invariants
//! - A malformed storage file aborts startup with exit code 1.
//! - Clean termination (`quit` or end of input) exits with code 0.

use clap::Parser;
use hbnb_core::{core_version, init_logging, AppConfig, Console, FileStorage, DEFAULT_STORAGE_FILE};
use log::info;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "hbnb", version, about = "Command interpreter for HBnB objects")]
struct Args {
    /// JSON file holding every stored object
    #[arg(short, long, default_value = DEFAULT_STORAGE_FILE)]
    file: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rolling log files; file logging is off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            storage_path: self.file,
            log_level: self.log_level.unwrap_or(defaults.log_level),
            log_dir: self.log_dir,
            ..defaults
        }
    }
}

fn main() -> ExitCode {
    let config = Args::parse().into_config();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hbnb: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = config.resolved_log_dir()? {
        init_logging(&config.log_level, &log_dir)?;
    }
    info!(
        "event=console_start module=cli status=start core_version={} storage={}",
        core_version(),
        config.storage_path.display()
    );

    let storage = FileStorage::open(&config.storage_path)?;
    let stdin = io::stdin();
    let mut console = Console::new(storage, io::stdout()).with_prompt(config.prompt.as_str());
    console.run(stdin.lock())?;

    info!("event=console_stop module=cli status=ok");
    Ok(())
}
