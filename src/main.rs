use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::{debug, error};
use tracing_subscriber::filter::EnvFilter;

use lc3_vm::{emulator, terminal};

/// Emulator for the LC-3 educational 16-bit computer.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Image files to load in order; later images overwrite earlier ones at
    /// overlapping addresses
    #[arg(value_name = "IMAGE-FILE", required = true)]
    images: Vec<PathBuf>,

    /// Increase the level of verbosity. Can be used multiple times.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "lc3_vm=debug,info",
            3..=u8::MAX => "trace",
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr, program output owns stdout
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(args.log_filter()))
        .expect("hard coded filter directives must parse");
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let mut emu = match emulator::from_image_files(&args.images) {
        Ok(emu) => emu,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(1);
        }
    };

    // LC-3 programs expect unbuffered, unechoed keyboard input
    let raw_lock = match terminal::set_terminal_raw() {
        Ok(lock) => Some(lock),
        Err(e) => {
            debug!("stdin is not a raw-capable terminal: {e}");
            None
        }
    };

    let result = emu.execute();
    drop(raw_lock);

    match result {
        Ok(()) => {
            debug!(registers = ?emu.registers(), "end of program");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(1)
        }
    }
}
