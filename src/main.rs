use std::process::ExitCode;

use clap::Parser;
use georef::cli::{Cli, run};

/// georef command-line entry point
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
