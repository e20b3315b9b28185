//! mida-setup entry point
//!
//! Parses the command line, runs the installer and renders aborting errors
//! with a suggestion before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use mida_setup::cli;
use mida_setup::core::error::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
