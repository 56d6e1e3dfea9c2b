mod cli;
mod decoder;
mod ds;
mod error;
mod listing;
mod polarity;
mod table;
mod writer;

use std::{io, process::ExitCode};

use clap::Parser;
use cli::Cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list {
        listing::write_listing(&mut io::stdout().lock())?;
        return Ok(());
    }

    writer::write_image_files(&cli.output, cli.format)?;

    Ok(())
}
