mod commands;
mod config;
mod telemetry;

use std::io;

use clap::Parser;
use config::{AppConfig, CliArgs, Command};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    telemetry::init_logging()?;

    match config.command {
        Command::Generate {
            count,
            threads,
            format,
        } => commands::generate(
            &config.generator,
            count,
            threads,
            format,
            io::BufWriter::new(io::stdout()),
        ),
        Command::Inspect { value } => {
            let layout = config.generator.layout()?;
            println!("{}", commands::inspect(&layout, &value)?);
            Ok(())
        }
    }
}
