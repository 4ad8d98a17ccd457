use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use flakemint::{
    DEFAULT_INSTANCE_BITS, DEFAULT_SEQUENCE_BITS, DEFAULT_SIGN_BITS, DEFAULT_TIMESTAMP_BITS,
    GeneratorConfig,
};

/// Command-line and environment configuration for the `flakemint` binary.
///
/// Layout settings are shared by every subcommand. Each one can also be set
/// through the environment variable named in its help text, or from a `.env`
/// file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakemint",
    version,
    about = "Issue and inspect Snowflake-style 64-bit ids"
)]
pub struct CliArgs {
    /// Reserved high bits that are never written.
    ///
    /// Environment variable: `SIGN_BITS`
    #[arg(long, env = "SIGN_BITS", default_value_t = DEFAULT_SIGN_BITS)]
    pub sign_bits: u8,

    /// Bits holding milliseconds since the epoch. 41 bits last ~69 years.
    ///
    /// Environment variable: `TIMESTAMP_BITS`
    #[arg(long, env = "TIMESTAMP_BITS", default_value_t = DEFAULT_TIMESTAMP_BITS)]
    pub timestamp_bits: u8,

    /// Bits holding the instance id. 10 bits allow 1024 producers.
    ///
    /// Environment variable: `INSTANCE_BITS`
    #[arg(long, env = "INSTANCE_BITS", default_value_t = DEFAULT_INSTANCE_BITS)]
    pub instance_bits: u8,

    /// Bits holding the per-millisecond sequence. 12 bits allow 4096 ids per
    /// millisecond.
    ///
    /// Environment variable: `SEQUENCE_BITS`
    #[arg(long, env = "SEQUENCE_BITS", default_value_t = DEFAULT_SEQUENCE_BITS)]
    pub sequence_bits: u8,

    /// Epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `TIMESTAMP_EPOCH`
    #[arg(long, env = "TIMESTAMP_EPOCH", default_value_t = 0)]
    pub timestamp_epoch: u64,

    /// This producer's instance id, in `[0, 2^instance_bits)`. Required to
    /// generate ids.
    ///
    /// Environment variable: `INSTANCE_ID`
    #[arg(long, env = "INSTANCE_ID")]
    pub instance_id: Option<u64>,

    /// How long a caller waits for the generator lock, in milliseconds.
    ///
    /// Environment variable: `LOCK_TIMEOUT_MS`
    #[arg(long, env = "LOCK_TIMEOUT_MS", default_value_t = 10_000)]
    pub lock_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue ids and print one per line.
    Generate {
        /// Ids to issue per thread.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Threads sharing the one generator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Print tokens or decimal integers.
        #[arg(short, long, value_enum, default_value_t = Format::Token)]
        format: Format,
    },
    /// Decode an id (decimal) or a 13-character token into its fields.
    Inspect {
        /// A decimal id, or a token if exactly 13 characters long.
        value: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Token,
    Int,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Command::Generate { threads, .. } = &args.command {
            if *threads == 0 {
                bail!("--threads must be greater than 0");
            }
            if args.instance_id.is_none() {
                bail!("INSTANCE_ID (or --instance-id) is required to generate ids");
            }
        }

        // Inspecting never packs the instance id, so any in-range value works.
        let generator = GeneratorConfig::new(args.instance_id.unwrap_or(0))
            .with_sign_bits(args.sign_bits)
            .with_timestamp_bits(args.timestamp_bits)
            .with_instance_bits(args.instance_bits)
            .with_sequence_bits(args.sequence_bits)
            .with_epoch(args.timestamp_epoch)
            .with_lock_timeout(Duration::from_millis(args.lock_timeout_ms));

        generator
            .layout()
            .context("rejected generator configuration")?;

        Ok(Self {
            generator,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("flakemint").chain(args.iter().copied()))?;
        AppConfig::try_from(args)
    }

    #[test]
    fn generate_with_defaults() {
        let config = parse(&["--instance-id", "5", "generate"]).unwrap();
        assert_eq!(config.generator.instance_id, 5);
        assert_eq!(config.generator.sequence_bits, 12);
        assert_eq!(config.generator.lock_timeout, Duration::from_secs(10));
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                threads: 1,
                format: Format::Token
            }
        );
    }

    #[test]
    fn custom_layout() {
        let config = parse(&[
            "--instance-id",
            "3",
            "--instance-bits",
            "8",
            "--sequence-bits",
            "14",
            "--timestamp-epoch",
            "1735689600000",
            "generate",
            "-n",
            "10",
            "--format",
            "int",
        ])
        .unwrap();
        let layout = config.generator.layout().unwrap();
        assert_eq!(layout.timestamp_shift(), 22);
        assert_eq!(layout.epoch(), 1_735_689_600_000);
        assert!(matches!(
            config.command,
            Command::Generate {
                count: 10,
                format: Format::Int,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_bit_sum() {
        let err = parse(&["--instance-id", "1", "--sign-bits", "2", "generate"]).unwrap_err();
        assert!(format!("{err:#}").contains("sum to 64"));
    }

    #[test]
    fn rejects_out_of_range_instance() {
        assert!(parse(&["--instance-id", "1024", "generate"]).is_err());
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(parse(&["--instance-id", "1", "generate", "--threads", "0"]).is_err());
    }

    #[test]
    fn inspect_does_not_need_instance_id() {
        let config = parse(&["inspect", "0000000000000"]).unwrap();
        assert_eq!(
            config.command,
            Command::Inspect {
                value: "0000000000000".into()
            }
        );
    }
}
