use clap::{Args, Parser, Subcommand};
use rowkey::{
    Backoff, DEFAULT_EPOCH,
    config::{ClockKind, GeneratorConfig},
};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "rowkey", version, about = "Mint and decode a1stream record ids")]
pub struct CliArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings for the id generator of this process.
///
/// Every flag falls back to an environment variable, and `.env` is loaded
/// before parsing.
#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Worker id stamped into every id. Must be unique among all processes
    /// writing to the same tables.
    ///
    /// Environment variable: `ROWKEY_WORKER_ID`
    #[arg(long, env = "ROWKEY_WORKER_ID", default_value_t = 0)]
    pub worker_id: u64,

    /// Zero point of the timestamp field, in milliseconds since the Unix
    /// epoch. Defaults to 2024-01-01T00:00:00Z.
    ///
    /// Environment variable: `ROWKEY_EPOCH_MS`
    #[arg(long, env = "ROWKEY_EPOCH_MS", default_value_t = DEFAULT_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// How to wait when a millisecond's sequence is exhausted: spin, yield or
    /// sleep.
    ///
    /// Environment variable: `ROWKEY_BACKOFF`
    #[arg(long, env = "ROWKEY_BACKOFF", default_value_t = Backoff::Yield)]
    pub backoff: Backoff,

    /// Time source: system (wall clock) or monotonic.
    ///
    /// Environment variable: `ROWKEY_CLOCK`
    #[arg(long, env = "ROWKEY_CLOCK", default_value_t = ClockKind::System)]
    pub clock: ClockKind,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print freshly minted ids, one per line.
    Next {
        /// How many ids to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Build and store a consumer record per id inside this dealer
        /// partition.
        #[arg(long)]
        partition: Option<String>,

        /// Use the lock-free generator instead of the mutex-based one.
        #[arg(long, default_value_t = false)]
        atomic: bool,
    },
    /// Print the fields packed into an id.
    Decode {
        /// The id, in decimal.
        id: String,
    },
}

impl TryFrom<GeneratorArgs> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(args: GeneratorArgs) -> Result<Self, Self::Error> {
        let config = Self {
            worker_id: args.worker_id,
            epoch: Duration::from_millis(args.epoch_ms),
            backoff: args.backoff,
            clock: args.clock,
        };
        config.validate()?;
        Ok(config)
    }
}
