#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, Command};
use rowkey::{
    IdSource, RecordId,
    config::GeneratorConfig,
    context::{PartitionKey, with_partition_key},
    domain::{ConsumerInfo, ConsumerInfoVo},
    repository::{MemoryRepository, PartitionRepository, Repository},
};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry()?;

    let config = GeneratorConfig::try_from(args.generator)?;
    tracing::debug!(
        worker_id = config.worker_id,
        epoch_ms = config.epoch.as_millis() as u64,
        backoff = %config.backoff,
        clock = %config.clock,
        "generator configured"
    );

    match args.command {
        Command::Next {
            count,
            partition,
            atomic,
        } => {
            if atomic {
                mint(&config.build_atomic_generator()?, count, partition)
            } else {
                mint(&config.build_lock_generator()?, count, partition)
            }
        }
        Command::Decode { id } => decode(&config, &id),
    }
}

/// Prints `count` ids. With a partition, each id becomes a consumer record
/// built from the session partition and saved to an in-memory store.
fn mint(ids: &dyn IdSource, count: usize, partition: Option<String>) -> anyhow::Result<()> {
    let Some(partition) = partition else {
        for _ in 0..count {
            println!("{}", ids.allocate()?);
        }
        return Ok(());
    };

    let key = PartitionKey::new(partition)?;
    let repo = MemoryRepository::<ConsumerInfo>::new();

    with_partition_key(key.clone(), || -> anyhow::Result<()> {
        for _ in 0..count {
            let vo = ConsumerInfoVo::builder_with_default(ids)?
                .site_id("rowkey-cli")
                .build();
            let mut consumer = ConsumerInfo::from(vo);
            let outcome = repo.save(&mut consumer)?;
            tracing::debug!(id = %consumer.consumer_id, ?outcome, "consumer stored");
            println!("{}\t{}", consumer.consumer_id, consumer.dealer_partition);
        }
        Ok(())
    })?;

    let stored = repo.list_partition(&key)?.len();
    tracing::info!(partition = %key, stored, "minted consumer records");
    Ok(())
}

fn decode(config: &GeneratorConfig, raw: &str) -> anyhow::Result<()> {
    let id: RecordId = raw.parse()?;
    let since_epoch = id.timestamp();
    let unix_ms = since_epoch + config.epoch.as_millis() as u64;

    println!("id          {id}");
    println!("padded      {}", id.to_padded_string());
    println!("timestamp   {since_epoch} ms since epoch");
    println!("unix        {unix_ms} ms");
    println!("worker      {}", id.machine_id());
    println!("sequence    {}", id.sequence());
    Ok(())
}
