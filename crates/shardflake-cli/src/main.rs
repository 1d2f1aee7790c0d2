mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, CliConfig};
use shardflake::{LockShardedGenerator, ShardedId, SystemClock};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    if let Some(id) = config.decode {
        return print_decoded(id, &config);
    }

    let generator = LockShardedGenerator::with_config(config.generator, SystemClock)?;
    tracing::info!(
        shard_id = generator.shard_id(),
        worker_id = generator.worker_id(),
        count = config.count,
        "issuing ids"
    );

    let mut out = BufWriter::new(io::stdout().lock());
    for _ in 0..config.count {
        let id = generator.next_id()?;
        if config.padded {
            writeln!(out, "{}", id.to_padded_string())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_decoded(id: ShardedId, config: &CliConfig) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "id          : {id}")?;
    writeln!(out, "unix_millis : {}", id.unix_millis(config.generator.epoch))?;
    writeln!(out, "timestamp   : {}", id.timestamp())?;
    writeln!(out, "shard_id    : {}", id.shard_id())?;
    writeln!(out, "worker_id   : {}", id.worker_id())?;
    writeln!(out, "sequence    : {}", id.sequence())?;
    Ok(())
}
