use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use shardflake::{DEFAULT_EPOCH, GeneratorConfig, ShardedId};

/// Runtime configuration for the `shardflake` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first). Range checks on
/// the shard, worker and epoch happen when the generator is built, so the
/// error messages match the library's.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shardflake",
    version,
    about = "Issue and decode sharded Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Shard (datacenter) identifier embedded in every ID, 0..=31.
    ///
    /// Environment variable: `SHARD_ID`
    #[arg(long, env = "SHARD_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub shard_id: i64,

    /// Worker (process) identifier embedded in every ID, 0..=31.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Epoch in milliseconds since 1970-01-01 UTC. Defaults to the library's
    /// default epoch (2006-08-11T13:26:35Z).
    ///
    /// Environment variable: `EPOCH_MILLIS`
    #[arg(long, env = "EPOCH_MILLIS")]
    pub epoch_millis: Option<u64>,

    /// Number of IDs to print, one per line.
    ///
    /// Environment variable: `COUNT`
    #[arg(short = 'n', long, env = "COUNT", default_value_t = 1)]
    pub count: usize,

    /// Print IDs as zero-padded 20-digit strings.
    #[arg(short, long, default_value_t = false)]
    pub padded: bool,

    /// Decode an existing decimal ID instead of generating new ones.
    #[arg(long, value_name = "ID")]
    pub decode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub count: usize,
    pub padded: bool,
    pub decode: Option<ShardedId>,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.count == 0 {
            bail!("COUNT must be greater than 0");
        }

        let decode = args
            .decode
            .as_deref()
            .map(str::parse::<ShardedId>)
            .transpose()
            .context("--decode expects a decimal id")?;

        let epoch = args
            .epoch_millis
            .map_or(DEFAULT_EPOCH, Duration::from_millis);

        Ok(Self {
            generator: GeneratorConfig::new(args.shard_id, args.worker_id).with_epoch(epoch),
            count: args.count,
            padded: args.padded,
            decode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliConfig> {
        let argv = core::iter::once("shardflake").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv)?;
        CliConfig::try_from(args)
    }

    #[test]
    fn explicit_arguments_are_applied() {
        let config = parse(&[
            "--shard-id",
            "4",
            "--worker-id",
            "9",
            "--epoch-millis",
            "1288834974657",
            "-n",
            "3",
            "--padded",
        ])
        .unwrap();

        assert_eq!(config.generator.shard_id, 4);
        assert_eq!(config.generator.worker_id, 9);
        assert_eq!(config.generator.epoch, Duration::from_millis(1_288_834_974_657));
        assert_eq!(config.count, 3);
        assert!(config.padded);
        assert!(config.decode.is_none());
    }

    #[test]
    fn negative_ids_reach_validation() {
        let config = parse(&["--shard-id", "-1"]).unwrap();
        assert_eq!(config.generator.shard_id, -1);
        assert!(config.generator.validate(u64::MAX).is_err());
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = parse(&["--count", "0"]).unwrap_err();
        assert!(err.to_string().contains("COUNT"));
    }

    #[test]
    fn decode_parses_the_id() {
        let id = ShardedId::from(77, 1, 2, 3);
        let config = parse(&["--decode", &id.to_string()]).unwrap();
        assert_eq!(config.decode, Some(id));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(parse(&["--decode", "not-a-number"]).is_err());
    }
}
