use std::sync::OnceLock;

use crate::{GeneratorConfig, LockShardedGenerator, Result, ShardedId, SystemClock};

static DEFAULT_GENERATOR: OnceLock<LockShardedGenerator<SystemClock>> = OnceLock::new();

/// Returns the process-wide generator: shard 0, worker 0, [`DEFAULT_EPOCH`],
/// wall clock.
///
/// Built on first use and never torn down. Prefer constructing and passing a
/// [`LockShardedGenerator`] explicitly; this accessor exists for callers that
/// need neither a custom shard/worker assignment nor an injected clock.
///
/// # Errors
///
/// Returns [`Error::Config`] if the system clock reads earlier than
/// [`DEFAULT_EPOCH`]. Nothing is cached in that case, so a later call retries.
///
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
/// [`Error::Config`]: crate::Error::Config
pub fn default_generator() -> Result<&'static LockShardedGenerator<SystemClock>> {
    if let Some(generator) = DEFAULT_GENERATOR.get() {
        return Ok(generator);
    }
    let generator = LockShardedGenerator::with_config(GeneratorConfig::default(), SystemClock)?;
    // A racing initializer may win; its instance is equivalent and unused yet.
    Ok(DEFAULT_GENERATOR.get_or_init(|| generator))
}

/// Generates an ID from [`default_generator`].
///
/// # Errors
///
/// See [`default_generator`] and [`LockShardedGenerator::next_id`].
pub fn next_id() -> Result<ShardedId> {
    default_generator()?.next_id()
}

/// Generates a decimal ID string from [`default_generator`].
///
/// # Errors
///
/// See [`default_generator`] and [`LockShardedGenerator::next_id`].
pub fn next_id_string() -> Result<String> {
    default_generator()?.next_id_string()
}
