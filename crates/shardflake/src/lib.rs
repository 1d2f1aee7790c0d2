//! Snowflake-style 64-bit identifiers carrying a shard and a worker field.
//!
//! ```text
//!  Bit Index:  63           63 62            22 21        17 16         12 11             0
//!              +--------------+----------------+------------+-------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | shard (5)  | worker (5)  | sequence (12) |
//!              +--------------+----------------+------------+-------------+---------------+
//! ```
//!
//! ```
//! use shardflake::{GeneratorConfig, LockShardedGenerator, SystemClock};
//!
//! let config = GeneratorConfig::default().with_shard_id(3).with_worker_id(7);
//! let generator = LockShardedGenerator::with_config(config, SystemClock).unwrap();
//!
//! let id = generator.next_id().unwrap();
//! assert_eq!(id.shard_id(), 3);
//! assert_eq!(id.worker_id(), 7);
//! ```
mod config;
mod error;
mod generator;
mod global;
mod id;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::global::*;
pub use crate::id::*;
pub use crate::time::*;
