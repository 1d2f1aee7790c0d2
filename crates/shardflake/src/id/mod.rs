mod sharded;

pub use sharded::*;
