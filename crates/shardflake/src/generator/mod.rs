mod lock;
mod poll;

pub use lock::*;
pub use poll::*;

// parking_lot mutexes never poison; std ones surface `Error::LockPoisoned`.
#[cfg(feature = "parking-lot")]
pub use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub use std::sync::{Mutex, MutexGuard, PoisonError};
