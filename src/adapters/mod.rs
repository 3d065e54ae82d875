// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod storage;

pub use clock::{ManualClock, SystemClock};
pub use storage::{FileStateStore, MemoryStateStore};
