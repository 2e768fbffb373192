// src/lib.rs

//! Balanced micro-batch scheduling for data-parallel training.
//!
//! Under synchronous data parallelism every optimizer step waits for the
//! slowest worker, so unevenly sized micro-batches turn directly into
//! pipeline bubbles. For models whose per-sample cost is linear in sample
//! size, this crate builds one deterministic schedule per epoch that assigns
//! sample indices to micro-batches and workers with approximately equal cost
//! per concurrently executed micro-batch.
//!
//! The pipeline per epoch: draw `(size, index)` pairs from a size-stratified
//! [`Dataset`](dataset::Dataset) façade, partition them with an
//! equal-cardinality Karmarkar–Karp differencing heuristic
//! ([`karmarkar_karp`](scheduler::karmarkar_karp)), shuffle the micro-batches
//! with a portable PRNG keyed by `epoch + seed`, and reshape the sequence
//! into a `[step][worker]` grid, appending a ragged final step when the
//! per-worker sample count is not a multiple of the micro-batch size.
//!
//! # Example
//!
//! ```ignore
//! use sched_core::Scheduler;
//!
//! let sizes: Vec<u32> = load_sample_lengths();
//! let mut scheduler: Scheduler<'_, u32, u32> =
//!     Scheduler::new(&sizes, 8, 256, 4, 42)?;
//!
//! scheduler.on_train_begin();
//! for epoch in 0..num_epochs {
//!     scheduler.on_epoch_begin(epoch);
//!     let grid = scheduler.schedule();
//!     for (step, workers) in grid.iter().enumerate() {
//!         // workers[rank] is the micro-batch for that rank at this step
//!     }
//!     scheduler.on_epoch_end(epoch);
//! }
//! scheduler.on_train_end();
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod scheduler;
pub mod types;

// Re-export commonly used types for convenience
pub use config::ScheduleConfig;
pub use dataset::Dataset;
pub use error::{Result, SchedulerError};
pub use scheduler::{
    concat, karmarkar_karp, reshape, shuffle, Schedule, Scheduler, SchedulerVariant,
};
pub use types::{overflow_safe_cast, UnsignedInt};
