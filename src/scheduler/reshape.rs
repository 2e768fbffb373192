// src/scheduler/reshape.rs

//! Flat micro-batch sequence → `[step][worker]` grid.

use crate::scheduler::Schedule;
use crate::types::UnsignedInt;

/// Reshapes a shuffled micro-batch sequence into steps of `data_parallel_size`
/// consecutive micro-batches: step `r`, worker `w` receives the micro-batch
/// at position `r * data_parallel_size + w`.
///
/// The sequence length must be a multiple of `data_parallel_size`; a
/// violation indicates a bug in the caller's derivation and aborts.
pub fn reshape<I: UnsignedInt>(
    micro_batches: Vec<Vec<I>>,
    data_parallel_size: usize,
    global_batch_size: usize,
) -> Schedule<I> {
    assert_ne!(data_parallel_size, 0, "data parallel size must be non-zero");
    assert_eq!(
        micro_batches.len() % data_parallel_size,
        0,
        "micro-batch count {} is not divisible by data parallel size {}",
        micro_batches.len(),
        data_parallel_size
    );
    debug_assert_eq!(global_batch_size % data_parallel_size, 0);

    let mut grid = Vec::with_capacity(micro_batches.len() / data_parallel_size);
    let mut step = Vec::with_capacity(data_parallel_size);
    for micro_batch in micro_batches {
        step.push(micro_batch);
        if step.len() == data_parallel_size {
            grid.push(std::mem::replace(
                &mut step,
                Vec::with_capacity(data_parallel_size),
            ));
        }
    }
    grid
}
