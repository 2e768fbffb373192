// src/scheduler/mod.rs

//! Epoch-level schedule construction.
//!
//! Once per training epoch the scheduler draws the dataset's size-stratified
//! `(size, index)` pairs, partitions them into cost-balanced micro-batches,
//! shuffles the micro-batches with a permutation keyed by `epoch + seed`, and
//! reshapes the result into a `[step][worker]` grid. Balanced steps minimize
//! straggler-induced pipeline bubbles under synchronous data parallelism.
//!
//! Scheduling at epoch granularity is only effective for models whose
//! per-sample cost is linear in sample size; see [`SchedulerVariant`] for the
//! policy selection seam.

mod concat;
mod partition;
mod reshape;
mod shuffle;

pub use concat::concat;
pub use partition::karmarkar_karp;
pub use reshape::reshape;
pub use shuffle::shuffle;

use std::time::Instant;

use num_traits::NumCast;

use crate::config::ScheduleConfig;
use crate::dataset::Dataset;
use crate::error::{Result, SchedulerError};
use crate::types::{overflow_safe_cast, saturating_u64, saturating_usize, UnsignedInt};

/// One epoch's schedule: `grid[step][worker]` is the micro-batch of sample
/// indices delivered to that worker at that step.
pub type Schedule<I> = Vec<Vec<Vec<I>>>;

/// Epoch-granularity micro-batch scheduler for linear-cost models on
/// homogeneous workers.
///
/// The scheduler borrows the externally owned size table and owns the derived
/// [`Dataset`]. It holds no mutable state between calls beyond the epoch
/// counter recorded by [`on_epoch_begin`](Scheduler::on_epoch_begin); a
/// scheduler without configuration is meaningless, so there is no `Default`.
#[derive(Debug, Clone)]
pub struct Scheduler<'a, I, S> {
    data_parallel_size: I,
    epoch: I,
    global_batch_size: I,
    last_micro_batch_size: I,
    micro_batch_size: I,
    num_micro_batches: I,
    seed: I,
    dataset: Dataset<'a, I, S>,
}

impl<'a, I, S> Scheduler<'a, I, S>
where
    I: UnsignedInt,
    S: UnsignedInt,
{
    /// Creates a scheduler over `sizes`, where sample `i` costs `sizes[i]`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any batch-geometry invariant is
    /// violated: all parameters non-zero, `global_batch_size` divisible by
    /// `data_parallel_size`, the per-worker batch an integral number of
    /// micro-batches, and the dataset length a non-zero multiple of
    /// `data_parallel_size`.
    pub fn new(
        sizes: &'a [S],
        data_parallel_size: I,
        global_batch_size: I,
        micro_batch_size: I,
        seed: I,
    ) -> Result<Self> {
        let zero = I::zero();
        if data_parallel_size == zero {
            return Err(SchedulerError::config(
                "data_parallel_size must be greater than 0",
            ));
        }
        if global_batch_size == zero {
            return Err(SchedulerError::config(
                "global_batch_size must be greater than 0",
            ));
        }
        if micro_batch_size == zero {
            return Err(SchedulerError::config(
                "micro_batch_size must be greater than 0",
            ));
        }
        if global_batch_size % data_parallel_size != zero {
            return Err(SchedulerError::config(format!(
                "global_batch_size ({}) must be divisible by data_parallel_size ({})",
                saturating_u64(global_batch_size),
                saturating_u64(data_parallel_size)
            )));
        }
        if (global_batch_size / data_parallel_size) % micro_batch_size != zero {
            return Err(SchedulerError::config(format!(
                "per-worker batch ({}) must be an integral number of micro-batches of size {}",
                saturating_u64(global_batch_size / data_parallel_size),
                saturating_u64(micro_batch_size)
            )));
        }
        if sizes.is_empty() {
            return Err(SchedulerError::config("dataset must not be empty"));
        }
        let total: I = NumCast::from(sizes.len()).ok_or_else(|| {
            SchedulerError::config(format!(
                "dataset length {} does not fit the index type",
                sizes.len()
            ))
        })?;
        if total % data_parallel_size != zero {
            return Err(SchedulerError::config(format!(
                "dataset length ({}) must be divisible by data_parallel_size ({})",
                sizes.len(),
                saturating_u64(data_parallel_size)
            )));
        }

        let one = I::one();
        let per_worker = total / data_parallel_size;

        // (x - 1) / y + 1 equals ceil(x / y) without branches.
        let num_micro_batches =
            ((per_worker - one) / micro_batch_size + one) * data_parallel_size;

        // The dataset length is a multiple of the data parallel size but not
        // necessarily of the micro-batch size, so the per-worker tail batch
        // may be short. (x - 1) % y + 1 folds the aligned case into [1, y]
        // without branches.
        let last_micro_batch_size = (per_worker - one) % micro_batch_size + one;

        let dataset = Dataset::new(sizes, saturating_u64(seed))?;

        Ok(Self {
            data_parallel_size,
            epoch: zero,
            global_batch_size,
            last_micro_batch_size,
            micro_batch_size,
            num_micro_batches,
            seed,
            dataset,
        })
    }

    /// Creates a scheduler from a [`ScheduleConfig`], narrowing its `u64`
    /// fields into the index type.
    pub fn from_config(sizes: &'a [S], config: &ScheduleConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            sizes,
            narrow(config.data_parallel_size, "data_parallel_size")?,
            narrow(config.global_batch_size, "global_batch_size")?,
            narrow(config.micro_batch_size, "micro_batch_size")?,
            narrow(config.seed, "seed")?,
        )
    }

    /// Total number of micro-batches per epoch, a multiple of the data
    /// parallel size.
    pub fn num_micro_batches(&self) -> I {
        self.num_micro_batches
    }

    /// Cardinality of the final micro-batch per worker, in
    /// `[1, micro_batch_size]`.
    pub fn last_micro_batch_size(&self) -> I {
        self.last_micro_batch_size
    }

    /// Epoch recorded by the most recent `on_epoch_begin` (zero before the
    /// first call).
    pub fn epoch(&self) -> I {
        self.epoch
    }

    /// Builds the schedule for the current epoch.
    ///
    /// The grid contains every sample index exactly once. Each step holds one
    /// micro-batch of `micro_batch_size` samples per worker; when the
    /// per-worker sample count is not a multiple of the micro-batch size, a
    /// final ragged step of `last_micro_batch_size`-sample micro-batches is
    /// appended.
    ///
    /// Scheduling for linear-cost models on identical machines occurs at the
    /// granularity of an epoch, so any scheduling interval below that is
    /// ignored.
    pub fn schedule(&mut self) -> Schedule<I> {
        let data_parallel_size = saturating_usize(self.data_parallel_size);
        let global_batch_size = saturating_usize(self.global_batch_size);
        let micro_batch_size = saturating_usize(self.micro_batch_size);
        let num_micro_batches = saturating_usize(self.num_micro_batches);
        let shuffle_seed =
            saturating_u64(self.epoch).wrapping_add(saturating_u64(self.seed));

        let now = Instant::now();

        if self.micro_batch_size == self.last_micro_batch_size {
            let items = self.dataset.take(micro_batch_size * num_micro_batches);
            let micro_batches =
                karmarkar_karp(&items, num_micro_batches, overflow_safe_cast::<S>);

            tracing::info!(
                micro_batches = num_micro_batches as u64,
                elapsed_s = now.elapsed().as_secs_f64(),
                "partitioned samples into micro-batches"
            );
            let now = Instant::now();

            let grid = reshape(
                shuffle(micro_batches, shuffle_seed),
                data_parallel_size,
                global_batch_size,
            );

            tracing::info!(
                epoch = saturating_u64(self.epoch),
                elapsed_s = now.elapsed().as_secs_f64(),
                "inter-batch shuffling finished"
            );

            return grid;
        }

        // Ragged epoch: the last data_parallel_size micro-batches, one per
        // worker, are short. The main body is drawn first so the dataset's
        // per-epoch permutation is consumed in order.
        let main_partitions = num_micro_batches - data_parallel_size;
        let main_micro_batches = if main_partitions == 0 {
            Vec::new()
        } else {
            let items = self.dataset.take(micro_batch_size * main_partitions);
            karmarkar_karp(&items, main_partitions, overflow_safe_cast::<S>)
        };

        let last_items = self
            .dataset
            .take(saturating_usize(self.last_micro_batch_size) * data_parallel_size);
        let last_micro_batches =
            karmarkar_karp(&last_items, data_parallel_size, overflow_safe_cast::<S>);

        tracing::info!(
            micro_batches = num_micro_batches as u64,
            elapsed_s = now.elapsed().as_secs_f64(),
            "partitioned samples into micro-batches"
        );
        let now = Instant::now();

        let mut grid = reshape(
            shuffle(main_micro_batches, shuffle_seed),
            data_parallel_size,
            global_batch_size,
        );
        let last_grid = reshape(
            shuffle(last_micro_batches, shuffle_seed),
            data_parallel_size,
            global_batch_size,
        );
        concat(&mut grid, last_grid);

        tracing::info!(
            epoch = saturating_u64(self.epoch),
            elapsed_s = now.elapsed().as_secs_f64(),
            "inter-batch shuffling finished"
        );

        grid
    }

    /// A callback to be called at the beginning of an epoch.
    pub fn on_epoch_begin(&mut self, epoch: I) {
        self.epoch = epoch;
        self.dataset.on_epoch_begin(epoch);
    }

    /// A callback to be called at the end of an epoch.
    pub fn on_epoch_end(&mut self, epoch: I) {
        self.dataset.on_epoch_end(epoch);
    }

    /// A callback to be called at the beginning of a training batch.
    pub fn on_batch_begin(&self, batch: I) {
        self.dataset.on_batch_begin(batch);
    }

    /// A callback to be called at the end of a training batch.
    ///
    /// `rank` and `costs` are accepted and ignored; they exist so that
    /// cost-feedback scheduling policies can share this signature.
    pub fn on_batch_end(&self, batch: I, _rank: I, _costs: Option<&[f64]>) {
        self.dataset.on_batch_end(batch);
    }

    /// A callback to be called at the beginning of training.
    pub fn on_train_begin(&self) {
        self.dataset.on_train_begin();
    }

    /// A callback to be called at the end of training.
    pub fn on_train_end(&self) {
        self.dataset.on_train_end();
    }
}

fn narrow<I: UnsignedInt>(value: u64, name: &str) -> Result<I> {
    NumCast::from(value).ok_or_else(|| {
        SchedulerError::config(format!(
            "{name} ({value}) does not fit the scheduler's index type"
        ))
    })
}

/// Scheduling policy selection without dynamic dispatch.
///
/// Policies are concrete scheduler kinds behind a single outer `match` at
/// epoch boundaries. Only the linear-cost policy for homogeneous workers is
/// implemented; heterogeneous and sub-linear-cost kinds would slot in as
/// further variants.
#[derive(Debug, Clone)]
pub enum SchedulerVariant<'a, I, S> {
    /// Epoch-granularity scheduling for models whose per-sample cost is
    /// linear in sample size.
    Linear(Scheduler<'a, I, S>),
}

impl<'a, I, S> From<Scheduler<'a, I, S>> for SchedulerVariant<'a, I, S> {
    fn from(scheduler: Scheduler<'a, I, S>) -> Self {
        Self::Linear(scheduler)
    }
}

impl<'a, I, S> SchedulerVariant<'a, I, S>
where
    I: UnsignedInt,
    S: UnsignedInt,
{
    pub fn schedule(&mut self) -> Schedule<I> {
        match self {
            Self::Linear(scheduler) => scheduler.schedule(),
        }
    }

    pub fn on_epoch_begin(&mut self, epoch: I) {
        match self {
            Self::Linear(scheduler) => scheduler.on_epoch_begin(epoch),
        }
    }

    pub fn on_epoch_end(&mut self, epoch: I) {
        match self {
            Self::Linear(scheduler) => scheduler.on_epoch_end(epoch),
        }
    }

    pub fn on_batch_begin(&self, batch: I) {
        match self {
            Self::Linear(scheduler) => scheduler.on_batch_begin(batch),
        }
    }

    pub fn on_batch_end(&self, batch: I, rank: I, costs: Option<&[f64]>) {
        match self {
            Self::Linear(scheduler) => scheduler.on_batch_end(batch, rank, costs),
        }
    }

    pub fn on_train_begin(&self) {
        match self {
            Self::Linear(scheduler) => scheduler.on_train_begin(),
        }
    }

    pub fn on_train_end(&self) {
        match self {
            Self::Linear(scheduler) => scheduler.on_train_end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flatten(grid: &Schedule<u32>) -> Vec<u32> {
        grid.iter()
            .flat_map(|step| step.iter().flatten().copied())
            .collect()
    }

    fn assert_covers(grid: &Schedule<u32>, n: u32) {
        let mut indices = flatten(grid);
        indices.sort_unstable();
        assert_eq!(indices, (0..n).collect::<Vec<u32>>());
    }

    #[test]
    fn test_uniform_sizes_aligned_grid() {
        // 8 samples, 2 workers, micro-batches of 1: 4 steps of 2 singleton
        // micro-batches.
        let sizes = vec![1u32; 8];
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 4, 1, 0).unwrap();
        scheduler.on_epoch_begin(0);

        let grid = scheduler.schedule();

        assert_eq!(grid.len(), 4);
        for step in &grid {
            assert_eq!(step.len(), 2);
            for micro_batch in step {
                assert_eq!(micro_batch.len(), 1);
            }
        }
        assert_covers(&grid, 8);
    }

    #[test]
    fn test_bimodal_singleton_micro_batches() {
        let sizes = vec![10u32, 1, 10, 1, 10, 1, 10, 1];
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 2, 1, 0).unwrap();
        scheduler.on_epoch_begin(0);

        let grid = scheduler.schedule();

        assert_eq!(grid.len(), 4);
        for step in &grid {
            assert_eq!(step.len(), 2);
            assert_eq!(step[0].len(), 1);
            assert_eq!(step[1].len(), 1);
        }
        assert_covers(&grid, 8);

        // Same inputs, second instance: byte-identical grid.
        let mut other: Scheduler<'_, u32, u32> = Scheduler::new(&sizes, 2, 2, 1, 0).unwrap();
        other.on_epoch_begin(0);
        assert_eq!(grid, other.schedule());
    }

    #[test]
    fn test_ragged_epoch_appends_short_step() {
        // per_worker = 3 with micro-batches of 2: one aligned step plus a
        // ragged step of single-sample micro-batches.
        let sizes = vec![3u32, 1, 4, 1, 5, 9];
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 4, 2, 7).unwrap();
        assert_eq!(scheduler.num_micro_batches(), 4);
        assert_eq!(scheduler.last_micro_batch_size(), 1);

        scheduler.on_epoch_begin(3);
        let grid = scheduler.schedule();

        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].len(), 2);
        assert_eq!(grid[0][0].len(), 2);
        assert_eq!(grid[0][1].len(), 2);
        assert_eq!(grid[1].len(), 2);
        assert_eq!(grid[1][0].len(), 1);
        assert_eq!(grid[1][1].len(), 1);
        assert_covers(&grid, 6);
    }

    #[test]
    fn test_minimal_ragged_epoch_has_no_main_body() {
        // per_worker = 1 < micro_batch_size: the whole epoch is the ragged
        // step.
        let sizes = vec![6u32, 2];
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 4, 2, 0).unwrap();
        scheduler.on_epoch_begin(0);

        let grid = scheduler.schedule();

        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].len(), 2);
        assert_eq!(grid[0][0].len(), 1);
        assert_eq!(grid[0][1].len(), 1);
        assert_covers(&grid, 2);
    }

    #[test]
    fn test_distinct_epochs_yield_distinct_permutations() {
        let sizes: Vec<u32> = (1..=16).collect();
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 4, 8, 2, 42).unwrap();

        scheduler.on_epoch_begin(0);
        let epoch0 = scheduler.schedule();
        scheduler.on_epoch_begin(1);
        let epoch1 = scheduler.schedule();

        assert_covers(&epoch0, 16);
        assert_covers(&epoch1, 16);
        assert_ne!(epoch0, epoch1);
    }

    #[test]
    fn test_constructor_rejects_unsplittable_dataset() {
        let sizes = vec![1u32; 5];
        let result: Result<Scheduler<'_, u32, u32>> = Scheduler::new(&sizes, 2, 2, 1, 0);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("dataset length"));
    }

    #[test]
    fn test_constructor_rejects_fractional_micro_batch_count() {
        // Per-worker batch 6 / 2 = 3 is not a multiple of micro-batch size 4.
        let sizes = vec![1u32; 8];
        let result: Result<Scheduler<'_, u32, u32>> = Scheduler::new(&sizes, 2, 6, 4, 0);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("micro-batches"));
    }

    #[test]
    fn test_constructor_rejects_zero_parameters() {
        let sizes = vec![1u32; 4];
        assert!(Scheduler::<u32, u32>::new(&sizes, 0, 2, 1, 0).is_err());
        assert!(Scheduler::<u32, u32>::new(&sizes, 2, 0, 1, 0).is_err());
        assert!(Scheduler::<u32, u32>::new(&sizes, 2, 2, 0, 0).is_err());
        assert!(Scheduler::<u32, u32>::new(&[], 2, 2, 1, 0).is_err());
    }

    #[test]
    fn test_ragged_schedule_is_deterministic() {
        let sizes: Vec<u32> = (0..30).map(|i| (i * 37) % 11 + 1).collect();

        let mut first: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 3, 12, 4, 13).unwrap();
        let mut second: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 3, 12, 4, 13).unwrap();

        first.on_epoch_begin(5);
        second.on_epoch_begin(5);
        assert_eq!(first.schedule(), second.schedule());
    }

    #[test]
    fn test_schedule_before_epoch_begin_defaults_to_epoch_zero() {
        let sizes: Vec<u32> = (1..=8).collect();

        let mut eager: Scheduler<'_, u32, u32> = Scheduler::new(&sizes, 2, 4, 2, 9).unwrap();
        let mut driven: Scheduler<'_, u32, u32> = Scheduler::new(&sizes, 2, 4, 2, 9).unwrap();
        driven.on_epoch_begin(0);

        assert_eq!(eager.epoch(), 0);
        // Distinct sizes make the epoch-0 intra-group shuffle a no-op, so
        // the defensive default must reproduce the driven epoch-0 grid.
        let grid = eager.schedule();
        assert_covers(&grid, 8);
        assert_eq!(grid, driven.schedule());
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_second_schedule_without_epoch_begin_panics() {
        let sizes = vec![1u32; 8];
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 4, 2, 0).unwrap();
        scheduler.on_epoch_begin(0);
        let _ = scheduler.schedule();
        let _ = scheduler.schedule();
    }

    #[test]
    fn test_micro_batch_sums_stay_within_loose_bound() {
        let sizes: Vec<u32> = (0..64).map(|i| (i * 7919) % 100 + 1).collect();
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 4, 16, 4, 0).unwrap();
        scheduler.on_epoch_begin(0);

        let grid = scheduler.schedule();
        let sums: Vec<u64> = grid
            .iter()
            .flat_map(|step| step.iter())
            .map(|micro_batch| {
                micro_batch
                    .iter()
                    .map(|&index| sizes[index as usize] as u64)
                    .sum()
            })
            .collect();

        let spread = sums.iter().max().unwrap() - sums.iter().min().unwrap();
        let max_size = *sizes.iter().max().unwrap() as u64;
        let num_micro_batches = sums.len() as u64;
        assert!(spread <= max_size * num_micro_batches);
    }

    #[test]
    fn test_from_config() {
        let sizes: Vec<u32> = (1..=12).collect();
        let config = ScheduleConfig {
            data_parallel_size: 2,
            global_batch_size: 8,
            micro_batch_size: 2,
            seed: 11,
        };

        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::from_config(&sizes, &config).unwrap();
        scheduler.on_epoch_begin(0);
        assert_covers(&scheduler.schedule(), 12);
    }

    #[test]
    fn test_from_config_rejects_values_too_wide_for_index_type() {
        let sizes = vec![1u32; 4];
        let config = ScheduleConfig {
            data_parallel_size: 2,
            global_batch_size: 300,
            micro_batch_size: 1,
            seed: 0,
        };

        let result: Result<Scheduler<'_, u8, u32>> = Scheduler::from_config(&sizes, &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_wider_size_than_index_type() {
        let sizes: Vec<u64> = (1..=8).map(|i| i * 1_000_000_000_000).collect();
        let mut scheduler: Scheduler<'_, u16, u64> =
            Scheduler::new(&sizes, 2, 4, 2, 1).unwrap();
        scheduler.on_epoch_begin(0);

        let grid = scheduler.schedule();
        let mut indices: Vec<u16> = grid
            .iter()
            .flat_map(|step| step.iter().flatten().copied())
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..8).collect::<Vec<u16>>());
    }

    #[test]
    fn test_variant_dispatches_to_linear_policy() {
        let sizes: Vec<u32> = (1..=8).collect();
        let scheduler: Scheduler<'_, u32, u32> = Scheduler::new(&sizes, 2, 4, 2, 0).unwrap();
        let mut variant = SchedulerVariant::from(scheduler);

        variant.on_train_begin();
        variant.on_epoch_begin(0);
        let grid = variant.schedule();
        variant.on_batch_begin(0);
        variant.on_batch_end(0, 1, Some(&[0.5, 0.25]));
        variant.on_epoch_end(0);
        variant.on_train_end();

        assert_covers(&grid, 8);
    }

    #[test]
    fn test_epoch_lifecycle_smoke() {
        let sizes: Vec<u32> = (0..24).map(|i| i % 7 + 1).collect();
        let mut scheduler: Scheduler<'_, u32, u32> =
            Scheduler::new(&sizes, 2, 8, 2, 123).unwrap();

        scheduler.on_train_begin();
        for epoch in 0..3 {
            scheduler.on_epoch_begin(epoch);
            let grid = scheduler.schedule();
            assert_covers(&grid, 24);

            for batch in 0..grid.len() as u32 {
                scheduler.on_batch_begin(batch);
                scheduler.on_batch_end(batch, 0, None);
            }
            scheduler.on_epoch_end(epoch);
        }
        scheduler.on_train_end();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_schedule_covers_shapes_and_repeats(
            data_parallel_size in 1usize..=4,
            micro_batch_size in 1usize..=4,
            micro_batches_per_worker_batch in 1usize..=2,
            per_worker in 1usize..=13,
            size_seed in any::<u64>(),
            seed in 0u32..=1_000,
            epoch in 0u32..=3,
        ) {
            let n = data_parallel_size * per_worker;
            let global_batch_size =
                data_parallel_size * micro_batch_size * micro_batches_per_worker_batch;

            let mut rng = ChaCha8Rng::seed_from_u64(size_seed);
            let sizes: Vec<u32> = (0..n).map(|_| rng.gen_range(1..512)).collect();

            let mut scheduler: Scheduler<'_, u32, u32> = Scheduler::new(
                &sizes,
                data_parallel_size as u32,
                global_batch_size as u32,
                micro_batch_size as u32,
                seed,
            )
            .unwrap();
            scheduler.on_epoch_begin(epoch);
            let grid = scheduler.schedule();

            // Coverage: exactly the multiset [0, n).
            assert_covers(&grid, n as u32);

            // Shape: num_micro_batches / P steps of P micro-batches, the
            // final step ragged when per_worker is not a multiple of M.
            let num_micro_batches = scheduler.num_micro_batches() as usize;
            let last = scheduler.last_micro_batch_size() as usize;
            prop_assert_eq!(grid.len(), num_micro_batches / data_parallel_size);
            for (r, step) in grid.iter().enumerate() {
                prop_assert_eq!(step.len(), data_parallel_size);
                let expected = if r + 1 == grid.len() { last } else { micro_batch_size };
                for micro_batch in step {
                    prop_assert_eq!(micro_batch.len(), expected);
                }
            }

            // Determinism: a second instance produces a byte-identical grid.
            let mut other: Scheduler<'_, u32, u32> = Scheduler::new(
                &sizes,
                data_parallel_size as u32,
                global_batch_size as u32,
                micro_batch_size as u32,
                seed,
            )
            .unwrap();
            other.on_epoch_begin(epoch);
            prop_assert_eq!(grid, other.schedule());
        }
    }
}
