// src/dataset/mod.rs

//! Size-keyed dataset façade.
//!
//! The scheduler draws `(size, index)` pairs from this façade once per epoch.
//! The façade borrows the externally owned size table (zero-copy; the backing
//! storage must outlive it) and materializes a size-stratified ordering of
//! the sample indices: pairs are sorted ascending by `(size, index)`, and at
//! every `on_epoch_begin` the indices *within* each equal-size group are
//! re-shuffled with a PRNG keyed by `seed + epoch`. The global stratification
//! is therefore stable while ties rotate deterministically from epoch to
//! epoch, and the union of `take` results across one epoch is always a
//! permutation of `[0, N)`.

use num_traits::NumCast;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SchedulerError};
use crate::types::{saturating_u64, UnsignedInt};

/// Deterministic, size-stratified source of `(size, index)` pairs.
#[derive(Debug, Clone)]
pub struct Dataset<'a, I, S> {
    sizes: &'a [S],
    seed: u64,
    /// Current epoch's materialization, sorted ascending by `(size, index)`
    /// with per-epoch intra-group permutation applied.
    items: Vec<(S, I)>,
    cursor: usize,
}

impl<'a, I, S> Dataset<'a, I, S>
where
    I: UnsignedInt,
    S: UnsignedInt,
{
    /// Creates a dataset over an externally owned size table.
    ///
    /// Sample `i` is identified by index `i` and costs `sizes[i]`. The
    /// initial materialization is the canonical ascending `(size, index)`
    /// order; `on_epoch_begin` introduces the per-epoch permutation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the table length does not fit the
    /// index type `I`.
    pub fn new(sizes: &'a [S], seed: u64) -> Result<Self> {
        let mut items = Vec::with_capacity(sizes.len());
        for (index, &size) in sizes.iter().enumerate() {
            let index: I = NumCast::from(index).ok_or_else(|| {
                SchedulerError::config(format!(
                    "dataset length {} does not fit the index type",
                    sizes.len()
                ))
            })?;
            items.push((size, index));
        }
        items.sort_unstable();

        Ok(Self {
            sizes,
            seed,
            items,
            cursor: 0,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Pairs not yet taken in the current epoch.
    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    /// Returns the next `n` pairs of the current epoch's materialization.
    ///
    /// Successive calls within one epoch return disjoint, order-stable
    /// slices. Requesting more pairs than remain in the epoch is a caller
    /// bug and aborts.
    pub fn take(&mut self, n: usize) -> Vec<(S, I)> {
        assert!(
            n <= self.remaining(),
            "epoch materialization exhausted: requested {} pairs with {} remaining \
             (was on_epoch_begin called?)",
            n,
            self.remaining()
        );
        let taken = self.items[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        taken
    }

    /// Resets the epoch cursor and derives the epoch's materialization.
    ///
    /// Indices are shuffled within each run of equal sizes; the shuffle is a
    /// pure function of `(seed, epoch)`.
    pub fn on_epoch_begin(&mut self, epoch: I) {
        self.cursor = 0;

        // Re-sorting restores the canonical order before the epoch
        // permutation is applied, so the result never depends on the
        // previous epoch.
        self.items.sort_unstable();

        let mut rng =
            ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(saturating_u64(epoch)));
        let mut start = 0;
        while start < self.items.len() {
            let size = self.items[start].0;
            let mut end = start + 1;
            while end < self.items.len() && self.items[end].0 == size {
                end += 1;
            }
            self.items[start..end].shuffle(&mut rng);
            start = end;
        }

        tracing::debug!(epoch = saturating_u64(epoch), "dataset epoch begun");
    }

    pub fn on_epoch_end(&mut self, epoch: I) {
        tracing::debug!(
            epoch = saturating_u64(epoch),
            remaining = self.remaining(),
            "dataset epoch finished"
        );
    }

    pub fn on_batch_begin(&self, batch: I) {
        tracing::trace!(batch = saturating_u64(batch), "batch begun");
    }

    pub fn on_batch_end(&self, batch: I) {
        tracing::trace!(batch = saturating_u64(batch), "batch finished");
    }

    pub fn on_train_begin(&self) {
        tracing::debug!(samples = self.len(), "training begun");
    }

    pub fn on_train_end(&self) {
        tracing::debug!("training finished");
    }
}
