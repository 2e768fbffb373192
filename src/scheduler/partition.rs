// src/scheduler/partition.rs

//! Equal-cardinality multiway balanced number partitioning.
//!
//! This is a differencing heuristic in the spirit of Karmarkar–Karp,
//! generalized from 2-way set differencing to `k` groups under a hard
//! equal-cardinality constraint. Partial solutions carry `k` slots each; the
//! two solutions whose slot sums are most spread out are repeatedly merged by
//! pairing the fullest slots of one against the emptiest slots of the other,
//! which cancels the bulk of the imbalance at every step.
//!
//! Every comparison breaks ties lexicographically on `(size, index)`, so the
//! result depends only on the multiset of input pairs, not on their order and
//! not on the rayon thread count.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;

use crate::types::UnsignedInt;

/// Input length above which sorting and seeding fan out to the rayon pool.
const PARALLEL_THRESHOLD: usize = 4096;

/// One group under construction: accumulated cost and members.
struct Slot<I, S> {
    sum: u128,
    /// Lexicographically smallest `(size, index)` member; the tie-break key.
    key: (S, I),
    items: Vec<(S, I)>,
}

/// A partial solution: `k` slots of identical cardinality, sorted descending
/// by `(sum, key)`.
struct Partial<I, S> {
    slots: Vec<Slot<I, S>>,
    /// Smallest `(size, index)` across all member items.
    key: (S, I),
}

impl<I, S> Partial<I, S>
where
    I: UnsignedInt,
    S: UnsignedInt,
{
    /// Seeds a partial solution from one run of `k` consecutive items of the
    /// descending-sorted input, one item per slot. Runs of a sorted slice are
    /// already in slot order.
    fn seed<F: Fn(S) -> u128>(run: &[(S, I)], cast: &F) -> Self {
        let slots = run
            .iter()
            .map(|&(size, index)| Slot {
                sum: cast(size),
                key: (size, index),
                items: vec![(size, index)],
            })
            .collect();
        // The run is descending, so its smallest member is at the end.
        let key = run[run.len() - 1];
        Self { slots, key }
    }

    /// Difference between the fullest and emptiest slot.
    fn spread(&self) -> u128 {
        self.slots[0].sum - self.slots[self.slots.len() - 1].sum
    }
}

impl<I: UnsignedInt, S: UnsignedInt> Ord for Partial<I, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.spread()
            .cmp(&other.spread())
            .then_with(|| {
                for (lhs, rhs) in self.slots.iter().zip(other.slots.iter()) {
                    match lhs.sum.cmp(&rhs.sum) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                Ordering::Equal
            })
            // Member sets are disjoint, so the keys make the order total.
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl<I: UnsignedInt, S: UnsignedInt> PartialOrd for Partial<I, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: UnsignedInt, S: UnsignedInt> PartialEq for Partial<I, S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I: UnsignedInt, S: UnsignedInt> Eq for Partial<I, S> {}

/// Merges two partial solutions by pairing the fullest slots of `first`
/// against the emptiest slots of `second`, subject to the per-slot
/// cardinality cap. A pairing that would exceed the cap is rejected and the
/// next-emptiest slot taken instead.
fn merge<I, S>(first: Partial<I, S>, second: Partial<I, S>, cap: usize) -> Partial<I, S>
where
    I: UnsignedInt,
    S: UnsignedInt,
{
    let key = first.key.min(second.key);
    let mut partners: Vec<Option<Slot<I, S>>> = second.slots.into_iter().map(Some).collect();
    let mut slots = Vec::with_capacity(first.slots.len());

    for slot in first.slots {
        // `partners` is descending; reverse iteration scans emptiest-first.
        let chosen = partners
            .iter()
            .enumerate()
            .rev()
            .find(|(_, partner)| {
                partner
                    .as_ref()
                    .map_or(false, |p| slot.items.len() + p.items.len() <= cap)
            })
            .map(|(position, _)| position)
            .expect(
                "a cardinality-feasible slot pairing always exists while slot \
                 cardinalities are uniform within each partial solution",
            );
        let partner = partners[chosen]
            .take()
            .expect("chosen partner slot is present");

        let mut items = slot.items;
        items.extend(partner.items);
        slots.push(Slot {
            sum: slot.sum.saturating_add(partner.sum),
            key: slot.key.min(partner.key),
            items,
        });
    }

    slots.sort_unstable_by(|lhs, rhs| (rhs.sum, rhs.key).cmp(&(lhs.sum, lhs.key)));
    Partial { slots, key }
}

/// Partitions `items` into `num_partitions` groups of identical cardinality
/// whose size sums are approximately balanced, and returns the groups as
/// sequences of sample indices ordered by descending group sum.
///
/// `cast` widens sizes into the accumulator domain; see
/// [`overflow_safe_cast`](crate::types::overflow_safe_cast).
///
/// The input length must be a non-zero multiple of `num_partitions`; a
/// violation indicates a bug in the caller's derivation and aborts.
pub fn karmarkar_karp<I, S, F>(items: &[(S, I)], num_partitions: usize, cast: F) -> Vec<Vec<I>>
where
    I: UnsignedInt,
    S: UnsignedInt,
    F: Fn(S) -> u128 + Sync,
{
    assert_ne!(num_partitions, 0, "partition count must be non-zero");
    assert!(!items.is_empty(), "cannot partition an empty item sequence");
    assert_eq!(
        items.len() % num_partitions,
        0,
        "item count {} is not divisible by partition count {}",
        items.len(),
        num_partitions
    );
    let cardinality = items.len() / num_partitions;

    // Descending by (size, index). The pairs are distinct, so the comparator
    // is a total order and the unstable parallel sort has a single fixed
    // answer at any thread count.
    let mut ordered = items.to_vec();
    if ordered.len() >= PARALLEL_THRESHOLD {
        ordered.par_sort_unstable_by(|lhs, rhs| rhs.cmp(lhs));
    } else {
        ordered.sort_unstable_by(|lhs, rhs| rhs.cmp(lhs));
    }

    // One partial solution per run of `num_partitions` items. Seeding runs
    // rather than single items keeps slot cardinalities uniform inside every
    // partial solution, so each of the `cardinality` merges below can always
    // satisfy the cap.
    let partials: Vec<Partial<I, S>> = if ordered.len() >= PARALLEL_THRESHOLD {
        ordered
            .par_chunks(num_partitions)
            .map(|run| Partial::seed(run, &cast))
            .collect()
    } else {
        ordered
            .chunks(num_partitions)
            .map(|run| Partial::seed(run, &cast))
            .collect()
    };

    let mut heap = BinaryHeap::from(partials);
    while heap.len() > 1 {
        let first = heap.pop().expect("heap holds at least two partial solutions");
        let second = heap.pop().expect("heap holds at least two partial solutions");
        heap.push(merge(first, second, cardinality));
    }

    let solution = heap.pop().expect("one partial solution survives");
    solution
        .slots
        .into_iter()
        .map(|slot| slot.items.into_iter().map(|(_, index)| index).collect())
        .collect()
}
