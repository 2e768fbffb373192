//! Integer-type parameterization shared across the crate.
//!
//! The scheduler is generic over its index and size types so that callers can
//! match whatever width their dataset metadata uses. Both parameters are
//! constrained to primitive unsigned integers.

use std::fmt::Debug;

use num_traits::{PrimInt, Unsigned};

/// Bound alias for the `Index` and `Size` type parameters.
///
/// Implemented for every primitive unsigned integer type.
pub trait UnsignedInt: PrimInt + Unsigned + Debug + Send + Sync {}

impl<T> UnsignedInt for T where T: PrimInt + Unsigned + Debug + Send + Sync {}

/// Monotone widening cast into the cost accumulator domain.
///
/// Partition slot sums are accumulated in `u128` with saturating addition, so
/// the sum of any group of casted sizes cannot wrap regardless of the source
/// width.
pub fn overflow_safe_cast<S: UnsignedInt>(size: S) -> u128 {
    size.to_u128().unwrap_or(u128::MAX)
}

/// Saturating fold of an unsigned value into a 64-bit word, used for PRNG
/// seeding and log fields.
pub(crate) fn saturating_u64<T: UnsignedInt>(value: T) -> u64 {
    value.to_u64().unwrap_or(u64::MAX)
}

/// Saturating conversion into a host count.
pub(crate) fn saturating_usize<T: UnsignedInt>(value: T) -> usize {
    value.to_usize().unwrap_or(usize::MAX)
}
