/// Capacity of the first buffer an empty `Vec` allocates under insertion pressure.
pub const MIN_NON_ZERO_CAP: usize = 1;
/// A full `Vec` multiplies its capacity by this much when it has to grow.
pub const GROWTH_FACTOR: usize = 2;

/// Returns the capacity a full vector of `len` elements grows to.
#[inline]
pub(crate) const fn grown_capacity(len: usize) -> Result<usize, crate::AllocError> {
    match len.checked_mul(GROWTH_FACTOR) {
        Some(cap) if cap < MIN_NON_ZERO_CAP => Ok(MIN_NON_ZERO_CAP),
        Some(cap) => Ok(cap),
        None => Err(crate::AllocError::CapacityOverflow),
    }
}
