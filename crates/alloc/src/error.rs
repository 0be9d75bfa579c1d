use core::{alloc::Layout, fmt};
use std::error::Error;

/// An error with allocating memory for a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity (in bytes) exceeds `isize::MAX`.
    CapacityOverflow,
    /// The global allocator could not satisfy the request.
    OutOfMemory {
        /// The layout that was requested.
        layout: Layout,
    },
}

impl AllocError {
    /// Turns the error into a panic or an allocation-error abort, the way `std` collections do.
    pub(crate) fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::OutOfMemory { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::OutOfMemory { layout } => write!(
                f,
                "out of memory: failed to allocate {} bytes (align {})",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl Error for AllocError {}

/// Unwraps the result of a fallible allocation.
pub(crate) fn infallible<T>(result: Result<T, AllocError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => err.handle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(AllocError::CapacityOverflow.to_string(), "capacity overflow");

        let layout = Layout::from_size_align(64, 8).unwrap();
        assert_eq!(
            AllocError::OutOfMemory { layout }.to_string(),
            "out of memory: failed to allocate 64 bytes (align 8)"
        );
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn infallible_overflow_panics() {
        infallible::<()>(Err(AllocError::CapacityOverflow));
    }
}
