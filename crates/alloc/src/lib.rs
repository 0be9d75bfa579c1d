//! Raw buffers and the growable array built on top of them.
//!
//! [`RawBuffer`] owns uninitialized storage and nothing else. [`Vec`] owns one buffer plus a count
//! of live elements, and does all element construction, relocation and destruction itself.

mod constants;
pub mod containers;
mod error;
pub mod raw;
#[cfg(test)]
pub(crate) mod testing;

pub use constants::{GROWTH_FACTOR, MIN_NON_ZERO_CAP};
pub use containers::{IntoIter, Vec};
pub use error::AllocError;
pub use raw::RawBuffer;
