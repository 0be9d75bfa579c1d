//! A growable contiguous array built from scratch on raw storage.
//!
//! ```
//! let mut v = ballast::vec![1, 2, 3];
//! v.resize(5);
//! assert_eq!(v.as_slice(), &[1, 2, 3, 0, 0]);
//!
//! v.insert(1, 99);
//! assert_eq!(v.remove(0), 1);
//! assert_eq!(v.as_slice(), &[99, 2, 3, 0, 0]);
//! ```

pub use ballast_alloc::{
    containers, raw, AllocError, IntoIter, RawBuffer, Vec, GROWTH_FACTOR, MIN_NON_ZERO_CAP,
};

/// Constructs a [`Vec`] from a list of elements, or from an element and a count.
///
/// `vec![x; n]` clones `x` and requires `T: Clone`.
#[macro_export]
macro_rules! vec {
    () => {
        $crate::Vec::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Vec::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Vec::from([$($x),+])
    };
}

#[cfg(test)]
mod tests {
    use super::Vec;

    #[test]
    fn vec_macro() {
        let empty: Vec<u8> = vec![];
        assert!(empty.is_empty());

        let filled = vec![String::from("a"); 3];
        assert_eq!(filled.as_slice(), &["a", "a", "a"]);

        let listed = vec![1, 2, 3,];
        assert_eq!(listed.as_slice(), &[1, 2, 3]);
        assert_eq!(listed.capacity(), 3);
    }
}
