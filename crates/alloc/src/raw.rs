use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};
use std::alloc::{alloc, dealloc};

use bytesize::ByteSize;
use log::error;

use crate::error::AllocError;

/// An owned, fixed-capacity region of uninitialized memory with room for `cap` values of `T`.
///
/// A `RawBuffer` only allocates and deallocates. It never constructs or drops a `T`, so whoever
/// owns it must drop (or move out) every live value before the buffer goes away.
///
/// When nothing is allocated (`cap == 0`, or `T` is zero-sized) the pointer is dangling but
/// well-aligned. It is never dereferenced.
pub struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

impl<T> RawBuffer<T> {
    /// Constructs an empty buffer. Does not allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates uninitialized storage for exactly `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the size of the region would exceed `isize::MAX` bytes, or if the global
    /// allocator cannot satisfy the request.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let layout = Self::layout(capacity)?;
        if layout.size() == 0 {
            // zero-sized values (or zero slots) need no memory
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap: capacity,
                _marker: PhantomData,
            });
        }

        // SAFETY: layout has a non-zero size
        let raw = unsafe { alloc(layout) };
        match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => Ok(Self {
                ptr,
                cap: capacity,
                _marker: PhantomData,
            }),
            None => {
                error!(
                    "failed to allocate a buffer of {} for {} elements",
                    ByteSize::b(layout.size() as u64).to_string_as(true),
                    capacity
                );
                Err(AllocError::OutOfMemory { layout })
            }
        }
    }

    fn layout(capacity: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)
    }

    /// Returns the number of values the buffer has room for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if the buffer owns a heap region.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.cap != 0 && mem::size_of::<T>() != 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// `offset == capacity` yields the one-past-the-end pointer, which may be compared against but
    /// not written through.
    ///
    /// # Safety
    ///
    /// `offset` must not exceed the capacity. This is only checked in debug builds.
    #[inline]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.cap,
            "slot offset (is {offset}) should be <= capacity (is {})",
            self.cap
        );
        self.ptr.as_ptr().add(offset)
    }

    /// Takes the region out of `self`, leaving it empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Exchanges regions with `other`. No values are touched.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

/// Moves `count` live values from `src` to `dst`.
///
/// Afterwards the source slots are logically uninitialized: they must not be dropped or read
/// again. A move is a bitwise copy that runs no user code, so relocation cannot panic and never
/// has to fall back to cloning.
///
/// # Safety
///
/// - `src` must point to `count` live values.
/// - `dst` must be valid for `count` writes.
/// - The two ranges must not overlap.
#[inline]
pub unsafe fn relocate<T>(src: *const T, dst: *mut T, count: usize) {
    ptr::copy_nonoverlapping(src, dst, count);
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // SAFETY: `with_capacity` only allocates once `Layout::array::<T>(cap)` succeeded, so
        // the size cannot overflow and the region was allocated with exactly this layout
        unsafe {
            let size = mem::size_of::<T>() * self.cap;
            let layout = Layout::from_size_align_unchecked(size, mem::align_of::<T>());
            debug_assert_eq!(Self::layout(self.cap).ok(), Some(layout));
            dealloc(self.ptr.as_ptr().cast(), layout);
        }
    }
}

impl<T> fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("cap", &self.cap)
            .finish()
    }
}

// SAFETY: the buffer owns its region exclusively
unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn zero_capacity_does_not_allocate() {
        let buf = RawBuffer::<u64>::with_capacity(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert!(!buf.is_allocated());

        let buf = RawBuffer::<u64>::new();
        assert_eq!(buf.capacity(), 0);
        assert!(!buf.is_allocated());
    }

    #[test]
    fn zero_sized_types_keep_capacity() {
        let buf = RawBuffer::<()>::with_capacity(16).unwrap();
        assert_eq!(buf.capacity(), 16);
        assert!(!buf.is_allocated());
    }

    #[test]
    fn slots_are_writable() {
        let buf = RawBuffer::<u32>::with_capacity(4).unwrap();
        assert!(buf.is_allocated());

        unsafe {
            for i in 0..4 {
                buf.slot(i).write(i as u32 * 10);
            }
            for i in 0..4 {
                assert_eq!(buf.slot(i).read(), i as u32 * 10);
            }
            assert_eq!(buf.slot(4), buf.slot(0).add(4));
        }
    }

    #[test]
    fn alignment() {
        #[repr(align(64))]
        struct Wide([u8; 64]);

        let buf = RawBuffer::<Wide>::with_capacity(3).unwrap();
        assert_eq!(buf.as_ptr() as usize % 64, 0);
    }

    #[test]
    fn capacity_overflow() {
        assert_eq!(
            RawBuffer::<u64>::with_capacity(usize::MAX).unwrap_err(),
            AllocError::CapacityOverflow
        );
    }

    #[test]
    fn out_of_memory() {
        let cap = (isize::MAX as usize) / mem::size_of::<u64>() - 1;
        match RawBuffer::<u64>::with_capacity(cap) {
            Err(AllocError::OutOfMemory { layout }) => {
                assert_eq!(layout.size(), cap * mem::size_of::<u64>());
            }
            other => panic!("expected out of memory, got {other:?}"),
        }
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a = RawBuffer::<u8>::with_capacity(8).unwrap();
        let addr = a.as_ptr();

        let b = a.take();
        assert_eq!(b.capacity(), 8);
        assert_eq!(b.as_ptr(), addr);
        assert_eq!(a.capacity(), 0);
        assert!(!a.is_allocated());
    }

    #[test]
    fn swap() {
        let mut a = RawBuffer::<u8>::with_capacity(2).unwrap();
        let mut b = RawBuffer::<u8>::with_capacity(5).unwrap();
        let (addr_a, addr_b) = (a.as_ptr(), b.as_ptr());

        a.swap(&mut b);
        assert_eq!(a.capacity(), 5);
        assert_eq!(b.capacity(), 2);
        assert_eq!(a.as_ptr(), addr_b);
        assert_eq!(b.as_ptr(), addr_a);
    }

    #[test]
    fn drop_leaves_values_alone() {
        struct Loud<'a>(&'a Cell<usize>);

        impl Drop for Loud<'_> {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Cell::new(0);
        let buf: RawBuffer<Loud<'_>> = RawBuffer::with_capacity(2).unwrap();
        unsafe {
            buf.slot(0).write(Loud(&drops));
            buf.slot(1).write(Loud(&drops));
        }
        drop(buf);
        assert_eq!(drops.get(), 0);
    }

    #[test]
    fn relocate_moves_values() {
        let src = RawBuffer::<String>::with_capacity(2).unwrap();
        let mut dst = RawBuffer::<String>::with_capacity(3).unwrap();
        unsafe {
            src.slot(0).write(String::from("a"));
            src.slot(1).write(String::from("b"));

            relocate(src.as_ptr(), dst.slot(1), 2);
            assert_eq!(&*dst.slot(1), "a");
            assert_eq!(&*dst.slot(2), "b");

            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(dst.as_mut_ptr().add(1), 2));
        }
    }
}
