use core::{
    borrow::{Borrow, BorrowMut},
    fmt,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut},
    ptr, slice,
};

use log::trace;

use super::into_iter::IntoIter;
use crate::{
    constants::grown_capacity,
    error::{infallible, AllocError},
    raw::{relocate, RawBuffer},
};

/// A contiguous growable array type, written as `Vec<T>`, short for 'vector'.
///
/// Slots `[0, len)` of the buffer hold live values and slots `[len, capacity)` are uninitialized.
/// Every method restores that split before it returns, including when a `T` method panics
/// part-way through.
///
/// Constructors, `reserve`, `resize`, `push`, `insert`, `clone` and `extend_from_slice` come in
/// pairs. The `try_*` form returns [`AllocError`] and the plain form panics on capacity overflow
/// and aborts through [`handle_alloc_error`](std::alloc::handle_alloc_error) when memory runs
/// out. Trait conversions (`From`, `Extend`, `FromIterator`) only have the plain form.
pub struct Vec<T> {
    buf: RawBuffer<T>,
    len: usize,
}

impl<T> Vec<T> {
    /// Constructs a new, empty `Vec<T>`. Does not allocate.
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Constructs a new, empty `Vec<T>` with room for exactly `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            buf: RawBuffer::with_capacity(capacity)?,
            len: 0,
        })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::try_with_capacity(capacity))
    }

    /// Constructs a `Vec<T>` holding `len` default values, with a capacity of exactly `len`.
    ///
    /// If `T::default` panics, the values built so far are dropped and the buffer is released.
    pub fn try_with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let mut vec = Self::try_with_capacity(len)?;
        vec.fill_tail_with(len, T::default);
        Ok(vec)
    }

    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        infallible(Self::try_with_len(len))
    }

    /// Constructs a `Vec<T>` holding `len` clones of `elem`, with a capacity of exactly `len`.
    pub fn try_from_elem(elem: T, len: usize) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut vec = Self::try_with_capacity(len)?;
        vec.fill_tail_with(len, || elem.clone());
        Ok(vec)
    }

    pub fn from_elem(elem: T, len: usize) -> Self
    where
        T: Clone,
    {
        infallible(Self::try_from_elem(elem, len))
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are live
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots [0, len) are live
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Ensures the vector can hold at least `capacity` elements in total.
    ///
    /// Unlike `std`, the argument is the total capacity, not the number of additional elements.
    /// When the vector has to grow it allocates exactly `capacity` slots and moves the live
    /// elements over. Nothing is touched if the allocation fails.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let mut new_buf: RawBuffer<T> = RawBuffer::with_capacity(capacity)?;
        trace!(
            "relocating {} elements: capacity {} -> {}",
            self.len,
            self.capacity(),
            capacity
        );
        // SAFETY: the new buffer has room for `len` values and is a separate region
        unsafe { relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), self.len) };
        // old region now only holds moved-out slots, so dropping it only deallocates
        self.buf.swap(&mut new_buf);
        Ok(())
    }

    pub fn reserve(&mut self, capacity: usize) {
        infallible(self.try_reserve(capacity))
    }

    /// Makes room for `needed` elements, growing by at least the growth factor.
    fn try_grow_for(&mut self, needed: usize) -> Result<(), AllocError> {
        if needed <= self.capacity() {
            return Ok(());
        }
        self.try_reserve(needed.max(grown_capacity(self.len)?))
    }

    /// Resizes the vector in place so that `len` is equal to `new_len`.
    ///
    /// Shrinking drops the excess tail. Growing reserves exactly `new_len` slots and fills the
    /// new tail with values returned by `f`. If `f` panics, every value produced so far stays in
    /// the vector.
    pub fn try_resize_with<F>(&mut self, new_len: usize, f: F) -> Result<(), AllocError>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_reserve(new_len)?;
        self.fill_tail_with(new_len, f);
        Ok(())
    }

    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        infallible(self.try_resize_with(new_len, f))
    }

    /// Like [`try_resize_with`](Self::try_resize_with), filling with `T::default()`.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, T::default)
    }

    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        infallible(self.try_resize(new_len))
    }

    /// Constructs values in the uninitialized tail until `len == new_len`.
    ///
    /// `len` is bumped after every write, so a panicking `f` leaves only live slots counted.
    fn fill_tail_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        debug_assert!(new_len <= self.capacity());
        while self.len < new_len {
            // SAFETY: len < new_len <= capacity
            unsafe { self.buf.slot(self.len).write(f()) };
            self.len += 1;
        }
    }

    /// Shortens the vector to `len` elements, dropping the rest. Does nothing if `len` is not
    /// smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        // SAFETY: len < self.len <= capacity, and slots [len, self.len) are live
        let tail = unsafe { ptr::slice_from_raw_parts_mut(self.buf.slot(len), self.len - len) };
        // shrink first, so a panicking destructor cannot cause a double drop
        self.len = len;
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Appends `value` to the back of the vector.
    pub fn try_push(&mut self, value: T) -> Result<(), AllocError> {
        self.try_emplace_with(self.len, || value).map(|_| ())
    }

    pub fn push(&mut self, value: T) {
        infallible(self.try_push(value))
    }

    /// Constructs a value with `f` at the back of the vector and returns a reference to it.
    pub fn emplace_back_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        infallible(self.try_emplace_with(self.len, f))
    }

    /// Inserts `value` at `index`, shifting every element after it one slot back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, AllocError> {
        self.try_emplace_with(index, || value)
    }

    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        infallible(self.try_insert(index, value))
    }

    /// Constructs a value with `f` at `index`, shifting every element after it one slot back, and
    /// returns a reference to the new element.
    ///
    /// A full vector grows to `max(1, 2 * len)`. The new value is built first, so if `f` panics
    /// (or the allocation fails) the vector is left exactly as it was.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_emplace_with<F>(&mut self, index: usize, f: F) -> Result<&mut T, AllocError>
    where
        F: FnOnce() -> T,
    {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );

        if self.len == self.capacity() {
            self.emplace_with_realloc(index, f)?;
        } else {
            self.emplace_without_realloc(index, f);
        }

        // SAFETY: index < len, so the slot is live
        Ok(unsafe { &mut *self.buf.slot(index) })
    }

    pub fn emplace_with<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        infallible(self.try_emplace_with(index, f))
    }

    fn emplace_with_realloc<F>(&mut self, index: usize, f: F) -> Result<(), AllocError>
    where
        F: FnOnce() -> T,
    {
        let new_cap = grown_capacity(self.len)?;
        let mut new_buf: RawBuffer<T> = RawBuffer::with_capacity(new_cap)?;
        trace!(
            "relocating {} elements around index {}: capacity {} -> {}",
            self.len,
            index,
            self.capacity(),
            new_cap
        );

        // SAFETY: index <= len < new_cap. If `f` panics, `new_buf` is released and the old
        // buffer was never touched.
        unsafe {
            new_buf.slot(index).write(f());
            relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), index);
            relocate(
                self.buf.slot(index),
                new_buf.slot(index + 1),
                self.len - index,
            );
        }

        self.buf.swap(&mut new_buf);
        self.len += 1;
        Ok(())
    }

    fn emplace_without_realloc<F>(&mut self, index: usize, f: F)
    where
        F: FnOnce() -> T,
    {
        debug_assert!(self.len < self.capacity());

        // SAFETY: index <= len < capacity, so [index, len] fits in the buffer
        unsafe {
            let slot = self.buf.slot(index);
            if index == self.len {
                slot.write(f());
            } else {
                // build the value before anything moves
                let value = f();
                ptr::copy(slot, slot.add(1), self.len - index);
                slot.write(value);
            }
        }
        self.len += 1;
    }

    /// Removes and returns the element at `index`, shifting every element after it one slot
    /// forward.
    ///
    /// Afterwards `index` addresses the element that followed the removed one, or equals `len`
    /// if the removed element was the last.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {})",
            self.len
        );

        // SAFETY: index < len, and (index, len) are live
        unsafe {
            let slot = self.buf.slot(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        // SAFETY: the slot at the old len - 1 was live and is no longer counted
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Exchanges buffers and lengths with `other`. No element is touched.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Splits the vector into its buffer and live length without dropping anything.
    pub(crate) fn into_raw_parts(self) -> (RawBuffer<T>, usize) {
        let mut vec = ManuallyDrop::new(self);
        (vec.buf.take(), vec.len)
    }
}

impl<T: Clone> Vec<T> {
    /// Returns a copy of the vector whose capacity equals the source's length.
    ///
    /// If a clone panics, the partial copy is dropped and `self` is untouched.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        let mut copy = Self::try_with_capacity(self.len)?;
        copy.clone_tail_from(self);
        Ok(copy)
    }

    /// Makes `self` a copy of `source`, reusing the current buffer when it is large enough.
    ///
    /// If `source` does not fit, a complete copy is built first and swapped in, so a failure
    /// leaves `self` unchanged. Otherwise the shared prefix is overwritten with
    /// [`Clone::clone_from`], then the excess tail is dropped or the missing tail is cloned in.
    /// A panic on that path leaves a valid vector whose elements may be partly updated.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError> {
        if source.len > self.capacity() {
            let mut copy = source.try_clone()?;
            self.swap_with(&mut copy);
            return Ok(());
        }

        let shared = self.len.min(source.len);
        for (dst, src) in self.as_mut_slice()[..shared]
            .iter_mut()
            .zip(&source.as_slice()[..shared])
        {
            dst.clone_from(src);
        }

        if source.len < self.len {
            self.truncate(source.len);
        } else {
            let start = self.len;
            self.clone_tail_from(&source.as_slice()[start..]);
        }
        Ok(())
    }

    /// Clones every element of `other` onto the back of the vector.
    pub fn try_extend_from_slice(&mut self, other: &[T]) -> Result<(), AllocError> {
        let needed = self
            .len
            .checked_add(other.len())
            .ok_or(AllocError::CapacityOverflow)?;
        self.try_grow_for(needed)?;
        self.clone_tail_from(other);
        Ok(())
    }

    pub fn extend_from_slice(&mut self, other: &[T]) {
        infallible(self.try_extend_from_slice(other))
    }

    fn clone_tail_from(&mut self, items: &[T]) {
        debug_assert!(self.len + items.len() <= self.capacity());
        for item in items {
            // SAFETY: room was reserved by the caller
            unsafe { self.buf.slot(self.len).write(item.clone()) };
            self.len += 1;
        }
    }
}

impl<T> Drop for Vec<T> {
    fn drop(&mut self) {
        // SAFETY: slots [0, len) are live; the buffer releases the memory afterwards
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T: Clone> Clone for Vec<T> {
    fn clone(&self) -> Self {
        infallible(self.try_clone())
    }

    fn clone_from(&mut self, source: &Self) {
        infallible(self.try_clone_from(source))
    }
}

impl<T> Default for Vec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Vec<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for Vec<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for Vec<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for Vec<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T> Borrow<[T]> for Vec<T> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T> BorrowMut<[T]> for Vec<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Vec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Vec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        infallible(self.try_grow_for(self.len.saturating_add(lower)));
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Vec<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T> FromIterator<T> for Vec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T: Clone> From<&[T]> for Vec<T> {
    fn from(slice: &[T]) -> Self {
        let mut vec = Self::with_capacity(slice.len());
        vec.clone_tail_from(slice);
        vec
    }
}

impl<T, const N: usize> From<[T; N]> for Vec<T> {
    fn from(array: [T; N]) -> Self {
        let mut vec = Self::with_capacity(N);
        for item in array {
            vec.push(item);
        }
        vec
    }
}

impl<T> IntoIterator for Vec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let (buf, len) = self.into_raw_parts();
        IntoIter::new(buf, len)
    }
}

impl<'a, T> IntoIterator for &'a Vec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vec<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
