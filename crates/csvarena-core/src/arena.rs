// Arena allocation module for zero-copy table construction
//
// Every structure a parsed table needs (the copied input buffer, header and cell
// spans, the row list, column types, index entries) is carved out of a chain of
// regions. Nothing is freed individually: the chain is either reset for reuse or
// released as a whole.
//
// Lifetimes do the bookkeeping. Allocation borrows the arena shared, while
// `reset` and `release` borrow it exclusively, so the compiler rejects any use
// of a span or table after the memory behind it has been recycled.

use std::alloc::{self, Layout};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;
use std::str;

use thiserror::Error;
use tracing::trace;

/// Capacity of a region when no larger request forces a bigger one.
pub const REGION_DEFAULT_CAPACITY: usize = 8 * 1024;

/// Every allocation starts on this boundary and is padded to a multiple of it.
pub const ALIGNMENT: usize = 16;

/// The global allocator refused a region, or the request overflowed `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arena could not allocate {requested} bytes")]
pub struct AllocError {
    pub requested: usize,
}

#[inline]
fn align_up(bytes: usize) -> Option<usize> {
    bytes
        .checked_add(ALIGNMENT - 1)
        .map(|padded| padded & !(ALIGNMENT - 1))
}

#[repr(align(16))]
struct MaxAlign;

const _: () = assert!(mem::align_of::<MaxAlign>() == ALIGNMENT);

/// Non-null, [`ALIGNMENT`]-aligned address for zero-byte blocks
#[inline]
fn dangling() -> NonNull<u8> {
    NonNull::<MaxAlign>::dangling().cast()
}

/// One contiguous block owned by an [`Arena`].
struct Region {
    data: NonNull<u8>,
    capacity: usize,
    size: Cell<usize>,
}

impl Region {
    fn new(capacity: usize) -> Result<Self, AllocError> {
        debug_assert!(capacity > 0);
        let layout = Layout::from_size_align(capacity, ALIGNMENT)
            .map_err(|_| AllocError { requested: capacity })?;
        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let data = NonNull::new(raw).ok_or(AllocError { requested: capacity })?;
        Ok(Self {
            data,
            capacity,
            size: Cell::new(0),
        })
    }

    fn remaining(&self) -> usize {
        self.capacity - self.size.get()
    }

    /// Hands out `aligned` bytes from the high-water mark.
    fn bump(&self, aligned: usize) -> NonNull<u8> {
        let offset = self.size.get();
        debug_assert!(offset + aligned <= self.capacity);
        self.size.set(offset + aligned);
        // SAFETY: offset + aligned never exceeds capacity, so the pointer stays
        // inside (or one past the end of) the block.
        unsafe { NonNull::new_unchecked(self.data.as_ptr().add(offset)) }
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: data was allocated in `Region::new` with exactly this layout.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, ALIGNMENT);
            alloc::dealloc(self.data.as_ptr(), layout);
        }
    }
}

/// Growable bump allocator made of a chain of regions.
///
/// Allocations never cross region boundaries. When the tail region cannot fit a
/// request, a region of `max(default_capacity, request)` bytes is appended and
/// becomes the new tail, so one oversized allocation does not shrink the regions
/// that follow it.
///
/// Only `Copy` values can be placed in the arena: nothing in it is ever dropped.
pub struct Arena {
    regions: RefCell<Vec<Region>>,
    tail: Cell<usize>,
    default_capacity: usize,
}

// SAFETY: regions own their memory exclusively and the arena cannot be moved
// while anything borrows from it.
unsafe impl Send for Arena {}

impl Arena {
    /// Create an empty arena with the default region capacity
    pub fn new() -> Self {
        Self::with_region_capacity(REGION_DEFAULT_CAPACITY)
    }

    /// Create an empty arena whose regions hold at least `capacity` bytes
    ///
    /// Nothing is allocated until the first request.
    pub fn with_region_capacity(capacity: usize) -> Self {
        let default_capacity =
            align_up(capacity.max(ALIGNMENT)).unwrap_or(usize::MAX & !(ALIGNMENT - 1));
        Self {
            regions: RefCell::new(Vec::new()),
            tail: Cell::new(0),
            default_capacity,
        }
    }

    /// Allocate `bytes` of uninitialised storage, rounded up to [`ALIGNMENT`]
    ///
    /// The memory lives until the arena is reset, released or dropped.
    pub fn allocate(&self, bytes: usize) -> Result<NonNull<u8>, AllocError> {
        let aligned = align_up(bytes).ok_or(AllocError { requested: bytes })?;
        if aligned == 0 {
            return Ok(dangling());
        }
        let mut regions = self.regions.borrow_mut();

        let mut tail = self.tail.get();
        while tail < regions.len() && regions[tail].remaining() < aligned {
            tail += 1;
        }

        if tail == regions.len() {
            let capacity = self.default_capacity.max(aligned);
            trace!(capacity, region = tail, "arena appending region");
            regions.push(Region::new(capacity)?);
        }

        self.tail.set(tail);
        Ok(regions[tail].bump(aligned))
    }

    /// Copy-forward growth of an earlier allocation
    ///
    /// Returns `old` untouched when `new_size <= old_size`; this never shrinks.
    /// Otherwise a fresh block of `new_size` bytes is allocated and the first
    /// `old_size` bytes are copied into it. The old block is not reclaimed until
    /// the arena is reset or released, so other views of it stay valid.
    ///
    /// # Safety
    ///
    /// `old` must be valid for reads of `old_size` bytes and must not overlap
    /// memory handed out after it.
    pub unsafe fn grow(
        &self,
        old: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if new_size <= old_size {
            return Ok(old);
        }

        let new = self.allocate(new_size)?;
        ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), old_size);
        Ok(new)
    }

    fn alloc_array<T>(&self, len: usize) -> Result<NonNull<T>, AllocError> {
        assert!(
            mem::align_of::<T>() <= ALIGNMENT,
            "arena allocations are aligned to {ALIGNMENT} bytes"
        );
        let bytes = mem::size_of::<T>()
            .checked_mul(len)
            .ok_or(AllocError { requested: usize::MAX })?;
        self.allocate(bytes).map(NonNull::cast)
    }

    /// Allocate a value in the arena
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T: Copy>(&self, value: T) -> Result<&mut T, AllocError> {
        let ptr = self.alloc_array::<T>(1)?.as_ptr();
        // SAFETY: ptr is aligned for T and owns size_of::<T>() fresh bytes.
        unsafe {
            ptr.write(value);
            Ok(&mut *ptr)
        }
    }

    /// Allocate a copy of a slice in the arena
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], AllocError> {
        let ptr = self.alloc_array::<T>(src.len())?.as_ptr();
        // SAFETY: the destination is fresh, aligned and large enough.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr, src.len());
            Ok(slice::from_raw_parts_mut(ptr, src.len()))
        }
    }

    /// Allocate `len` copies of `value`
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill_copy<T: Copy>(
        &self,
        len: usize,
        value: T,
    ) -> Result<&mut [T], AllocError> {
        let ptr = self.alloc_array::<T>(len)?.as_ptr();
        // SAFETY: every slot is written before the slice is formed.
        unsafe {
            for i in 0..len {
                ptr.add(i).write(value);
            }
            Ok(slice::from_raw_parts_mut(ptr, len))
        }
    }

    /// Allocate a slice and fill it with values from an iterator
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill_iter<T, I>(&self, iter: I) -> Result<&mut [T], AllocError>
    where
        T: Copy,
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = iter.into_iter();
        let len = iter.len();
        let ptr = self.alloc_array::<T>(len)?.as_ptr();
        let mut written = 0;
        // SAFETY: only the slots that were written end up in the slice.
        unsafe {
            for value in iter.take(len) {
                ptr.add(written).write(value);
                written += 1;
            }
            Ok(slice::from_raw_parts_mut(ptr, written))
        }
    }

    /// Allocate a string in the arena
    pub fn alloc_str(&self, s: &str) -> Result<&str, AllocError> {
        let bytes = self.alloc_slice_copy(s.as_bytes())?;
        // SAFETY: the bytes were copied from a valid str.
        Ok(unsafe { str::from_utf8_unchecked(bytes) })
    }

    /// Return `old` followed by `tail`, copied forward into a new block
    ///
    /// The old slice is left where it was. An empty `tail` returns `old` itself.
    pub fn extend_slice<'a, T: Copy>(
        &'a self,
        old: &'a [T],
        tail: &[T],
    ) -> Result<&'a [T], AllocError> {
        if tail.is_empty() {
            return Ok(old);
        }
        assert!(
            mem::align_of::<T>() <= ALIGNMENT,
            "arena allocations are aligned to {ALIGNMENT} bytes"
        );

        let new_len = old
            .len()
            .checked_add(tail.len())
            .ok_or(AllocError { requested: usize::MAX })?;
        let item = mem::size_of::<T>();
        let old_size = item * old.len();
        let new_size = item
            .checked_mul(new_len)
            .ok_or(AllocError { requested: usize::MAX })?;

        // SAFETY: `old` is a live slice of exactly old_size bytes.
        let base = unsafe { self.grow(NonNull::from(old).cast::<u8>(), old_size, new_size)? }
            .cast::<T>()
            .as_ptr();
        // SAFETY: the new block holds new_len elements, the first old.len() of
        // which were copied by `grow`.
        unsafe {
            ptr::copy_nonoverlapping(tail.as_ptr(), base.add(old.len()), tail.len());
            Ok(slice::from_raw_parts(base, new_len))
        }
    }

    /// Rewind every region's high-water mark, keeping the chain for reuse
    pub fn reset(&mut self) {
        for region in self.regions.get_mut().iter() {
            region.size.set(0);
        }
        self.tail.set(0);
    }

    /// Free every region; the arena returns to its initial empty state
    pub fn release(&mut self) {
        let regions = mem::take(self.regions.get_mut());
        trace!(regions = regions.len(), "arena releasing regions");
        drop(regions);
        self.tail.set(0);
    }

    /// Number of regions currently in the chain
    pub fn region_count(&self) -> usize {
        self.regions.borrow().len()
    }

    /// Capacity of every region, in chain order
    pub fn region_capacities(&self) -> Vec<usize> {
        self.regions.borrow().iter().map(|r| r.capacity).collect()
    }

    /// Bytes handed out since the last reset (including alignment padding)
    pub fn allocated_bytes(&self) -> usize {
        self.regions.borrow().iter().map(|r| r.size.get()).sum()
    }

    /// Bytes reserved from the global allocator
    pub fn capacity_bytes(&self) -> usize {
        self.regions.borrow().iter().map(|r| r.capacity).sum()
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("regions", &self.region_count())
            .field("allocated_bytes", &self.allocated_bytes())
            .field("capacity_bytes", &self.capacity_bytes())
            .field("default_capacity", &self.default_capacity)
            .finish()
    }
}
