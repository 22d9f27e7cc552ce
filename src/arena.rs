//! Bump-pointer scratch memory for replayed create-infos.
//!
//! The replayer rebuilds every nested structure (binding arrays, subpasses,
//! pipeline state blocks, entry-point names) inside a [`ScratchArena`]. Memory
//! is handed out by bumping an offset inside the current block; when a request
//! does not fit, a new block at least as large as the request is appended.
//! Blocks never move and are never reused, so every reference returned stays
//! valid until the arena is dropped or [`reset`](ScratchArena::reset), both of
//! which require exclusive access and therefore cannot race with a borrow.
//!
//! Only `Copy` values are stored. The arena never runs destructors.
//!
//! This is the only module in the crate allowed to use `unsafe`.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::cell::RefCell;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};
use std::slice;

use crate::constants::DEFAULT_ARENA_BLOCK_SIZE;
use crate::error::{CaptureError, Result};

/// Alignment of every block base. Requests with a larger alignment are still
/// honoured by padding inside the block.
const BLOCK_ALIGN: usize = 16;

/// One owned allocation. `ptr` comes from the global allocator with `layout`
/// and is released in `Drop`.
#[derive(Debug)]
struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
    offset: usize,
}

impl Block {
    fn new(capacity: usize) -> Result<Self> {
        let layout = Layout::from_size_align(capacity, BLOCK_ALIGN)
            .map_err(|_| CaptureError::Allocation { requested: capacity })?;
        // SAFETY: `capacity` is never zero; `reserve` clamps it to at least
        // the block size floor.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(CaptureError::Allocation { requested: capacity })?;
        Ok(Self {
            ptr,
            layout,
            offset: 0,
        })
    }

    /// Returns the byte offset at which `size` bytes aligned to `align` would
    /// start, if they fit.
    fn fit(&self, size: usize, align: usize) -> Option<usize> {
        let base = self.ptr.as_ptr() as usize;
        let cursor = base.checked_add(self.offset)?;
        let aligned = cursor.checked_add(align - 1)? & !(align - 1);
        let start = aligned - base;
        let end = start.checked_add(size)?;
        (end <= self.layout.size()).then_some(start)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc::alloc(self.layout)` and is
        // released exactly once.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// A monotonic bump allocator owning every sub-structure built during a replay.
#[derive(Debug)]
pub struct ScratchArena {
    blocks: RefCell<Vec<Block>>,
    block_size: usize,
}

// SAFETY: the arena exclusively owns its blocks; moving it to another thread
// moves that ownership. It is not `Sync`.
unsafe impl Send for ScratchArena {}

impl ScratchArena {
    /// Creates an arena whose blocks start at the default size.
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_ARENA_BLOCK_SIZE)
    }

    /// Creates an arena with a custom minimum block size.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: RefCell::new(Vec::new()),
            block_size: block_size.max(BLOCK_ALIGN),
        }
    }

    /// Reserves `size` bytes aligned to `align` and returns a pointer to them.
    ///
    /// `size` must be non-zero and `align` a power of two.
    fn reserve(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        if !align.is_power_of_two() {
            return Err(CaptureError::Internal(format!(
                "arena alignment {align} is not a power of two"
            )));
        }

        let mut blocks = self
            .blocks
            .try_borrow_mut()
            .map_err(|_| CaptureError::Internal("scratch arena re-entered".into()))?;

        if let Some(block) = blocks.last_mut()
            && let Some(start) = block.fit(size, align)
        {
            block.offset = start + size;
            // SAFETY: `start + size <= capacity`, so the offset stays in bounds.
            return Ok(unsafe { NonNull::new_unchecked(block.ptr.as_ptr().add(start)) });
        }

        // Slack for future growth: double the previous block, never less than
        // the request plus worst-case padding.
        let previous = blocks.last().map_or(0, |b| b.layout.size());
        let needed = size
            .checked_add(align)
            .ok_or(CaptureError::Allocation { requested: size })?;
        let capacity = needed.max(self.block_size).max(previous.saturating_mul(2));

        let mut block = Block::new(capacity)?;
        let start = block
            .fit(size, align)
            .ok_or(CaptureError::Allocation { requested: size })?;
        block.offset = start + size;
        // SAFETY: as above, the span lies within the new block.
        let ptr = unsafe { NonNull::new_unchecked(block.ptr.as_ptr().add(start)) };
        blocks.push(block);
        Ok(ptr)
    }

    /// Allocates `size` uninitialized bytes aligned to `align`.
    ///
    /// A zero-size request returns an empty slice without touching any block.
    pub fn allocate(&self, size: usize, align: usize) -> Result<&mut [MaybeUninit<u8>]> {
        if size == 0 {
            return Ok(Default::default());
        }
        let ptr = self.reserve(size, align)?;
        // SAFETY: the span is exclusively ours, in bounds, and lives as long as
        // `self` because blocks are neither moved nor freed before drop/reset.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr().cast::<MaybeUninit<u8>>(), size) })
    }

    /// Allocates `size` zero-filled bytes aligned to `align`.
    pub fn allocate_cleared(&self, size: usize, align: usize) -> Result<&mut [u8]> {
        if size == 0 {
            return Ok(Default::default());
        }
        let ptr = self.reserve(size, align)?;
        // SAFETY: as in `allocate`; the bytes are initialized by `write_bytes`
        // before the slice is formed.
        unsafe {
            ptr::write_bytes(ptr.as_ptr(), 0, size);
            Ok(slice::from_raw_parts_mut(ptr.as_ptr(), size))
        }
    }

    /// Moves a single value into the arena.
    pub fn alloc<T: Copy>(&self, value: T) -> Result<&mut T> {
        let slot = self.alloc_slice_fill_with(1, |_| Ok(value))?;
        slot.first_mut()
            .ok_or_else(|| CaptureError::Internal("arena returned an empty single slot".into()))
    }

    /// Copies a slice into the arena. An empty input yields an empty slice.
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T]> {
        self.alloc_slice_fill_with(src.len(), |i| Ok(src[i]))
    }

    /// Allocates `count` elements, initializing element `i` with `fill(i)`.
    ///
    /// `fill` may itself allocate from the arena; the arena is not borrowed
    /// while it runs. If `fill` fails, the partially written span is abandoned
    /// (it is never read) and the error is returned.
    pub fn alloc_slice_fill_with<T, F>(&self, count: usize, mut fill: F) -> Result<&mut [T]>
    where
        T: Copy,
        F: FnMut(usize) -> Result<T>,
    {
        if count == 0 {
            return Ok(Default::default());
        }

        let size = mem::size_of::<T>()
            .checked_mul(count)
            .ok_or(CaptureError::Allocation { requested: usize::MAX })?;

        let base: NonNull<T> = if size == 0 {
            NonNull::dangling()
        } else {
            self.reserve(size, mem::align_of::<T>())?.cast::<T>()
        };

        for i in 0..count {
            let value = fill(i)?;
            // SAFETY: `i < count`, the span holds `count` properly aligned `T`s.
            unsafe { base.as_ptr().add(i).write(value) };
        }

        // SAFETY: all `count` elements were initialized above.
        Ok(unsafe { slice::from_raw_parts_mut(base.as_ptr(), count) })
    }

    /// Copies a string into the arena. Length is tracked explicitly; no
    /// terminator is stored or required.
    pub fn alloc_str(&self, value: &str) -> Result<&str> {
        let bytes = self.alloc_slice_copy(value.as_bytes())?;
        std::str::from_utf8(bytes).map_err(|e| CaptureError::Internal(e.to_string()))
    }

    /// Number of blocks currently owned.
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Total bytes handed out so far, padding included.
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.borrow().iter().map(|b| b.offset).sum()
    }

    /// Total bytes reserved from the system.
    pub fn capacity(&self) -> usize {
        self.blocks.borrow().iter().map(|b| b.layout.size()).sum()
    }

    /// Discards every block at once.
    pub fn reset(&mut self) {
        self.blocks.get_mut().clear();
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}
