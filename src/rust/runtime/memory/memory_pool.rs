// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    limits,
    memory::BufferAllocator,
};
use ::std::num::NonZeroUsize;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A single-owner pool of homogeneously-sized, heap-allocated buffers.
///
/// All buffers are created up front by [`MemoryPool::populate`]; afterwards the pool never touches the global
/// allocator, so allocation is a pop from a free list and can fail once the pool is drained.
pub struct MemoryPool {
    /// Free buffers.
    buffers: Vec<Box<[u8]>>,
    /// Size of every buffer in this pool.
    buffer_size: NonZeroUsize,
    /// Number of buffers ever added to this pool.
    capacity: usize,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl MemoryPool {
    /// Create a new empty pool of buffers of the specified size.
    pub fn new(buffer_size: NonZeroUsize) -> Result<Self, Fail> {
        if buffer_size.get() > limits::SEGMENT_SIZE_MAX {
            let cause: String = format!("buffer size is too large (buffer_size={:?})", buffer_size);
            error!("new(): {}", &cause);
            return Err(Fail::new(libc::ERANGE, &cause));
        }

        Ok(Self {
            buffers: Vec::new(),
            buffer_size,
            capacity: 0,
        })
    }

    /// Populate the pool with `count` additional zero-filled buffers.
    pub fn populate(&mut self, count: usize) {
        self.buffers.reserve(count);
        for _ in 0..count {
            self.buffers.push(vec![0u8; self.buffer_size.get()].into_boxed_slice());
        }
        self.capacity += count;
        trace!("populate(): count={:?} free={:?}", count, self.buffers.len());
    }

    /// Returns the number of buffers ever added to the pool, whether free or handed out.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl BufferAllocator for MemoryPool {
    fn buffer_size(&self) -> usize {
        self.buffer_size.get()
    }

    fn len(&self) -> usize {
        self.buffers.len()
    }

    fn get_one(&mut self) -> Option<Box<[u8]>> {
        self.buffers.pop()
    }

    fn get_n(&mut self, n: usize) -> Option<Vec<Box<[u8]>>> {
        if n > self.buffers.len() {
            return None;
        }
        let at: usize = self.buffers.len() - n;
        Some(self.buffers.split_off(at))
    }

    fn return_buffer(&mut self, buffer: Box<[u8]>) {
        // Foreign buffers and double returns.
        debug_assert_eq!(buffer.len(), self.buffer_size.get());
        debug_assert!(self.buffers.len() < self.capacity);
        self.buffers.push(buffer);
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
