// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod memory_pool;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::memory_pool::MemoryPool;

//======================================================================================================================
// Traits
//======================================================================================================================

/// Buffer Allocator
///
/// The external pool that supplies fixed-capacity buffer memory to packet chains. Implementations are free to
/// synchronize internally; the packet layer only ever calls them through an exclusive reference.
pub trait BufferAllocator: Send {
    /// Capacity in bytes of every buffer handed out by this allocator.
    fn buffer_size(&self) -> usize;

    /// Returns the number of free buffers.
    fn len(&self) -> usize;

    /// Returns `true` if no buffers are left.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets one buffer. If no buffers remain, returns None.
    fn get_one(&mut self) -> Option<Box<[u8]>>;

    /// Gets exactly `n` buffers, or none at all if fewer than `n` are available.
    fn get_n(&mut self, n: usize) -> Option<Vec<Box<[u8]>>> {
        if self.len() < n {
            return None;
        }
        let mut buffers: Vec<Box<[u8]>> = Vec::with_capacity(n);
        for _ in 0..n {
            match self.get_one() {
                Some(buffer) => buffers.push(buffer),
                None => {
                    for buffer in buffers {
                        self.return_buffer(buffer);
                    }
                    return None;
                },
            }
        }
        Some(buffers)
    }

    /// Returns a buffer to the allocator.
    fn return_buffer(&mut self, buffer: Box<[u8]>);
}
