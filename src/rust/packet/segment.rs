// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// A segment is one fixed-capacity buffer obtained from the pool, plus a movable window that marks which bytes of it
// currently hold packet data.  The window never leaves the buffer and never becomes empty:
//
//   |<-- headroom -->|<-- data_len -->|<-- tailroom -->|
//   ^ base           ^ data_off
//
// so headroom + data_len + tailroom always equals the buffer capacity.  All window operations either succeed in full
// or leave the segment untouched.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;

//======================================================================================================================
// Structures
//======================================================================================================================

/// One contiguous memory region backing part of a packet's data.
#[derive(Debug)]
pub struct Segment {
    // Underlying storage. Its address and length never change while the segment lives.
    buffer: Box<[u8]>,
    // Offset of the data window from the start of the buffer.
    data_off: usize,
    // Length of the data window.
    data_len: usize,
}

/// Snapshot of a segment's geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Start address of the segment.
    pub addr: *const u8,
    /// Capacity of the segment.
    pub size: usize,
    /// Start address of the data window.
    pub data: *const u8,
    /// Length of the data window.
    pub data_len: usize,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Segment {
    /// Wraps `buffer` with a data window of `data_len` bytes starting at `data_off`. On failure `buffer` is handed
    /// back to the caller.
    pub fn new(buffer: Box<[u8]>, data_off: usize, data_len: usize) -> Result<Self, (Fail, Box<[u8]>)> {
        if let Err(e) = check_window(buffer.len(), data_off, data_len) {
            return Err((e, buffer));
        }
        Ok(Self {
            buffer,
            data_off,
            data_len,
        })
    }

    /// Total bytes in the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes available in front of the data window.
    pub fn headroom(&self) -> usize {
        self.data_off
    }

    /// Bytes available after the data window.
    pub fn tailroom(&self) -> usize {
        self.buffer.len() - self.data_off - self.data_len
    }

    /// Length of the data window.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Start address of the buffer. Operations on the window never change it.
    pub fn base_ptr(&self) -> *const u8 {
        self.buffer.as_ptr()
    }

    /// The data window.
    pub fn data(&self) -> &[u8] {
        &self.buffer[self.data_off..self.data_off + self.data_len]
    }

    /// The data window, mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[self.data_off..self.data_off + self.data_len]
    }

    /// Snapshots the segment's geometry.
    pub fn info(&self) -> SegmentInfo {
        SegmentInfo {
            addr: self.base_ptr(),
            size: self.capacity(),
            data: self.data().as_ptr(),
            data_len: self.data_len,
        }
    }

    /// Grows the data window towards the start of the buffer by `nbytes`.
    pub fn push_head(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes > self.headroom() {
            return Err(Fail::capacity("tried to push more bytes than there is headroom"));
        }
        self.data_off -= nbytes;
        self.data_len += nbytes;
        Ok(())
    }

    /// Removes `nbytes` bytes from the beginning of the data window.
    // Note: a segment never becomes empty, so at least one byte must remain.
    pub fn pull_head(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes >= self.data_len {
            return Err(Fail::capacity("tried to remove more bytes than are present"));
        }
        self.data_off += nbytes;
        self.data_len -= nbytes;
        Ok(())
    }

    /// Grows the data window towards the end of the buffer by `nbytes`.
    pub fn push_tail(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes > self.tailroom() {
            return Err(Fail::capacity("tried to push more bytes than there is tailroom"));
        }
        self.data_len += nbytes;
        Ok(())
    }

    /// Removes `nbytes` bytes from the end of the data window.
    pub fn pull_tail(&mut self, nbytes: usize) -> Result<(), Fail> {
        if nbytes >= self.data_len {
            return Err(Fail::capacity("tried to remove more bytes than are present"));
        }
        self.data_len -= nbytes;
        Ok(())
    }

    /// Moves the data window to an arbitrary valid position, leaving the buffer contents alone.
    pub fn set_window(&mut self, data_off: usize, data_len: usize) -> Result<(), Fail> {
        check_window(self.buffer.len(), data_off, data_len)?;
        self.data_off = data_off;
        self.data_len = data_len;
        Ok(())
    }

    /// Releases the underlying buffer.
    pub fn into_buffer(self) -> Box<[u8]> {
        self.buffer
    }
}

//======================================================================================================================
// Helper Functions
//======================================================================================================================

// Checks that a window is non-empty and fits in a buffer of the given capacity.
fn check_window(capacity: usize, data_off: usize, data_len: usize) -> Result<(), Fail> {
    if data_len == 0 {
        return Err(Fail::capacity("segment data window cannot be empty"));
    }
    match data_off.checked_add(data_len) {
        Some(end) if end <= capacity => Ok(()),
        _ => {
            let cause: String = format!(
                "data window does not fit in segment (capacity={:?}, data_off={:?}, data_len={:?})",
                capacity, data_off, data_len
            );
            Err(Fail::capacity(&cause))
        },
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
