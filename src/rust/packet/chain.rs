// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::segment::Segment,
    runtime::{
        fail::Fail,
        limits::MAX_SEGMENTS,
    },
};
use ::arrayvec::ArrayVec;
use ::std::slice;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Position and length of a data window inside one segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub len: usize,
}

/// Windows for every segment of a chain, in chain order.
pub type Layout = ArrayVec<Window, MAX_SEGMENTS>;

/// Ordered, non-empty sequence of segments that together back one packet.
#[derive(Debug)]
pub struct SegmentChain {
    segments: ArrayVec<Segment, MAX_SEGMENTS>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl SegmentChain {
    /// Builds a chain by applying `layout` to `buffers`. On failure the buffers are handed back to the caller.
    pub fn from_buffers(buffers: Vec<Box<[u8]>>, layout: &Layout) -> Result<Self, (Fail, Vec<Box<[u8]>>)> {
        if buffers.is_empty() || buffers.len() != layout.len() {
            let cause: String = format!(
                "layout does not match buffers (buffers={:?}, windows={:?})",
                buffers.len(),
                layout.len()
            );
            return Err((Fail::capacity(&cause), buffers));
        }

        let mut segments: ArrayVec<Segment, MAX_SEGMENTS> = ArrayVec::new();
        let mut rest = buffers.into_iter();
        for window in layout.iter() {
            let buffer: Box<[u8]> = match rest.next() {
                Some(buffer) => buffer,
                None => break,
            };
            match Segment::new(buffer, window.offset, window.len) {
                Ok(segment) => segments.push(segment),
                Err((e, buffer)) => {
                    let mut buffers: Vec<Box<[u8]>> = segments.into_iter().map(Segment::into_buffer).collect();
                    buffers.push(buffer);
                    buffers.extend(rest);
                    return Err((e, buffers));
                },
            }
        }
        Ok(Self { segments })
    }

    /// Number of segments in the chain. Always at least one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Never true for a chain that backs a live packet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Segment at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    /// First segment of the chain.
    pub fn first(&self) -> &Segment {
        &self.segments[0]
    }

    /// First segment of the chain.
    pub fn first_mut(&mut self) -> &mut Segment {
        &mut self.segments[0]
    }

    pub fn iter(&self) -> slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Segment> {
        self.segments.iter_mut()
    }

    /// Sum of the data window lengths of all segments.
    pub fn data_len(&self) -> usize {
        self.segments.iter().map(Segment::data_len).sum()
    }

    /// Sum of the capacities of all segments.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    /// Finds the segment holding byte `offset` of the packet data and the position of that byte in its window.
    /// An offset equal to the data length resolves to the end of the last window.
    pub fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut remaining: usize = offset;
        for (index, segment) in self.segments.iter().enumerate() {
            if remaining < segment.data_len() {
                return Some((index, remaining));
            }
            remaining -= segment.data_len();
        }
        if remaining == 0 {
            let last: usize = self.segments.len() - 1;
            return Some((last, self.segments[last].data_len()));
        }
        None
    }

    /// Lays `len` bytes of data over the existing segments, starting `headroom` bytes into the first one.
    /// The chain is left untouched on failure.
    pub fn relayout(&mut self, headroom: usize, len: usize) -> Result<(), Fail> {
        let capacities: ArrayVec<usize, MAX_SEGMENTS> = self.segments.iter().map(Segment::capacity).collect();
        let layout: Layout = plan(&capacities, headroom, 0, len)?;
        for (segment, window) in self.segments.iter_mut().zip(layout.iter()) {
            // The plan only produces windows that fit, so this cannot fail.
            segment.set_window(window.offset, window.len)?;
        }
        Ok(())
    }

    /// Releases the storage of every segment.
    pub fn into_buffers(self) -> impl Iterator<Item = Box<[u8]>> {
        self.segments.into_iter().map(Segment::into_buffer)
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Computes how many segments of `segment_size` bytes are needed to hold `len` bytes of data with `headroom` bytes
/// before the first window and `tailroom` bytes after the last one. Returns `None` if no number of segments up to the
/// chain limit suffices.
pub fn segments_needed(segment_size: usize, headroom: usize, tailroom: usize, len: usize) -> Option<usize> {
    if headroom >= segment_size || tailroom >= segment_size {
        return None;
    }
    // A single segment must hold the headroom, the data and the tailroom.
    if headroom + len + tailroom <= segment_size {
        return Some(1);
    }
    // Otherwise, the first segment loses the headroom, the last one loses the tailroom, and any in between are full.
    let ends: usize = (segment_size - headroom) + (segment_size - tailroom);
    let middle: usize = len.saturating_sub(ends).div_ceil(segment_size);
    let needed: usize = 2 + middle;
    if needed > MAX_SEGMENTS {
        return None;
    }
    Some(needed)
}

/// Plans data windows for `len` bytes over segments with the given capacities.
///
/// The first window starts `headroom` bytes into the first segment, later windows start at offset zero, and the last
/// segment keeps at least `tailroom` bytes free. Windows are filled front to back, but every segment keeps at least
/// one byte, since empty segments are not allowed.
pub fn plan(capacities: &[usize], headroom: usize, tailroom: usize, len: usize) -> Result<Layout, Fail> {
    let count: usize = capacities.len();
    if count == 0 || count > MAX_SEGMENTS {
        let cause: String = format!("invalid number of segments (count={:?})", count);
        return Err(Fail::capacity(&cause));
    }
    if len < count {
        let cause: String = format!("not enough data to fill every segment (len={:?}, segments={:?})", len, count);
        return Err(Fail::capacity(&cause));
    }

    // Usable bytes per segment.
    let mut usable: ArrayVec<usize, MAX_SEGMENTS> = capacities.iter().copied().collect();
    usable[0] = usable[0].saturating_sub(headroom);
    usable[count - 1] = usable[count - 1].saturating_sub(tailroom);
    if usable.iter().any(|u| *u == 0) {
        return Err(Fail::capacity("headroom and tailroom leave no room for data"));
    }
    let total: usize = usable.iter().sum();
    if len > total {
        let cause: String = format!("not enough room for data (len={:?}, room={:?})", len, total);
        return Err(Fail::capacity(&cause));
    }

    let mut layout: Layout = ArrayVec::new();
    let mut remaining: usize = len;
    for (index, room) in usable.iter().enumerate() {
        // Leave one byte for each of the segments after this one.
        let reserved: usize = count - index - 1;
        let take: usize = (*room).min(remaining - reserved);
        layout.push(Window {
            offset: if index == 0 { headroom } else { 0 },
            len: take,
        });
        remaining -= take;
    }
    debug_assert_eq!(remaining, 0);

    Ok(layout)
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl<'a> IntoIterator for &'a SegmentChain {
    type IntoIter = slice::Iter<'a, Segment>;
    type Item = &'a Segment;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
