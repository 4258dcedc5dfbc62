// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::{
        handle::{
            PacketHandle,
            SegmentHandle,
        },
        pool::PacketPool,
        segment::{
            Segment,
            SegmentInfo,
        },
    },
    runtime::fail::Fail,
};
use ::std::ops::Range;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Iterator over the segment handles of a packet, in chain order.
pub struct Segments {
    packet: PacketHandle,
    indexes: Range<usize>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketPool {
    /// Number of segments in the packet.
    pub fn segment_count(&self, pkt: PacketHandle) -> Result<usize, Fail> {
        Ok(self.descriptor(pkt)?.chain().len())
    }

    /// Handle to the segment at position `index`, or `None` if the packet has fewer segments or is not valid.
    pub fn segment_at(&self, pkt: PacketHandle, index: usize) -> Option<SegmentHandle> {
        match self.descriptor(pkt) {
            Ok(desc) if index < desc.chain().len() => Some(SegmentHandle::new(pkt, index)),
            _ => None,
        }
    }

    /// Handle to the segment that follows `seg`, or `None` if `seg` is the last segment or is not valid.
    pub fn next_segment(&self, seg: SegmentHandle) -> Option<SegmentHandle> {
        self.segment(seg).ok()?;
        self.segment_at(seg.packet(), seg.index() + 1)
    }

    /// Iterates over the segment handles of a packet. Empty if the packet is not valid.
    pub fn segments(&self, pkt: PacketHandle) -> Segments {
        let count: usize = self.segment_count(pkt).unwrap_or(0);
        Segments {
            packet: pkt,
            indexes: 0..count,
        }
    }

    /// Geometry of a segment.
    pub fn segment_info(&self, seg: SegmentHandle) -> Result<SegmentInfo, Fail> {
        Ok(self.segment(seg)?.info())
    }

    /// Start address of a segment.
    pub fn segment_address(&self, seg: SegmentHandle) -> Result<*const u8, Fail> {
        Ok(self.segment(seg)?.base_ptr())
    }

    /// Capacity of a segment.
    pub fn segment_size(&self, seg: SegmentHandle) -> Result<usize, Fail> {
        Ok(self.segment(seg)?.capacity())
    }

    pub fn segment_data(&self, seg: SegmentHandle) -> Result<&[u8], Fail> {
        Ok(self.segment(seg)?.data())
    }

    pub fn segment_data_mut(&mut self, seg: SegmentHandle) -> Result<&mut [u8], Fail> {
        Ok(self.segment_mut(seg)?.data_mut())
    }

    pub fn segment_data_length(&self, seg: SegmentHandle) -> Result<usize, Fail> {
        Ok(self.segment(seg)?.data_len())
    }

    pub fn segment_headroom(&self, seg: SegmentHandle) -> Result<usize, Fail> {
        Ok(self.segment(seg)?.headroom())
    }

    pub fn segment_tailroom(&self, seg: SegmentHandle) -> Result<usize, Fail> {
        Ok(self.segment(seg)?.tailroom())
    }

    //==================================================================================================================
    // Internal Functions
    //==================================================================================================================

    /// Resolves a segment handle.
    pub(crate) fn segment(&self, seg: SegmentHandle) -> Result<&Segment, Fail> {
        match self.descriptor(seg.packet())?.chain().get(seg.index()) {
            Some(segment) => Ok(segment),
            None => Err(Fail::bad_handle("invalid segment handle")),
        }
    }

    /// Resolves a segment handle.
    pub(crate) fn segment_mut(&mut self, seg: SegmentHandle) -> Result<&mut Segment, Fail> {
        match self.descriptor_mut(seg.packet())?.chain_mut().get_mut(seg.index()) {
            Some(segment) => Ok(segment),
            None => Err(Fail::bad_handle("invalid segment handle")),
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Iterator for Segments {
    type Item = SegmentHandle;

    fn next(&mut self) -> Option<Self::Item> {
        self.indexes.next().map(|index| SegmentHandle::new(self.packet, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indexes.size_hint()
    }
}

impl ExactSizeIterator for Segments {}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
