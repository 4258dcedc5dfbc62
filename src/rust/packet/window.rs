// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// Head and tail push/pull on a single segment of a packet. Each successful call moves the segment's data window and
// applies the same change to the packet's total length. No call ever reaches into a neighboring segment.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::{
        descriptor::PacketDescriptor,
        handle::SegmentHandle,
        pool::PacketPool,
        segment::Segment,
    },
    runtime::fail::Fail,
};

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketPool {
    /// Extends the data window of `seg` by `nbytes` into its headroom and returns the new window.
    pub fn push_head(&mut self, seg: SegmentHandle, nbytes: usize) -> Result<&mut [u8], Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(seg.packet())?;
        let segment: &mut Segment = segment_of(desc, seg)?;
        if let Err(e) = segment.push_head(nbytes) {
            debug!("push_head(): seg={:?} nbytes={:?} headroom={:?}", seg, nbytes, segment.headroom());
            return Err(e);
        }
        desc.grow(nbytes);
        trace!("push_head(): seg={:?} nbytes={:?}", seg, nbytes);
        Ok(segment_of(desc, seg)?.data_mut())
    }

    /// Shrinks the data window of `seg` by `nbytes` from its start and returns the new window. At least one byte
    /// must remain in the segment.
    pub fn pull_head(&mut self, seg: SegmentHandle, nbytes: usize) -> Result<&mut [u8], Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(seg.packet())?;
        let segment: &mut Segment = segment_of(desc, seg)?;
        if let Err(e) = segment.pull_head(nbytes) {
            debug!("pull_head(): seg={:?} nbytes={:?} data_len={:?}", seg, nbytes, segment.data_len());
            return Err(e);
        }
        desc.shrink(nbytes);
        trace!("pull_head(): seg={:?} nbytes={:?}", seg, nbytes);
        Ok(segment_of(desc, seg)?.data_mut())
    }

    /// Extends the data window of `seg` by `nbytes` into its tailroom and returns the new data length.
    pub fn push_tail(&mut self, seg: SegmentHandle, nbytes: usize) -> Result<usize, Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(seg.packet())?;
        let segment: &mut Segment = segment_of(desc, seg)?;
        if let Err(e) = segment.push_tail(nbytes) {
            debug!("push_tail(): seg={:?} nbytes={:?} tailroom={:?}", seg, nbytes, segment.tailroom());
            return Err(e);
        }
        let data_len: usize = segment.data_len();
        desc.grow(nbytes);
        trace!("push_tail(): seg={:?} nbytes={:?}", seg, nbytes);
        Ok(data_len)
    }

    /// Shrinks the data window of `seg` by `nbytes` from its end and returns the new data length. At least one byte
    /// must remain in the segment.
    pub fn pull_tail(&mut self, seg: SegmentHandle, nbytes: usize) -> Result<usize, Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(seg.packet())?;
        let segment: &mut Segment = segment_of(desc, seg)?;
        if let Err(e) = segment.pull_tail(nbytes) {
            debug!("pull_tail(): seg={:?} nbytes={:?} data_len={:?}", seg, nbytes, segment.data_len());
            return Err(e);
        }
        let data_len: usize = segment.data_len();
        desc.shrink(nbytes);
        trace!("pull_tail(): seg={:?} nbytes={:?}", seg, nbytes);
        Ok(data_len)
    }
}

//======================================================================================================================
// Helper Functions
//======================================================================================================================

fn segment_of(desc: &mut PacketDescriptor, seg: SegmentHandle) -> Result<&mut Segment, Fail> {
    match desc.chain_mut().get_mut(seg.index()) {
        Some(segment) => Ok(segment),
        None => Err(Fail::bad_handle("invalid segment handle")),
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
