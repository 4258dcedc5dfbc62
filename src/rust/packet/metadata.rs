// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// Packet-level metadata: declared length, user context, first-segment addresses, and the start offsets of protocol
// layers. Layer offsets are plain byte counts from the start of the first segment's data window; nothing here parses
// headers, and moving the data window does not move the offsets.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::{
        chain::SegmentChain,
        descriptor::{
            ContextRef,
            Layer,
            PacketDescriptor,
            UserContext,
        },
        handle::PacketHandle,
        pool::PacketPool,
    },
    runtime::fail::Fail,
};

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketPool {
    /// Declared length of the packet.
    pub fn length(&self, pkt: PacketHandle) -> Result<usize, Fail> {
        Ok(self.descriptor(pkt)?.len())
    }

    /// Overwrites the declared length of the packet.
    ///
    /// No segment is resized: keeping the declared length equal to the sum of the segment data lengths is the
    /// caller's responsibility. Resizing the data itself must go through the segment push and pull operations.
    pub fn set_length(&mut self, pkt: PacketHandle, len: usize) -> Result<(), Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(pkt)?;
        let physical: usize = desc.chain().data_len();
        if physical != len {
            debug!("set_length(): declared length differs from data (len={:?}, data={:?})", len, physical);
        }
        desc.set_len(len);
        Ok(())
    }

    /// User context of the packet.
    pub fn user_context(&self, pkt: PacketHandle) -> Result<&UserContext, Fail> {
        Ok(self.descriptor(pkt)?.user_context())
    }

    /// User context reference. `None` unless the last context setter stored a reference.
    pub fn user_context_ptr(&self, pkt: PacketHandle) -> Result<Option<ContextRef>, Fail> {
        Ok(self.descriptor(pkt)?.user_context().as_ptr().cloned())
    }

    pub fn set_user_context_ptr(&mut self, pkt: PacketHandle, context: ContextRef) -> Result<(), Fail> {
        self.descriptor_mut(pkt)?.set_user_context(UserContext::Ptr(context));
        Ok(())
    }

    /// User context integer. `None` unless the last context setter stored an integer.
    pub fn user_context_u64(&self, pkt: PacketHandle) -> Result<Option<u64>, Fail> {
        Ok(self.descriptor(pkt)?.user_context().as_u64())
    }

    pub fn set_user_context_u64(&mut self, pkt: PacketHandle, value: u64) -> Result<(), Fail> {
        self.descriptor_mut(pkt)?.set_user_context(UserContext::U64(value));
        Ok(())
    }

    /// Start address of the first segment. Unlike the data pointer, it is not moved by any operation.
    // This function is not marked unsafe, as the unsafe act is dereferencing the returned pointer, not providing it.
    pub fn base_address(&self, pkt: PacketHandle) -> Result<*const u8, Fail> {
        Ok(self.descriptor(pkt)?.chain().first().base_ptr())
    }

    /// Data window of the first segment. Layer offsets are measured from its start.
    pub fn data(&self, pkt: PacketHandle) -> Result<&[u8], Fail> {
        Ok(self.descriptor(pkt)?.chain().first().data())
    }

    pub fn data_mut(&mut self, pkt: PacketHandle) -> Result<&mut [u8], Fail> {
        Ok(self.descriptor_mut(pkt)?.chain_mut().first_mut().data_mut())
    }

    /// Capacity of the first segment. This is not the packet length.
    pub fn buffer_capacity(&self, pkt: PacketHandle) -> Result<usize, Fail> {
        Ok(self.descriptor(pkt)?.chain().first().capacity())
    }

    //==================================================================================================================
    // Layer Offsets
    //==================================================================================================================

    /// Start offset of `layer`, or `None` if it was never set.
    pub fn layer_offset(&self, pkt: PacketHandle, layer: Layer) -> Result<Option<usize>, Fail> {
        Ok(self.descriptor(pkt)?.layer_offset(layer))
    }

    /// Sets the start offset of `layer`. The offset must not exceed the packet length; on failure the packet is
    /// unchanged.
    pub fn set_layer_offset(&mut self, pkt: PacketHandle, layer: Layer, offset: usize) -> Result<(), Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(pkt)?;
        if offset > desc.len() {
            let cause: String = format!("offset is past the end of the packet (offset={:?}, len={:?})", offset, desc.len());
            debug!("set_layer_offset(): {:?} {}", layer, &cause);
            return Err(Fail::capacity(&cause));
        }
        desc.set_layer_offset(layer, offset);
        Ok(())
    }

    /// Bytes from the start of `layer` to the end of the data window of the segment that contains it. `None` if the
    /// offset is unset or lies past the data held in the segments.
    pub fn layer_ptr(&self, pkt: PacketHandle, layer: Layer) -> Result<Option<&[u8]>, Fail> {
        let desc: &PacketDescriptor = self.descriptor(pkt)?;
        let chain: &SegmentChain = desc.chain();
        let (index, at): (usize, usize) = match desc.layer_offset(layer).and_then(|offset| chain.locate(offset)) {
            Some(position) => position,
            None => return Ok(None),
        };
        Ok(chain.get(index).map(|segment| &segment.data()[at..]))
    }

    /// Same as [`PacketPool::layer_ptr`], but the bytes may be written.
    pub fn layer_ptr_mut(&mut self, pkt: PacketHandle, layer: Layer) -> Result<Option<&mut [u8]>, Fail> {
        let desc: &mut PacketDescriptor = self.descriptor_mut(pkt)?;
        let (index, at): (usize, usize) = match desc.layer_offset(layer).and_then(|offset| desc.chain().locate(offset))
        {
            Some(position) => position,
            None => return Ok(None),
        };
        Ok(desc.chain_mut().get_mut(index).map(|segment| &mut segment.data_mut()[at..]))
    }

    pub fn layer2_offset(&self, pkt: PacketHandle) -> Result<usize, Fail> {
        Ok(self.layer_offset(pkt, Layer::Link)?.unwrap_or(0))
    }

    pub fn set_layer2_offset(&mut self, pkt: PacketHandle, offset: usize) -> Result<(), Fail> {
        self.set_layer_offset(pkt, Layer::Link, offset)
    }

    pub fn layer2_ptr(&self, pkt: PacketHandle) -> Result<Option<&[u8]>, Fail> {
        self.layer_ptr(pkt, Layer::Link)
    }

    pub fn layer3_offset(&self, pkt: PacketHandle) -> Result<Option<usize>, Fail> {
        self.layer_offset(pkt, Layer::Network)
    }

    pub fn set_layer3_offset(&mut self, pkt: PacketHandle, offset: usize) -> Result<(), Fail> {
        self.set_layer_offset(pkt, Layer::Network, offset)
    }

    pub fn layer3_ptr(&self, pkt: PacketHandle) -> Result<Option<&[u8]>, Fail> {
        self.layer_ptr(pkt, Layer::Network)
    }

    pub fn layer4_offset(&self, pkt: PacketHandle) -> Result<Option<usize>, Fail> {
        self.layer_offset(pkt, Layer::Transport)
    }

    pub fn set_layer4_offset(&mut self, pkt: PacketHandle, offset: usize) -> Result<(), Fail> {
        self.set_layer_offset(pkt, Layer::Transport, offset)
    }

    pub fn layer4_ptr(&self, pkt: PacketHandle) -> Result<Option<&[u8]>, Fail> {
        self.layer_ptr(pkt, Layer::Transport)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
