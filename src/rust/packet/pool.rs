// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::{
        chain::{
            self,
            Layout,
            SegmentChain,
        },
        descriptor::PacketDescriptor,
        handle::{
            BufferHandle,
            PacketHandle,
        },
    },
    runtime::{
        config::PoolConfig,
        fail::Fail,
        limits,
        logging,
        memory::{
            BufferAllocator,
            MemoryPool,
        },
    },
};
use ::slab::Slab;
use ::std::num::NonZeroUsize;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Packet Pool
///
/// Owns the descriptors of every live packet in an arena and hands out generation-checked [`PacketHandle`]s to
/// them. Segment storage comes from a [`BufferAllocator`] and goes back to it when packets are freed.
pub struct PacketPool {
    allocator: Box<dyn BufferAllocator>,
    packets: Slab<PacketDescriptor>,
    config: PoolConfig,
    // Generation given to the next allocated packet. Never zero.
    generation: u32,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketPool {
    /// Creates a packet pool backed by a [`MemoryPool`] of `config.num_segments` segments.
    pub fn new(config: PoolConfig) -> Result<Self, Fail> {
        config.validate()?;
        let segment_size: NonZeroUsize = match NonZeroUsize::new(config.segment_size) {
            Some(size) => size,
            None => return Err(Fail::new(libc::ERANGE, "segment size cannot be zero")),
        };
        let mut memory: MemoryPool = MemoryPool::new(segment_size)?;
        memory.populate(config.num_segments);
        Self::with_allocator(config, Box::new(memory))
    }

    /// Creates a packet pool on top of an external allocator. The allocator's buffer size must match the configured
    /// segment size.
    pub fn with_allocator(config: PoolConfig, allocator: Box<dyn BufferAllocator>) -> Result<Self, Fail> {
        logging::initialize();
        config.validate()?;
        if allocator.buffer_size() != config.segment_size {
            let cause: String = format!(
                "allocator buffer size does not match segment size (buffer_size={:?}, segment_size={:?})",
                allocator.buffer_size(),
                config.segment_size
            );
            error!("with_allocator(): {}", &cause);
            return Err(Fail::new(libc::EINVAL, &cause));
        }
        trace!("with_allocator(): config={:?} available={:?}", config, allocator.len());

        Ok(Self {
            allocator,
            packets: Slab::new(),
            config,
            generation: 1,
        })
    }

    /// Pool parameters.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of free segment buffers left in the allocator.
    pub fn available(&self) -> usize {
        self.allocator.len()
    }

    /// Number of live packets.
    pub fn in_use(&self) -> usize {
        self.packets.len()
    }

    /// Allocates a packet of `len` bytes.
    ///
    /// The first segment's data window starts `default_headroom` bytes into the segment and the last segment keeps at
    /// least `default_tailroom` bytes after its window. The packet spans as many segments as it takes to honor both.
    pub fn allocate(&mut self, len: usize) -> Result<PacketHandle, Fail> {
        let headroom: usize = self.config.default_headroom;
        let tailroom: usize = self.config.default_tailroom;
        let segment_size: usize = self.config.segment_size;

        if len == 0 {
            debug!("allocate(): packets cannot be empty");
            return Err(Fail::capacity("packets cannot be empty"));
        }
        let count: usize = match chain::segments_needed(segment_size, headroom, tailroom, len) {
            Some(count) => count,
            None => {
                let cause: String = format!("packet does not fit in a segment chain (len={:?})", len);
                debug!("allocate(): {}", &cause);
                return Err(Fail::capacity(&cause));
            },
        };
        if self.packets.vacant_key() >= limits::MAX_PACKETS {
            return Err(Fail::out_of_memory("too many live packets"));
        }

        let capacities: [usize; limits::MAX_SEGMENTS] = [segment_size; limits::MAX_SEGMENTS];
        let layout: Layout = chain::plan(&capacities[..count], headroom, tailroom, len)?;

        let buffers: Vec<Box<[u8]>> = match self.allocator.get_n(count) {
            Some(buffers) => buffers,
            None => {
                let cause: String = format!(
                    "pool cannot satisfy request (segments={:?}, available={:?})",
                    count,
                    self.allocator.len()
                );
                debug!("allocate(): {}", &cause);
                return Err(Fail::out_of_memory(&cause));
            },
        };
        let segments: SegmentChain = match SegmentChain::from_buffers(buffers, &layout) {
            Ok(segments) => segments,
            Err((e, buffers)) => {
                for buffer in buffers {
                    self.allocator.return_buffer(buffer);
                }
                return Err(e);
            },
        };

        let generation: u32 = self.next_generation();
        let key: usize = self.packets.insert(PacketDescriptor::new(generation, segments));
        let pkt: PacketHandle = PacketHandle::new(key, generation);
        trace!("allocate(): pkt={:?} len={:?} segments={:?}", pkt, len, count);
        Ok(pkt)
    }

    /// Allocates a packet holding a copy of `data`.
    pub fn allocate_from_slice(&mut self, data: &[u8]) -> Result<PacketHandle, Fail> {
        let pkt: PacketHandle = self.allocate(data.len())?;
        let desc: &mut PacketDescriptor = self.descriptor_mut(pkt)?;
        let mut offset: usize = 0;
        for segment in desc.chain_mut().iter_mut() {
            let window: &mut [u8] = segment.data_mut();
            let n: usize = window.len();
            window.copy_from_slice(&data[offset..offset + n]);
            offset += n;
        }
        debug_assert_eq!(offset, data.len());
        Ok(pkt)
    }

    /// Frees a packet, returning its segments to the allocator. Stale and invalid handles are ignored.
    pub fn free(&mut self, pkt: PacketHandle) {
        if let Err(e) = self.descriptor(pkt) {
            debug!("free(): {:?}", e);
            return;
        }
        let desc: PacketDescriptor = self.packets.remove(pkt.key());
        for buffer in desc.into_chain().into_buffers() {
            self.allocator.return_buffer(buffer);
        }
        trace!("free(): pkt={:?}", pkt);
    }

    /// Resets all metadata of a packet to default values and lays out `len` bytes of data over its existing segments,
    /// starting at the default headroom. The packet is not modified on failure.
    pub fn reset(&mut self, pkt: PacketHandle, len: usize) -> Result<(), Fail> {
        let headroom: usize = self.config.default_headroom;
        let desc: &mut PacketDescriptor = self.descriptor_mut(pkt)?;
        if let Err(e) = desc.chain_mut().relayout(headroom, len) {
            debug!("reset(): pkt={:?} len={:?}: {:?}", pkt, len, e);
            return Err(e);
        }
        desc.reset_metadata(len);
        Ok(())
    }

    /// Reinterprets a buffer handle as a packet handle. No validity check is made beyond the buffer type tag.
    pub fn from_raw_buffer(buf: BufferHandle) -> PacketHandle {
        PacketHandle::from_buffer(buf)
    }

    /// Reinterprets a packet handle as a buffer handle.
    pub fn to_raw_buffer(pkt: PacketHandle) -> BufferHandle {
        BufferHandle::from(pkt)
    }

    /// Returns `true` if `pkt` refers to a live packet backed by a non-empty chain.
    pub fn is_valid(&self, pkt: PacketHandle) -> bool {
        match self.descriptor(pkt) {
            Ok(desc) => !desc.chain().is_empty(),
            Err(_) => false,
        }
    }

    //==================================================================================================================
    // Internal Functions
    //==================================================================================================================

    /// Resolves a packet handle.
    pub(crate) fn descriptor(&self, pkt: PacketHandle) -> Result<&PacketDescriptor, Fail> {
        match self.packets.get(pkt.key()) {
            Some(desc) if !pkt.is_invalid() && desc.generation() == pkt.generation() => Ok(desc),
            _ => Err(Fail::bad_handle("invalid packet handle")),
        }
    }

    /// Resolves a packet handle.
    pub(crate) fn descriptor_mut(&mut self, pkt: PacketHandle) -> Result<&mut PacketDescriptor, Fail> {
        match self.packets.get_mut(pkt.key()) {
            Some(desc) if !pkt.is_invalid() && desc.generation() == pkt.generation() => Ok(desc),
            _ => Err(Fail::bad_handle("invalid packet handle")),
        }
    }

    /// Resolves two distinct packet handles at once.
    pub(crate) fn descriptor_pair_mut(
        &mut self,
        first: PacketHandle,
        second: PacketHandle,
    ) -> Result<(&mut PacketDescriptor, &mut PacketDescriptor), Fail> {
        self.descriptor(first)?;
        self.descriptor(second)?;
        match self.packets.get2_mut(first.key(), second.key()) {
            Some(pair) => Ok(pair),
            None => Err(Fail::bad_handle("packet handles must refer to distinct packets")),
        }
    }

    // Hands out generations 1, 2, ..., wrapping around but never yielding zero.
    fn next_generation(&mut self) -> u32 {
        let generation: u32 = self.generation;
        self.generation = match self.generation.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        generation
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
