// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::limits;
use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Opaque handle to a packet living in a [`PacketPool`](crate::packet::PacketPool).
///
/// A handle is an arena key paired with the generation the entry had when the packet was allocated. Once the packet
/// is freed its slot may be reused, but the new occupant gets a fresh generation, so stale handles never resolve.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketHandle {
    key: u32,
    generation: u32,
}

/// Opaque handle to one segment of a packet chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentHandle {
    packet: PacketHandle,
    index: u16,
}

/// Opaque handle to a buffer, as seen by the generic buffer layer.
///
/// The raw token form carries the buffer type in its lower bits, the arena key above them, and the generation in the
/// upper half.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    key: u32,
    generation: u32,
    tag: BufferType,
}

/// Buffer type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Buffer has not been tagged. Only the invalid handle uses this.
    Invalid = 0,
    /// Generic buffer without packet metadata.
    Raw = 1,
    /// Buffer that carries a packet descriptor.
    Packet = 2,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketHandle {
    /// Distinguished invalid packet handle. Generation zero is never handed out.
    pub const INVALID: Self = Self {
        key: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(key: usize, generation: u32) -> Self {
        debug_assert!(key < limits::MAX_PACKETS);
        debug_assert_ne!(generation, 0);
        Self {
            key: key as u32,
            generation,
        }
    }

    /// Returns `true` if this is the distinguished invalid handle.
    pub fn is_invalid(&self) -> bool {
        self.generation == 0
    }

    pub(crate) fn key(&self) -> usize {
        self.key as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    /// Converts this handle into a raw token (useful for FFI) that can be turned back with `from_raw()`.
    pub fn into_raw(self) -> u64 {
        BufferHandle::from(self).into_raw()
    }

    /// Recovers a packet handle from a raw token. Tokens not tagged as packets yield [`PacketHandle::INVALID`].
    pub fn from_raw(token: u64) -> Self {
        Self::from_buffer(BufferHandle::from_raw(token))
    }

    /// Reinterprets a buffer handle as a packet handle. Only the type tag is checked.
    pub fn from_buffer(buf: BufferHandle) -> Self {
        match buf.tag {
            BufferType::Packet => Self {
                key: buf.key,
                generation: buf.generation,
            },
            _ => Self::INVALID,
        }
    }
}

impl SegmentHandle {
    /// Distinguished invalid segment handle.
    pub const INVALID: Self = Self {
        packet: PacketHandle::INVALID,
        index: u16::MAX,
    };

    pub(crate) fn new(packet: PacketHandle, index: usize) -> Self {
        debug_assert!(index < limits::MAX_SEGMENTS);
        Self {
            packet,
            index: index as u16,
        }
    }

    /// Returns `true` if this is the distinguished invalid handle.
    pub fn is_invalid(&self) -> bool {
        self.packet.is_invalid()
    }

    /// Packet that owns this segment.
    pub fn packet(&self) -> PacketHandle {
        self.packet
    }

    /// Position of this segment in its chain.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl BufferType {
    const MASK: u64 = 0x3;
}

impl BufferHandle {
    /// Distinguished invalid buffer handle.
    pub const INVALID: Self = Self {
        key: u32::MAX,
        generation: 0,
        tag: BufferType::Invalid,
    };

    /// Creates a handle for a generic buffer. Keys that do not fit in the raw token yield [`BufferHandle::INVALID`].
    pub fn raw(key: u32, generation: u32) -> Self {
        if key as usize >= limits::MAX_PACKETS {
            return Self::INVALID;
        }
        Self {
            key,
            generation,
            tag: BufferType::Raw,
        }
    }

    /// Type of the buffer.
    pub fn buffer_type(&self) -> BufferType {
        self.tag
    }

    /// Returns `true` if this is the distinguished invalid handle.
    pub fn is_invalid(&self) -> bool {
        self.tag == BufferType::Invalid
    }

    /// Converts this handle into a raw token.
    pub fn into_raw(self) -> u64 {
        if self.is_invalid() {
            return 0;
        }
        ((self.generation as u64) << 32) | ((self.key as u64) << 2) | (self.tag as u64)
    }

    /// Recovers a buffer handle from a raw token.
    pub fn from_raw(token: u64) -> Self {
        let tag: BufferType = BufferType::from(token & BufferType::MASK);
        if tag == BufferType::Invalid {
            return Self::INVALID;
        }
        Self {
            key: ((token & 0xffff_ffff) >> 2) as u32,
            generation: (token >> 32) as u32,
            tag,
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl From<u64> for BufferType {
    fn from(tag_value: u64) -> Self {
        match tag_value {
            1 => BufferType::Raw,
            2 => BufferType::Packet,
            _ => BufferType::Invalid,
        }
    }
}

impl From<PacketHandle> for BufferHandle {
    fn from(pkt: PacketHandle) -> Self {
        if pkt.is_invalid() {
            return BufferHandle::INVALID;
        }
        Self {
            key: pkt.key,
            generation: pkt.generation,
            tag: BufferType::Packet,
        }
    }
}

impl fmt::Debug for PacketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return write!(f, "PacketHandle(INVALID)");
        }
        write!(f, "PacketHandle({}v{})", self.key, self.generation)
    }
}

impl fmt::Debug for SegmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return write!(f, "SegmentHandle(INVALID)");
        }
        write!(f, "SegmentHandle({:?}#{})", self.packet, self.index)
    }
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferHandle({:?}, {}v{})", self.tag, self.key, self.generation)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
