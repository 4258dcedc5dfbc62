// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::packet::chain::SegmentChain;
use ::std::{
    any::Any,
    fmt,
    sync::Arc,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Protocol layers whose start offsets are tracked per packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Layer 2 (e.g. Ethernet).
    Link = 0,
    /// Layer 3 (e.g. IPv4).
    Network = 1,
    /// Layer 4 (e.g. TCP or UDP).
    Transport = 2,
}

/// Opaque reference stored as user context.
pub type ContextRef = Arc<dyn Any + Send + Sync>;

/// User context attached to a packet. Holds either a reference or an integer, never both.
#[derive(Clone, Default)]
pub enum UserContext {
    #[default]
    Unset,
    Ptr(ContextRef),
    U64(u64),
}

/// Per-packet metadata layered on top of a segment chain.
#[derive(Debug)]
pub struct PacketDescriptor {
    // Generation of the arena slot this descriptor lives in.
    generation: u32,
    chain: SegmentChain,
    // Sum of the data lengths of all segments, unless overridden through `set_length()`.
    total_len: usize,
    // Layer start offsets, measured from the start of the first segment's data window.
    offsets: [Option<usize>; 3],
    user_context: UserContext,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketDescriptor {
    /// Offsets of a freshly initialized packet: layer 2 at the start of the data, layers 3 and 4 unset.
    const DEFAULT_OFFSETS: [Option<usize>; 3] = [Some(0), None, None];

    /// Creates a descriptor with default metadata for `chain`.
    pub fn new(generation: u32, chain: SegmentChain) -> Self {
        let total_len: usize = chain.data_len();
        Self {
            generation,
            chain,
            total_len,
            offsets: Self::DEFAULT_OFFSETS,
            user_context: UserContext::Unset,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut SegmentChain {
        &mut self.chain
    }

    /// Gives up the chain so its storage can go back to the pool.
    pub fn into_chain(self) -> SegmentChain {
        self.chain
    }

    pub fn len(&self) -> usize {
        self.total_len
    }

    pub fn set_len(&mut self, len: usize) {
        self.total_len = len;
    }

    /// Applies a length increase made to one of the segments.
    pub fn grow(&mut self, nbytes: usize) {
        self.total_len += nbytes;
    }

    /// Applies a length reduction made to one of the segments.
    pub fn shrink(&mut self, nbytes: usize) {
        self.total_len = self.total_len.saturating_sub(nbytes);
    }

    pub fn layer_offset(&self, layer: Layer) -> Option<usize> {
        self.offsets[layer as usize]
    }

    pub fn set_layer_offset(&mut self, layer: Layer, offset: usize) {
        self.offsets[layer as usize] = Some(offset);
    }

    pub fn user_context(&self) -> &UserContext {
        &self.user_context
    }

    pub fn set_user_context(&mut self, context: UserContext) {
        self.user_context = context;
    }

    /// Restores default metadata for a packet of `len` bytes. The chain is not touched.
    pub fn reset_metadata(&mut self, len: usize) {
        self.total_len = len;
        self.offsets = Self::DEFAULT_OFFSETS;
        self.user_context = UserContext::Unset;
    }

    /// Copies length, layer offsets and user context from `other`.
    pub fn copy_metadata_from(&mut self, other: &PacketDescriptor) {
        self.total_len = other.total_len;
        self.offsets = other.offsets;
        self.user_context = other.user_context.clone();
    }
}

impl UserContext {
    /// The reference, if the context currently holds one.
    pub fn as_ptr(&self) -> Option<&ContextRef> {
        match self {
            UserContext::Ptr(context) => Some(context),
            _ => None,
        }
    }

    /// The integer, if the context currently holds one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            UserContext::U64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, UserContext::Unset)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserContext::Unset => write!(f, "Unset"),
            UserContext::Ptr(context) => write!(f, "Ptr({:p})", Arc::as_ptr(context)),
            UserContext::U64(value) => write!(f, "U64({})", value),
        }
    }
}

impl PartialEq for UserContext {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UserContext::Unset, UserContext::Unset) => true,
            (UserContext::Ptr(a), UserContext::Ptr(b)) => Arc::ptr_eq(a, b),
            (UserContext::U64(a), UserContext::U64(b)) => a == b,
            _ => false,
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
