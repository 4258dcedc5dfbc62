// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

/// Maximum number of segments in a single packet chain.
pub const MAX_SEGMENTS: usize = 16;

/// Maximum capacity of a single segment. Bounds the memory pinned by one segment buffer.
pub const SEGMENT_SIZE_MAX: usize = u16::MAX as usize;

/// Maximum number of live packets in a pool. Arena keys must fit in the 30 bits left over by the buffer type tag.
pub const MAX_PACKETS: usize = 1 << 30;
