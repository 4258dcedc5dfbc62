// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use ::anyhow::{
    anyhow,
    Result,
};
use ::demipacket::{
    runtime::fail,
    ContextRef,
    PacketHandle,
    PacketPool,
    PoolConfig,
    SegmentHandle,
    SegmentInfo,
};
use ::std::sync::Arc;

//==============================================================================
// Constants
//==============================================================================

/// Capacity of every segment in the test pool.
const SEGMENT_SIZE: usize = 256;

/// Headroom reserved in front of freshly allocated packets.
const HEADROOM: usize = 64;

//==============================================================================
// Helper Functions
//==============================================================================

fn new_pool() -> Result<PacketPool> {
    let config: PoolConfig = PoolConfig {
        segment_size: SEGMENT_SIZE,
        num_segments: 32,
        default_headroom: HEADROOM,
        default_tailroom: 0,
    };
    PacketPool::new(config).map_err(|e| anyhow!("failed to create pool: {:?}", e))
}

fn first_segment(pool: &PacketPool, pkt: PacketHandle) -> Result<SegmentHandle> {
    match pool.segment_at(pkt, 0) {
        Some(seg) => Ok(seg),
        None => anyhow::bail!("packet has no first segment"),
    }
}

//==============================================================================
// test_allocate_single_segment()
//==============================================================================

/// Tests that a small allocation lands in one segment, after the default headroom.
#[test]
fn test_allocate_single_segment() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(100).map_err(|e| anyhow!("{:?}", e))?;
    let seg: SegmentHandle = first_segment(&pool, pkt)?;

    let info: SegmentInfo = pool.segment_info(seg).map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(info.data as usize - info.addr as usize, 64);
    demipacket::ensure_eq!(info.data_len, 100);
    demipacket::ensure_eq!(pool.segment_headroom(seg).map_err(|e| anyhow!("{:?}", e))?, 64);
    demipacket::ensure_eq!(pool.segment_tailroom(seg).map_err(|e| anyhow!("{:?}", e))?, 92);
    demipacket::ensure_eq!(pool.length(pkt).map_err(|e| anyhow!("{:?}", e))?, 100);
    demipacket::ensure_eq!(pool.is_segmented(pkt).map_err(|e| anyhow!("{:?}", e))?, false);

    pool.free(pkt);
    Ok(())
}

//==============================================================================
// test_layer3_offset()
//==============================================================================

/// Tests that the layer 3 pointer starts at the layer 3 offset and ends with the segment data.
#[test]
fn test_layer3_offset() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(100).map_err(|e| anyhow!("{:?}", e))?;

    pool.set_layer3_offset(pkt, 14).map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool.layer3_offset(pkt).map_err(|e| anyhow!("{:?}", e))?, Some(14));

    let data: *const u8 = pool.data(pkt).map_err(|e| anyhow!("{:?}", e))?.as_ptr();
    let l3: &[u8] = match pool.layer3_ptr(pkt).map_err(|e| anyhow!("{:?}", e))? {
        Some(l3) => l3,
        None => anyhow::bail!("layer 3 offset should be set"),
    };
    demipacket::ensure_eq!(l3.as_ptr(), data.wrapping_add(14));
    demipacket::ensure_eq!(l3.len(), 86);
    Ok(())
}

//==============================================================================
// test_user_context_overwrite()
//==============================================================================

/// Tests that storing an integer context discards a previously stored reference.
#[test]
fn test_user_context_overwrite() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(100).map_err(|e| anyhow!("{:?}", e))?;

    let context: ContextRef = Arc::new(String::from("connection"));
    pool.set_user_context_ptr(pkt, context).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_user_context_u64(pkt, 42).map_err(|e| anyhow!("{:?}", e))?;

    demipacket::ensure_eq!(pool.user_context_ptr(pkt).map_err(|e| anyhow!("{:?}", e))?.is_none(), true);
    demipacket::ensure_eq!(pool.user_context_u64(pkt).map_err(|e| anyhow!("{:?}", e))?, Some(42));
    Ok(())
}

//==============================================================================
// test_copy_into_small_destination()
//==============================================================================

/// Tests that a failed copy leaves the destination exactly as it was.
#[test]
fn test_copy_into_small_destination() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let payload: Vec<u8> = (0..400u32).map(|i| i as u8).collect();
    let src: PacketHandle = pool.allocate_from_slice(&payload).map_err(|e| anyhow!("{:?}", e))?;
    let dst: PacketHandle = pool.allocate_from_slice(b"original").map_err(|e| anyhow!("{:?}", e))?;
    pool.set_layer4_offset(dst, 3).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_user_context_u64(dst, 11).map_err(|e| anyhow!("{:?}", e))?;
    let seg: SegmentHandle = first_segment(&pool, dst)?;
    let before: SegmentInfo = pool.segment_info(seg).map_err(|e| anyhow!("{:?}", e))?;

    let result: Result<(), demipacket::Fail> = pool.copy(dst, src);
    demipacket::ensure_eq!(fail::status(&result), libc::ENOSPC);

    demipacket::ensure_eq!(pool.segment_info(seg).map_err(|e| anyhow!("{:?}", e))?, before);
    demipacket::ensure_eq!(pool.to_vec(dst).map_err(|e| anyhow!("{:?}", e))?, b"original".to_vec());
    demipacket::ensure_eq!(pool.length(dst).map_err(|e| anyhow!("{:?}", e))?, 8);
    demipacket::ensure_eq!(pool.layer4_offset(dst).map_err(|e| anyhow!("{:?}", e))?, Some(3));
    demipacket::ensure_eq!(pool.user_context_u64(dst).map_err(|e| anyhow!("{:?}", e))?, Some(11));
    Ok(())
}

//==============================================================================
// test_reset_too_long()
//==============================================================================

/// Tests that a reset past the packet's capacity fails without touching its metadata.
#[test]
fn test_reset_too_long() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(100).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_layer3_offset(pkt, 14).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_layer4_offset(pkt, 34).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_user_context_u64(pkt, 7).map_err(|e| anyhow!("{:?}", e))?;

    let huge: usize = pool.buffer_capacity(pkt).map_err(|e| anyhow!("{:?}", e))? - HEADROOM + 1;
    demipacket::ensure_eq!(fail::status(&pool.reset(pkt, huge)), libc::EINVAL);

    demipacket::ensure_eq!(pool.length(pkt).map_err(|e| anyhow!("{:?}", e))?, 100);
    demipacket::ensure_eq!(pool.layer3_offset(pkt).map_err(|e| anyhow!("{:?}", e))?, Some(14));
    demipacket::ensure_eq!(pool.layer4_offset(pkt).map_err(|e| anyhow!("{:?}", e))?, Some(34));
    demipacket::ensure_eq!(pool.user_context_u64(pkt).map_err(|e| anyhow!("{:?}", e))?, Some(7));
    Ok(())
}

//==============================================================================
// test_reset_restores_defaults()
//==============================================================================

/// Tests that a successful reset lays out the new length and clears metadata.
#[test]
fn test_reset_restores_defaults() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(100).map_err(|e| anyhow!("{:?}", e))?;
    let seg: SegmentHandle = first_segment(&pool, pkt)?;
    pool.push_head(seg, 14).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_layer2_offset(pkt, 4).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_layer3_offset(pkt, 18).map_err(|e| anyhow!("{:?}", e))?;
    pool.set_user_context_u64(pkt, 1).map_err(|e| anyhow!("{:?}", e))?;

    pool.reset(pkt, 150).map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool.length(pkt).map_err(|e| anyhow!("{:?}", e))?, 150);
    demipacket::ensure_eq!(pool.segment_headroom(seg).map_err(|e| anyhow!("{:?}", e))?, HEADROOM);
    demipacket::ensure_eq!(pool.segment_data_length(seg).map_err(|e| anyhow!("{:?}", e))?, 150);
    demipacket::ensure_eq!(pool.layer2_offset(pkt).map_err(|e| anyhow!("{:?}", e))?, 0);
    demipacket::ensure_eq!(pool.layer3_offset(pkt).map_err(|e| anyhow!("{:?}", e))?, None);
    demipacket::ensure_eq!(pool.user_context(pkt).map_err(|e| anyhow!("{:?}", e))?.is_set(), false);
    Ok(())
}

//==============================================================================
// test_multi_segment_reset()
//==============================================================================

/// Tests that a reset spreads data over every segment of a chained packet.
#[test]
fn test_multi_segment_reset() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(600).map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool.segment_count(pkt).map_err(|e| anyhow!("{:?}", e))?, 3);

    // Too short to leave a byte in every segment.
    demipacket::ensure_eq!(fail::status(&pool.reset(pkt, 2)), libc::EINVAL);

    pool.reset(pkt, 3).map_err(|e| anyhow!("{:?}", e))?;
    let lengths: Vec<usize> = pool
        .segments(pkt)
        .map(|seg| pool.segment_data_length(seg).unwrap_or(0))
        .collect();
    demipacket::ensure_eq!(lengths, vec![1, 1, 1]);

    // Every byte of capacity past the headroom can be used.
    pool.reset(pkt, 3 * SEGMENT_SIZE - HEADROOM).map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool.length(pkt).map_err(|e| anyhow!("{:?}", e))?, 3 * SEGMENT_SIZE - HEADROOM);
    Ok(())
}

//==============================================================================
// test_raw_buffer_round_trip()
//==============================================================================

/// Tests that packet handles survive the trip through the raw buffer token.
#[test]
fn test_raw_buffer_round_trip() -> Result<()> {
    let mut pool: PacketPool = new_pool()?;
    let pkt: PacketHandle = pool.allocate(10).map_err(|e| anyhow!("{:?}", e))?;
    let token: u64 = PacketPool::to_raw_buffer(pkt).into_raw();
    let back: PacketHandle = PacketPool::from_raw_buffer(demipacket::BufferHandle::from_raw(token));
    demipacket::ensure_eq!(back, pkt);
    demipacket::ensure_eq!(pool.is_valid(back), true);

    pool.free(pkt);
    demipacket::ensure_eq!(pool.is_valid(back), false);
    demipacket::ensure_eq!(pool.available(), 32);
    Ok(())
}
