// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use ::anyhow::{
    anyhow,
    Result,
};
use ::crossbeam_channel::{
    Receiver,
    Sender,
};
use ::demipacket::{
    PacketHandle,
    PacketPool,
    PoolConfig,
    SegmentHandle,
};
use ::std::thread::{
    self,
    JoinHandle,
};

//==============================================================================
// Constants
//==============================================================================

/// Number of packets that travel through the pipeline.
const NUM_PACKETS: usize = 64;

/// Header prepended by the first stage and stripped by the second.
const HEADER: &[u8] = b"ETH-HDR-";

//==============================================================================
// Structures
//==============================================================================

/// What the first stage hands to the second one.
type Handoff = (PacketPool, Vec<PacketHandle>);

//==============================================================================
// test_pipeline_handoff()
//==============================================================================

/// Tests handing a pool and its packets from one pipeline stage to another running on a different thread.
#[test]
fn test_pipeline_handoff() -> Result<()> {
    let (to_parser, from_builder): (Sender<Handoff>, Receiver<Handoff>) = crossbeam_channel::bounded(1);
    let (to_main, from_parser): (Sender<Result<usize>>, Receiver<Result<usize>>) = crossbeam_channel::bounded(1);

    // Second stage: strips the header from every packet and checks the payload.
    let parser: JoinHandle<()> = thread::spawn(move || {
        let result: Result<usize> = (|| -> Result<usize> {
            let (mut pool, packets): Handoff = from_builder.recv().map_err(|e| anyhow!("{:?}", e))?;
            for (i, pkt) in packets.iter().enumerate() {
                let seg: SegmentHandle = match pool.segment_at(*pkt, 0) {
                    Some(seg) => seg,
                    None => anyhow::bail!("packet {} has no segments", i),
                };
                demipacket::ensure_eq!(&pool.data(*pkt).map_err(|e| anyhow!("{:?}", e))?[..HEADER.len()], HEADER);
                let payload: &mut [u8] = pool.pull_head(seg, HEADER.len()).map_err(|e| anyhow!("{:?}", e))?;
                demipacket::ensure_eq!(payload, &[i as u8; 32][..]);
                demipacket::ensure_eq!(pool.length(*pkt).map_err(|e| anyhow!("{:?}", e))?, 32);
                pool.free(*pkt);
            }
            Ok(pool.available())
        })();
        // The receiving end only goes away if the test already failed.
        let _ = to_main.send(result);
    });

    // First stage: builds packets and prepends a header into the headroom.
    let mut pool: PacketPool = PacketPool::new(PoolConfig {
        segment_size: 256,
        num_segments: NUM_PACKETS,
        default_headroom: 64,
        default_tailroom: 0,
    })
    .map_err(|e| anyhow!("{:?}", e))?;
    let mut packets: Vec<PacketHandle> = Vec::with_capacity(NUM_PACKETS);
    for i in 0..NUM_PACKETS {
        let pkt: PacketHandle = pool.allocate_from_slice(&[i as u8; 32]).map_err(|e| anyhow!("{:?}", e))?;
        let seg: SegmentHandle = match pool.segment_at(pkt, 0) {
            Some(seg) => seg,
            None => anyhow::bail!("packet {} has no segments", i),
        };
        let frame: &mut [u8] = pool.push_head(seg, HEADER.len()).map_err(|e| anyhow!("{:?}", e))?;
        frame[..HEADER.len()].copy_from_slice(HEADER);
        packets.push(pkt);
    }
    demipacket::ensure_eq!(pool.available(), 0);
    to_parser.send((pool, packets)).map_err(|e| anyhow!("failed to hand off pool: {:?}", e.to_string()))?;

    let available: usize = from_parser.recv().map_err(|e| anyhow!("{:?}", e))??;
    demipacket::ensure_eq!(available, NUM_PACKETS);
    if parser.join().is_err() {
        anyhow::bail!("parser thread panicked");
    }
    Ok(())
}
