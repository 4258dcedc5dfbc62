// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    packet::{
        descriptor::PacketDescriptor,
        handle::PacketHandle,
        pool::PacketPool,
        segment::Segment,
    },
    runtime::fail::Fail,
};
use ::std::mem;

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl PacketPool {
    /// Returns `true` if the packet spans more than one segment.
    pub fn is_segmented(&self, pkt: PacketHandle) -> Result<bool, Fail> {
        Ok(self.descriptor(pkt)?.chain().len() > 1)
    }

    /// Copies the data and metadata of `src` into `dst`.
    ///
    /// The destination must have a total capacity of at least the source length. Its data is laid out over its
    /// existing segments front to back, keeping the headroom of its first segment when the data still fits after it and
    /// shrinking that headroom otherwise. Length, layer offsets and user context are copied as well. On failure `dst` is
    /// not modified.
    pub fn copy(&mut self, dst: PacketHandle, src: PacketHandle) -> Result<(), Fail> {
        if dst == src {
            self.descriptor(dst)?;
            return Ok(());
        }
        let (to, from): (&mut PacketDescriptor, &mut PacketDescriptor) = self.descriptor_pair_mut(dst, src)?;

        // Bytes actually moved. The declared length may differ after `set_length()`, and both must fit.
        let len: usize = from.chain().data_len();
        let required: usize = len.max(from.len());
        let capacity: usize = to.chain().capacity();
        if capacity < required {
            let cause: String = format!("destination is too small (len={:?}, capacity={:?})", required, capacity);
            debug!("copy(): dst={:?} src={:?}: {}", dst, src, &cause);
            return Err(Fail::no_space(&cause));
        }
        if len < to.chain().len() {
            let cause: String = format!(
                "source cannot fill every destination segment (len={:?}, segments={:?})",
                len,
                to.chain().len()
            );
            debug!("copy(): dst={:?} src={:?}: {}", dst, src, &cause);
            return Err(Fail::capacity(&cause));
        }
        let headroom: usize = to.chain().first().headroom().min(capacity - len);
        to.chain_mut().relayout(headroom, len)?;

        let mut chunks = from.chain().iter().map(Segment::data);
        let mut pending: &[u8] = &[];
        for segment in to.chain_mut().iter_mut() {
            let mut window: &mut [u8] = segment.data_mut();
            while !window.is_empty() {
                if pending.is_empty() {
                    pending = match chunks.next() {
                        Some(chunk) => chunk,
                        None => break,
                    };
                }
                let n: usize = window.len().min(pending.len());
                let (head, rest): (&mut [u8], &mut [u8]) = mem::take(&mut window).split_at_mut(n);
                head.copy_from_slice(&pending[..n]);
                window = rest;
                pending = &pending[n..];
            }
        }
        to.copy_metadata_from(from);

        trace!("copy(): dst={:?} src={:?} len={:?}", dst, src, len);
        Ok(())
    }

    /// Gathers the data of every segment into one contiguous vector.
    pub fn to_vec(&self, pkt: PacketHandle) -> Result<Vec<u8>, Fail> {
        let desc: &PacketDescriptor = self.descriptor(pkt)?;
        let mut bytes: Vec<u8> = Vec::with_capacity(desc.chain().data_len());
        for segment in desc.chain() {
            bytes.extend_from_slice(segment.data());
        }
        Ok(bytes)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
