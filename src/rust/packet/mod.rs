// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod chain;
mod copy;
mod descriptor;
mod handle;
mod metadata;
mod navigation;
mod pool;
mod segment;
mod window;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    descriptor::{
        ContextRef,
        Layer,
        UserContext,
    },
    handle::{
        BufferHandle,
        BufferType,
        PacketHandle,
        SegmentHandle,
    },
    navigation::Segments,
    pool::PacketPool,
    segment::SegmentInfo,
};
