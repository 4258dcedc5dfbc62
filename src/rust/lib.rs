// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

pub mod packet;
pub mod runtime;

pub use self::{
    packet::{
        BufferHandle,
        BufferType,
        ContextRef,
        Layer,
        PacketHandle,
        PacketPool,
        SegmentHandle,
        SegmentInfo,
        Segments,
        UserContext,
    },
    runtime::{
        config::{
            Config,
            PoolConfig,
        },
        fail::Fail,
        memory::{
            BufferAllocator,
            MemoryPool,
        },
    },
};

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equal, bailing out of the enclosing function with an [`anyhow::Error`] otherwise.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    ::anyhow::bail!(
                        "ensure_eq failed at {}:{}: {:?} != {:?}",
                        file!(),
                        line!(),
                        left,
                        right
                    );
                }
            },
        }
    };
}
