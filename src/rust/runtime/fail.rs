// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::libc::{
    c_int,
    EBADF,
    EINVAL,
    EIO,
    ENOMEM,
    ENOSPC,
};
use ::std::{
    error,
    fmt,
    io,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Failure
#[derive(Clone, PartialEq, Eq)]
pub struct Fail {
    /// Error code.
    pub errno: c_int,
    /// Cause.
    pub cause: String,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

/// Associate Functions for Failures
impl Fail {
    /// Creates a new Failure
    pub fn new(errno: i32, cause: &str) -> Self {
        Self {
            errno,
            cause: cause.to_string(),
        }
    }

    /// Creates a failure for a request that exceeds the headroom, tailroom or data length of a segment.
    pub fn capacity(cause: &str) -> Self {
        Self::new(EINVAL, cause)
    }

    /// Creates a failure for a pool that cannot satisfy an allocation request.
    pub fn out_of_memory(cause: &str) -> Self {
        Self::new(ENOMEM, cause)
    }

    /// Creates a failure for a stale, out-of-range or sentinel handle.
    pub fn bad_handle(cause: &str) -> Self {
        Self::new(EBADF, cause)
    }

    /// Creates a failure for a copy destination that is too small.
    pub fn no_space(cause: &str) -> Self {
        Self::new(ENOSPC, cause)
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Collapses a result into the numeric status convention used at the handle boundary: `0` on success and the error
/// number otherwise.
pub fn status<T>(result: &Result<T, Fail>) -> c_int {
    match result {
        Ok(_) => 0,
        Err(e) => e.errno,
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// Display Trait Implementation for Failures
impl fmt::Display for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {:?}: {:?}", self.errno, self.cause)
    }
}

/// Debug trait Implementation for Failures
impl fmt::Debug for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {:?}: {:?}", self.errno, self.cause)
    }
}

/// Error Trait Implementation for Failures
impl error::Error for Fail {}

/// Conversion Trait Implementation for Fail
impl From<io::Error> for Fail {
    fn from(e: io::Error) -> Self {
        Self {
            errno: e.raw_os_error().unwrap_or(EIO),
            cause: format!("I/O error: {}", e),
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
