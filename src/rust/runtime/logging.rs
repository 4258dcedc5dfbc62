// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::flexi_logger::{
    Logger,
    LoggerHandle,
};
use ::std::sync::OnceLock;

//======================================================================================================================
// Static Variables
//======================================================================================================================

/// Handle of the global logger. Kept alive for the lifetime of the process.
static LOGGER: OnceLock<Option<LoggerHandle>> = OnceLock::new();

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Initializes logging features. Log levels are read from the `RUST_LOG` environment variable.
pub fn initialize() {
    LOGGER.get_or_init(|| {
        // Another logger may already be installed (e.g. by an embedding application), in which case we keep it.
        match Logger::try_with_env_or_str("") {
            Ok(logger) => logger.start().ok(),
            Err(_) => None,
        }
    });
}
