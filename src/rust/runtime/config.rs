// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    limits,
};
use ::std::{
    fs,
    ops::Index,
};
use ::yaml_rust::{
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Packet pool options.
mod pool_config {
    pub const SECTION_NAME: &str = "packet_pool";
    // Capacity of every segment buffer.
    pub const SEGMENT_SIZE: &str = "segment_size";
    // Number of segment buffers in the pool.
    pub const NUM_SEGMENTS: &str = "num_segments";
    // Bytes prepended before data on alloc.
    pub const DEFAULT_HEADROOM: &str = "default_headroom";
    // Bytes appended after data on alloc.
    pub const DEFAULT_TAILROOM: &str = "default_tailroom";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Configuration file contents.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

/// Parameters of a packet pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Capacity of every segment.
    pub segment_size: usize,
    /// Number of segments backing the pool.
    pub num_segments: usize,
    /// Headroom left before the data window of the first segment on allocate and reset.
    pub default_headroom: usize,
    /// Tailroom left after the data window of the last segment on allocate.
    pub default_tailroom: usize,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let config_s: String = fs::read_to_string(config_path)?;
        Self::parse(&config_s)
    }

    /// Parses configuration text into a [Config] object.
    pub fn parse(config_s: &str) -> Result<Self, Fail> {
        let config: Vec<Yaml> = match YamlLoader::load_from_str(config_s) {
            Ok(config) => config,
            Err(e) => {
                let cause: String = format!("malformed configuration: {:?}", e);
                error!("parse(): {}", cause);
                return Err(Fail::new(libc::EINVAL, &cause));
            },
        };
        let config_obj: &Yaml = match &config[..] {
            &[ref c] => c,
            _ => return Err(Fail::new(libc::EINVAL, "Wrong number of config objects")),
        };

        Ok(Self(config_obj.clone()))
    }

    /// Reads the packet pool parameters. Each option is taken from the environment variable first and then from the
    /// underlying configuration file.
    pub fn pool_config(&self) -> Result<PoolConfig, Fail> {
        let section: &Yaml = self.0.index(pool_config::SECTION_NAME);
        match section {
            Yaml::Hash(_) => (),
            Yaml::BadValue => return Err(Self::bad_option(libc::EINVAL, pool_config::SECTION_NAME, "is missing")),
            _ => return Err(Self::bad_option(libc::EINVAL, pool_config::SECTION_NAME, "is not a mapping")),
        }
        let config: PoolConfig = PoolConfig {
            segment_size: Self::size_option(section, pool_config::SEGMENT_SIZE)?,
            num_segments: Self::size_option(section, pool_config::NUM_SEGMENTS)?,
            default_headroom: Self::size_option(section, pool_config::DEFAULT_HEADROOM)?,
            default_tailroom: Self::size_option(section, pool_config::DEFAULT_TAILROOM)?,
        };
        config.validate()?;
        Ok(config)
    }

    //==================================================================================================================
    // Static Functions
    //==================================================================================================================

    /// Reads a size from the upper-cased environment variable named after `name`, or else from `section`.
    fn size_option(section: &Yaml, name: &str) -> Result<usize, Fail> {
        if let Ok(var) = ::std::env::var(name.to_uppercase()) {
            return match var.trim().parse::<usize>() {
                Ok(value) => Ok(value),
                Err(_) => Err(Self::bad_option(libc::EINVAL, name, "is not a size in the environment")),
            };
        }
        match section.index(name) {
            Yaml::BadValue => Err(Self::bad_option(libc::EINVAL, name, "is missing")),
            Yaml::Integer(value) => match usize::try_from(*value) {
                Ok(value) => Ok(value),
                Err(_) => Err(Self::bad_option(libc::ERANGE, name, "is out of range")),
            },
            _ => Err(Self::bad_option(libc::EINVAL, name, "is not an integer")),
        }
    }

    fn bad_option(errno: libc::c_int, name: &str, problem: &str) -> Fail {
        let cause: String = format!("configuration option \"{}\" {}", name, problem);
        error!("pool_config(): {}", cause);
        Fail::new(errno, &cause)
    }
}

impl PoolConfig {
    /// Checks that a one-byte packet fits in a single segment together with the configured headroom and tailroom.
    pub fn validate(&self) -> Result<(), Fail> {
        if self.segment_size == 0 || self.segment_size > limits::SEGMENT_SIZE_MAX {
            let cause: String = format!("invalid segment size (segment_size={:?})", self.segment_size);
            error!("validate(): {}", cause);
            return Err(Fail::new(libc::ERANGE, &cause));
        }
        if self.num_segments == 0 {
            let cause: String = String::from("pool must hold at least one segment");
            error!("validate(): {}", cause);
            return Err(Fail::new(libc::EINVAL, &cause));
        }
        let reserved: Option<usize> = self.default_headroom.checked_add(self.default_tailroom);
        if reserved.map_or(true, |reserved| reserved >= self.segment_size) {
            let cause: String = format!(
                "headroom and tailroom must leave room for data (segment_size={:?}, headroom={:?}, tailroom={:?})",
                self.segment_size, self.default_headroom, self.default_tailroom
            );
            error!("validate(): {}", cause);
            return Err(Fail::new(libc::EINVAL, &cause));
        }
        Ok(())
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            segment_size: 2048,
            num_segments: 1024,
            default_headroom: 64,
            default_tailroom: 0,
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
