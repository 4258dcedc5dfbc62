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
    Config,
    PacketHandle,
    PacketPool,
    PoolConfig,
    SegmentHandle,
};
use ::std::{
    env,
    fs,
    path::PathBuf,
};

//==============================================================================
// Constants
//==============================================================================

const CONFIG_YAML: &str = "
packet_pool:
  segment_size: 512
  num_segments: 4
  default_headroom: 128
  default_tailroom: 16
";

//==============================================================================
// Helper Functions
//==============================================================================

/// Writes the test configuration into a file that is unique to this process and test.
fn write_config(name: &str) -> Result<PathBuf> {
    let path: PathBuf = env::temp_dir().join(format!("demipacket-{}-{}.yaml", name, std::process::id()));
    fs::write(&path, CONFIG_YAML)?;
    Ok(path)
}

//==============================================================================
// test_pool_from_config_file()
//==============================================================================

/// Tests building a packet pool from a configuration file.
#[test]
fn test_pool_from_config_file() -> Result<()> {
    let path: PathBuf = write_config("file")?;
    let config: Config = Config::new(&path.to_string_lossy()).map_err(|e| anyhow!("{:?}", e))?;
    let _ = fs::remove_file(&path);

    let pool_config: PoolConfig = config.pool_config().map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool_config.segment_size, 512);
    demipacket::ensure_eq!(pool_config.num_segments, 4);

    let mut pool: PacketPool = PacketPool::new(pool_config).map_err(|e| anyhow!("{:?}", e))?;
    let pkt: PacketHandle = pool.allocate(64).map_err(|e| anyhow!("{:?}", e))?;
    let seg: SegmentHandle = match pool.segment_at(pkt, 0) {
        Some(seg) => seg,
        None => anyhow::bail!("packet has no first segment"),
    };
    demipacket::ensure_eq!(pool.segment_headroom(seg).map_err(|e| anyhow!("{:?}", e))?, 128);
    demipacket::ensure_eq!(pool.available(), 3);
    Ok(())
}

//==============================================================================
// test_environment_overrides_file()
//==============================================================================

/// Tests that environment variables take precedence over the configuration file.
#[test]
fn test_environment_overrides_file() -> Result<()> {
    let config: Config = Config::parse(CONFIG_YAML).map_err(|e| anyhow!("{:?}", e))?;
    env::set_var("DEFAULT_TAILROOM", "32");
    let result: Result<PoolConfig, demipacket::Fail> = config.pool_config();
    env::remove_var("DEFAULT_TAILROOM");

    let pool_config: PoolConfig = result.map_err(|e| anyhow!("{:?}", e))?;
    demipacket::ensure_eq!(pool_config.default_tailroom, 32);
    demipacket::ensure_eq!(pool_config.default_headroom, 128);
    Ok(())
}

//==============================================================================
// test_missing_file()
//==============================================================================

/// Tests that a missing configuration file is reported with its OS error number.
#[test]
fn test_missing_file() -> Result<()> {
    match Config::new("/nonexistent/demipacket.yaml") {
        Ok(_) => anyhow::bail!("reading a missing file should fail"),
        Err(e) => demipacket::ensure_eq!(e.errno, libc::ENOENT),
    }
    Ok(())
}
