//! `clipsplit init-config` – write the default config file.

use anyhow::Result;
use clipsplit_core::config;

pub fn run_init_config() -> Result<()> {
    let path = config::init_default()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
