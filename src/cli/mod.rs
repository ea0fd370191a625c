pub mod log;
pub mod policy;
pub mod run;
pub mod stats;

use crate::config::HitlConfig;
use anyhow::Result;
use std::path::Path;

/// Load an explicit config file, or discover one from the current directory.
pub fn load_config(path: Option<&Path>) -> Result<HitlConfig> {
    match path {
        Some(p) => HitlConfig::load(p),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(HitlConfig::discover(&cwd)?.0)
        }
    }
}
