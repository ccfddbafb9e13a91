pub mod chart;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::constants::{HELM_BIN_ENV, HELM_PLUGIN_DIR_ENV};

/// Process-wide settings, read from the environment once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub helm_bin: PathBuf,
    pub plugin_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let helm_bin = std::env::var_os(HELM_BIN_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("helm"));

        let plugin_dir = match std::env::var_os(HELM_PLUGIN_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_plugin_dir()?,
        };

        Ok(Self {
            helm_bin,
            plugin_dir,
        })
    }

    pub fn deno_bin(&self) -> PathBuf {
        self.plugin_dir.join("bin").join("deno")
    }
}

// The plugin installs its binary under `<plugin dir>/bin/`.
fn default_plugin_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not locate the helm-deno executable")?;
    let bin_dir = exe.parent().unwrap_or(Path::new("."));
    Ok(bin_dir.parent().unwrap_or(bin_dir).to_path_buf())
}
