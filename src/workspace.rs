use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::constants::{WORKSPACE_CHART_DIR, WORKSPACE_FETCH_DIR, WORKSPACE_PROBE_DIR};
use crate::errors::HelmDenoError;
use crate::integrations::helm;
use crate::models::ChartOrigin;
use crate::utils::{copy_dir_recursive, remove_if_exists};

/// Per-invocation temp directory. Removed by [`Workspace::teardown`], or on drop as a backstop,
/// unless it was created with `keep` set.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    chart_dir: PathBuf,
    keep: bool,
    torn_down: bool,
}

impl Workspace {
    pub fn create(keep: bool) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("chart-")
            .disable_cleanup(true)
            .tempdir()
            .context("Could not create temp directory")?
            .path()
            .to_path_buf();
        log::debug!("Temporary directory {} has been created", root.display());

        Ok(Self {
            chart_dir: root.join(WORKSPACE_CHART_DIR),
            root,
            keep,
            torn_down: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    pub fn fetch_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_FETCH_DIR)
    }

    pub fn probe_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_PROBE_DIR)
    }

    pub fn keep(&self) -> bool {
        self.keep
    }

    /// Puts the chart into `chart_dir`: local charts are copied, anything else is fetched with helm.
    pub fn provision(
        &self,
        config: &Config,
        origin: &ChartOrigin,
        chart_location: &str,
        helm_options: &[String],
    ) -> Result<()> {
        if let ChartOrigin::Local(location) = origin {
            log::debug!("Copying chart {location} to temporary directory");
            return copy_dir_recursive(Path::new(location), &self.chart_dir)
                .context("Could not copy chart directory");
        }

        log::debug!("Fetching chart {chart_location} to temporary directory");
        let fetch_dir = self.fetch_dir();
        fs::create_dir_all(&fetch_dir)
            .with_context(|| format!("Could not create {}", fetch_dir.display()))?;
        helm::fetch(config, chart_location, &fetch_dir, helm_options)?;

        let fetched = single_chart_dir(chart_location, &fetch_dir)?;
        copy_dir_recursive(&fetched, &self.chart_dir).context("Could not copy fetched chart")
    }

    pub fn teardown(mut self) -> Result<()> {
        self.torn_down = true;
        if self.keep {
            log::debug!("Keeping temporary directory {}", self.root.display());
            return Ok(());
        }
        remove_if_exists(&self.root)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.torn_down && !self.keep {
            if let Err(err) = remove_if_exists(&self.root) {
                log::debug!("{err:#}");
            }
        }
    }
}

/// `helm fetch --untar` must leave exactly one chart directory next to any archives.
fn single_chart_dir(chart_location: &str, fetch_dir: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(fetch_dir)
        .with_context(|| format!("Could not read {}", fetch_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(HelmDenoError::AmbiguousFetch {
            chart: chart_location.to_string(),
            dir: fetch_dir.to_path_buf(),
            found: dirs.len(),
        }
        .into()),
    }
}
