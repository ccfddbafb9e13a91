use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CHART_MANIFEST_FILE;
use crate::models::ChartMetadata;

/// A location is a local chart iff `Chart.yaml` sits directly under it.
pub fn is_local_chart(location: &Path) -> bool {
    location.join(CHART_MANIFEST_FILE).is_file()
}

pub fn load_chart_metadata(chart_dir: &Path) -> Result<ChartMetadata> {
    let path = chart_dir.join(CHART_MANIFEST_FILE);
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read chart manifest at {}", path.display()))?;

    let metadata: ChartMetadata = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse chart manifest at {}", path.display()))?;

    Ok(metadata)
}

/// Where `helm package <chart> --destination <chart>` leaves its archive.
pub fn chart_package_path(chart_dir: &Path) -> Result<PathBuf> {
    let metadata = load_chart_metadata(chart_dir)?;
    Ok(chart_dir.join(format!("{}-{}.tgz", metadata.name, metadata.version)))
}

/// Minimal standalone manifest for the probe chart.
pub fn probe_chart_manifest() -> String {
    "apiVersion: v2\nname: helm-deno-probe\nversion: 0.0.0\n".to_string()
}
