use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::constants::{DENO_BUNDLE_FILE, DENO_ENTRYPOINT_FILE};
use crate::errors::HelmDenoError;
use crate::models::BundlePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleDecision {
    UseScriptEntryPoint,
    UseBundledArtifact,
}

/// The policy table: `ignore` never looks at the bundle, `require` fails without one,
/// `prefer` falls back to the entry point.
pub fn decide(policy: BundlePolicy, bundle_exists: bool) -> Result<BundleDecision, HelmDenoError> {
    match (policy, bundle_exists) {
        (BundlePolicy::Ignore, _) => Ok(BundleDecision::UseScriptEntryPoint),
        (BundlePolicy::Require, true) | (BundlePolicy::Prefer, true) => {
            Ok(BundleDecision::UseBundledArtifact)
        }
        (BundlePolicy::Require, false) => Err(HelmDenoError::BundleMissing),
        (BundlePolicy::Prefer, false) => Ok(BundleDecision::UseScriptEntryPoint),
    }
}

pub fn entrypoint_path(chart_dir: &Path) -> PathBuf {
    chart_dir.join(DENO_ENTRYPOINT_FILE)
}

pub fn bundle_path(chart_dir: &Path) -> PathBuf {
    chart_dir.join(DENO_BUNDLE_FILE)
}

/// Picks the module deno should load for `chart_dir`.
pub fn resolve(chart_dir: &Path, policy: BundlePolicy) -> Result<PathBuf> {
    let bundle = bundle_path(chart_dir);
    let bundle_exists = policy != BundlePolicy::Ignore && bundle.is_file();

    let path = match decide(policy, bundle_exists)? {
        BundleDecision::UseBundledArtifact => bundle,
        BundleDecision::UseScriptEntryPoint => entrypoint_path(chart_dir),
    };
    log::debug!("Using {} for policy {:?}", path.display(), policy);
    Ok(path)
}
