//! Shared harness for helm-deno CLI tests: fake `helm` and `deno` binaries in a temp dir.

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake helm.
///
/// - `template <release> <.../probe>` prints the chart context document built from the
///   probe's `values.yaml`, or fails schema validation when it sets `replicas: many`.
/// - `template <release> <chart>` prints the rendered Deno templates of the chart.
/// - `lint <chart>` echoes its argument, `version` exits with 3.
///
/// Every chart directory it is pointed at is appended to `$HELM_DENO_TEST_LOG`.
const FAKE_HELM: &str = r#"#!/bin/sh
case "$1" in
  template)
    echo "$3" >> "$HELM_DENO_TEST_LOG"
    case "$3" in
      */probe)
        if grep -q '^replicas: many' "$3/values.yaml"; then
          echo "Error: values don't meet the specifications of the schema(s) in: $3/values.schema.json" >&2
          exit 1
        fi
        cat <<DOC
---
kind: HelmDenoChartContext
spec:
  release: |
    Name: $2
    Namespace: default
    IsInstall: true
    IsUpgrade: false
    Revision: 1
    Service: Helm
  values: |
DOC
        sed 's/^/    /' "$3/values.yaml"
        ;;
      *)
        cat "$3/rendered-deno-templates.yaml"
        ;;
    esac
    ;;
  lint)
    echo "linted $2"
    ;;
  version)
    exit 3
    ;;
  *)
    echo "unexpected helm call: $*" >&2
    exit 64
    ;;
esac
"#;

/// Fake deno: fails like an uncaught chart error unless the values carry a selector.
const FAKE_DENO: &str = r#"#!/bin/sh
payload=$(cat)
chart_path=$(echo "$payload" | sed 's/.*"chartPath":"\([^"]*\)".*/\1/')
case "$payload" in
  *'"selector"'*)
    echo '[{"kind":"Service","apiVersion":"v1","metadata":{"name":"my-release"},"spec":{"selector":{"app":"my-app"}}}]'
    ;;
  *)
    echo "error: Uncaught Error: values.selector is required" >&2
    echo "    at file://$chart_path:3:11" >&2
    exit 1
    ;;
esac
"#;

#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    plugin_dir: PathBuf,
    helm_bin: PathBuf,
    log: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let plugin_dir = root.path().join("plugin");
        let helm_bin = root.path().join("bin/helm");
        let log = root.path().join("helm-charts.log");

        write_script(&helm_bin, FAKE_HELM);
        write_script(&plugin_dir.join("bin/deno"), FAKE_DENO);

        Self {
            root,
            plugin_dir,
            helm_bin,
            log,
        }
    }

    /// A Deno chart under the test root with the given `values.yaml`.
    pub fn deno_chart(&self, values: &str) -> PathBuf {
        let chart = self.root.path().join("one-service");
        fs::create_dir_all(chart.join("deno-templates")).unwrap();
        fs::write(
            chart.join("Chart.yaml"),
            "apiVersion: v2\nname: one-service\nversion: 0.1.0\n",
        )
        .unwrap();
        fs::write(chart.join("values.yaml"), values).unwrap();
        fs::write(
            chart.join("deno-templates/index.ts"),
            "export default (context) => []\n",
        )
        .unwrap();
        chart
    }

    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("helm-deno").expect("Failed to locate helm-deno binary");
        cmd.current_dir(self.root.path())
            .env("HELM_BIN", &self.helm_bin)
            .env("HELM_PLUGIN_DIR", &self.plugin_dir)
            .env("HELM_DENO_TEST_LOG", &self.log)
            .env_remove("RUST_LOG");
        cmd
    }

    /// Workspace roots helm was pointed at, in call order.
    pub fn workspace_roots(&self) -> Vec<PathBuf> {
        let contents = fs::read_to_string(&self.log).unwrap_or_default();
        contents
            .lines()
            .filter_map(|line| Path::new(line).parent().map(Path::to_path_buf))
            .collect()
    }
}

fn write_script(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
