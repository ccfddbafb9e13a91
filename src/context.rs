use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::Path;

use crate::args::template_value_args;
use crate::config::Config;
use crate::config::chart::probe_chart_manifest;
use crate::constants::{
    CHART_CONTEXT_KIND, CHART_CONTEXT_TEMPLATE_FILE, CHART_MANIFEST_FILE, SECRETS_COMMAND,
    TEMPLATES_DIR,
};
use crate::errors::HelmDenoError;
use crate::integrations::helm;
use crate::models::{ChartContext, HelmRelease, Invocation};
use crate::utils::{copy_dir_recursive, remove_if_exists};
use crate::workspace::Workspace;

/// Makes helm print `.Release` and `.Values` back to us as YAML strings.
fn chart_context_template() -> String {
    format!(
        r#"kind: {CHART_CONTEXT_KIND}
spec:
  release: | {{{{- .Release | toYaml | nindent 4 }}}}
  values: | {{{{- .Values | toYaml | nindent 4 }}}}
"#
    )
}

/// Asks helm for the release metadata and merged values of the workspace chart.
///
/// The chart is cloned into a probe chart whose only template echoes the context back;
/// only value flags reach helm. The probe is removed whether or not this succeeds.
pub fn extract(config: &Config, workspace: &Workspace, invocation: &Invocation) -> Result<ChartContext> {
    let probe_dir = workspace.probe_dir();
    let result = render_probe(config, workspace.chart_dir(), &probe_dir, invocation)
        .and_then(|output| parse_chart_context(&output, &invocation.chart_location));

    remove_if_exists(&probe_dir)?;
    result
}

fn render_probe(
    config: &Config,
    chart_dir: &Path,
    probe_dir: &Path,
    invocation: &Invocation,
) -> Result<String> {
    prepare_probe(chart_dir, probe_dir)?;

    let mut args = Vec::new();
    if invocation.uses_secrets() {
        args.push(SECRETS_COMMAND.to_string());
    }
    args.extend([
        "template".to_string(),
        invocation.release_name.clone(),
        probe_dir.to_string_lossy().to_string(),
    ]);
    args.extend(template_value_args(&invocation.options));

    helm::template(config, &args).context("Could not compute chart values")
}

fn prepare_probe(chart_dir: &Path, probe_dir: &Path) -> Result<()> {
    remove_if_exists(probe_dir)?;
    copy_dir_recursive(chart_dir, probe_dir).context("Could not create probe chart")?;

    let templates_dir = probe_dir.join(TEMPLATES_DIR);
    remove_if_exists(&templates_dir)?;
    fs::create_dir_all(&templates_dir)
        .with_context(|| format!("Could not create {}", templates_dir.display()))?;

    fs::write(
        templates_dir.join(CHART_CONTEXT_TEMPLATE_FILE),
        chart_context_template(),
    )
    .context("Could not write chart context template")?;
    fs::write(probe_dir.join(CHART_MANIFEST_FILE), probe_chart_manifest())
        .context("Could not write probe chart manifest")?;

    Ok(())
}

/// Finds the one context document in a multi-document helm output and decodes it.
pub fn parse_chart_context(output: &str, chart: &str) -> Result<ChartContext> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(output) {
        let value = YamlValue::deserialize(document).context("Could not parse helm template output")?;
        if value.get("kind").and_then(YamlValue::as_str) == Some(CHART_CONTEXT_KIND) {
            documents.push(value);
        }
    }

    let document = match documents.len() {
        0 => {
            return Err(HelmDenoError::ChartContextMissing {
                kind: CHART_CONTEXT_KIND.to_string(),
                chart: chart.to_string(),
            }
            .into());
        }
        1 => documents.remove(0),
        count => {
            return Err(HelmDenoError::ChartContextDuplicated {
                kind: CHART_CONTEXT_KIND.to_string(),
                chart: chart.to_string(),
                count,
            }
            .into());
        }
    };

    let release: HelmRelease = serde_yaml::from_str(embedded_yaml(&document, "release")?)
        .map_err(|err| HelmDenoError::ChartContextInvalid {
            field: "release",
            reason: err.to_string(),
        })?;
    let values: JsonValue = serde_yaml::from_str(embedded_yaml(&document, "values")?)
        .map_err(|err| HelmDenoError::ChartContextInvalid {
            field: "values",
            reason: err.to_string(),
        })?;

    Ok(ChartContext {
        release: release.into(),
        values,
    })
}

fn embedded_yaml<'a>(document: &'a YamlValue, field: &'static str) -> Result<&'a str, HelmDenoError> {
    document
        .get("spec")
        .and_then(|spec| spec.get(field))
        .and_then(YamlValue::as_str)
        .ok_or_else(|| HelmDenoError::ChartContextInvalid {
            field,
            reason: format!("spec.{field} is not a string"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReleaseMetadata;

    const HELM_OUTPUT: &str = r#"---
# Source: helm-deno-probe/templates/helm-deno-chart-context.yaml
kind: HelmDenoChartContext
spec:
  release: |
    IsInstall: true
    IsUpgrade: false
    Name: my-release
    Namespace: default
    Revision: 1
    Service: Helm
  values: |
    annotations:
      default-annotation: default-value
    selector:
      app: my-app
    replicas: 2
"#;

    #[test]
    fn test_template_renders_context_document() {
        let template = chart_context_template();
        assert!(template.starts_with("kind: HelmDenoChartContext\n"));
        assert!(template.contains("  release: | {{- .Release | toYaml | nindent 4 }}\n"));
        assert!(template.contains("  values: | {{- .Values | toYaml | nindent 4 }}\n"));
    }

    #[test]
    fn test_parse_chart_context() {
        let context = parse_chart_context(HELM_OUTPUT, "./chart").unwrap();

        assert_eq!(
            context.release,
            ReleaseMetadata {
                name: "my-release".to_string(),
                namespace: "default".to_string(),
                is_install: true,
                is_upgrade: false,
                revision: 1,
                service: "Helm".to_string(),
            }
        );
        assert_eq!(
            context.values,
            serde_json::json!({
                "annotations": { "default-annotation": "default-value" },
                "selector": { "app": "my-app" },
                "replicas": 2,
            })
        );
    }

    #[test]
    fn test_other_documents_are_ignored() {
        let output = format!(
            "---\n# Source: probe/charts/sub/templates/cm.yaml\nkind: ConfigMap\nmetadata:\n  name: sub\n{HELM_OUTPUT}"
        );
        let context = parse_chart_context(&output, "./chart").unwrap();
        assert_eq!(context.release.name, "my-release");
    }

    #[test]
    fn test_missing_document() {
        let err = parse_chart_context("---\nkind: ConfigMap\n", "./chart").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HelmDenoError>(),
            Some(HelmDenoError::ChartContextMissing { .. })
        ));
    }

    #[test]
    fn test_duplicated_document() {
        let output = format!("{HELM_OUTPUT}{HELM_OUTPUT}");
        let err = parse_chart_context(&output, "./chart").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HelmDenoError>(),
            Some(HelmDenoError::ChartContextDuplicated { count: 2, .. })
        ));
    }

    #[test]
    fn test_undecodable_release() {
        let output = "kind: HelmDenoChartContext\nspec:\n  release: |\n    Name: [broken\n  values: |\n    {}\n";
        let err = parse_chart_context(output, "./chart").unwrap_err();
        assert!(err.to_string().contains("Could not decode release"));
    }

    #[test]
    fn test_empty_values() {
        let output = "kind: HelmDenoChartContext\nspec:\n  release: |\n    Name: r\n    Namespace: ns\n  values: |\n    {}\n";
        let context = parse_chart_context(output, "./chart").unwrap();
        assert_eq!(context.values, serde_json::json!({}));
        assert_eq!(context.release.namespace, "ns");
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_renders_probe_and_removes_it() {
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        let bin = tempfile::tempdir().unwrap();
        let log = bin.path().join("args.txt");
        let helm = bin.path().join("helm");
        // Records argv and the probe layout, then prints a canned context document.
        fs::write(
            &helm,
            format!(
                "#!/bin/sh\necho \"$@\" > {log}\nls \"$3/templates\" >> {log}\nhead -n 2 \"$3/Chart.yaml\" >> {log}\ncat <<'EOF'\n{HELM_OUTPUT}EOF\n",
                log = log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&helm, fs::Permissions::from_mode(0o755)).unwrap();
        let config = Config {
            helm_bin: helm,
            plugin_dir: PathBuf::from("/nonexistent"),
        };

        let workspace = Workspace::create(false).unwrap();
        let chart_dir = workspace.chart_dir();
        fs::create_dir_all(chart_dir.join("templates")).unwrap();
        fs::write(chart_dir.join("Chart.yaml"), "apiVersion: v2\nname: real\nversion: 9.9.9\n").unwrap();
        fs::write(chart_dir.join("templates/svc.yaml"), "kind: Service").unwrap();

        let invocation = Invocation {
            command: vec!["upgrade".to_string()],
            release_name: "my-release".to_string(),
            chart_location: "./chart".to_string(),
            options: ["--install", "--set", "a=b", "-n", "ns"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let context = extract(&config, &workspace, &invocation).unwrap();
        assert_eq!(context.release.name, "my-release");

        let recorded = fs::read_to_string(&log).unwrap();
        let probe = workspace.probe_dir();
        assert_eq!(
            recorded,
            format!(
                "template my-release {} --set a=b\nhelm-deno-chart-context.yaml\napiVersion: v2\nname: helm-deno-probe\n",
                probe.display()
            )
        );
        assert!(!probe.exists());
        assert!(chart_dir.join("templates/svc.yaml").is_file());

        workspace.teardown().unwrap();
    }
}
