//! Report rendering

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use gatescope_gates::{ContainerGates, FeatureGateMatrix, render_feature_gates};
use gatescope_k8s::SYSTEM_NAMESPACE;

use crate::config::OutputFormat;

const TEXT_HEADER: &str = "===== k8s running cluster feature gate checker =====";

/// JSON document layout
#[derive(Serialize)]
struct JsonReport<'a> {
    namespace: &'a str,
    collected_at: DateTime<Utc>,
    components: &'a FeatureGateMatrix,
}

/// Write the matrix to `out` in the requested format
pub fn render<W: Write>(
    out: &mut W,
    matrix: &FeatureGateMatrix,
    format: OutputFormat,
    collected_at: DateTime<Utc>,
) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(out, matrix)?,
        OutputFormat::Flags => render_flags(out, matrix)?,
        OutputFormat::Json => {
            let report = JsonReport {
                namespace: SYSTEM_NAMESPACE,
                collected_at,
                components: matrix,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn render_text<W: Write>(out: &mut W, matrix: &FeatureGateMatrix) -> std::io::Result<()> {
    writeln!(out, "{}", TEXT_HEADER)?;

    for component in &matrix.components {
        writeln!(out)?;
        writeln!(out, "### {}", component.name)?;

        if component.pods.is_empty() {
            writeln!(out, "    No Pods Found")?;
            continue;
        }

        for pod in &component.pods {
            for container in &pod.containers {
                let path = format!("{}/{}", pod.name, container.name);
                match &container.gates {
                    ContainerGates::Configured { entries } if !entries.is_empty() => {
                        writeln!(out, "    {}:", path)?;
                        for entry in entries {
                            writeln!(out, "        {}: {}", entry.key, entry.value)?;
                        }
                    }
                    ContainerGates::Configured { .. } | ContainerGates::NotFound => {
                        writeln!(out, "    {}: No Feature Gates Found", path)?;
                    }
                    ContainerGates::Malformed { token } => {
                        writeln!(out, "    {}: Malformed Feature Gates (token {:?})", path, token)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn render_flags<W: Write>(out: &mut W, matrix: &FeatureGateMatrix) -> std::io::Result<()> {
    for component in &matrix.components {
        for pod in &component.pods {
            for container in &pod.containers {
                if let ContainerGates::Configured { entries } = &container.gates {
                    writeln!(
                        out,
                        "{}/{} --feature-gates={}",
                        pod.name,
                        container.name,
                        render_feature_gates(entries)
                    )?;
                }
            }
        }
    }
    Ok(())
}
