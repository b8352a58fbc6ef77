use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use gatescope_gates::{Component, collect};
use gatescope_k8s::{KubeClient, PodSource};

mod config;
mod report;

use config::{FileConfig, OutputFormat, Preset, Settings, parse_component};

const EXIT_SUCCESS: u8 = 0;

/// Connection, retrieval, config or output failure
const EXIT_FAILURE: u8 = 1;

/// Exit status when `--strict` is set and a flag could not be parsed
const EXIT_MALFORMED: u8 = 2;

/// Gatescope - report the feature gates enabled on a cluster's control plane
#[derive(Parser, Debug)]
#[command(name = "gatescope")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Kubernetes context name (defaults to the kubeconfig's current context)
    #[arg(long, value_name = "CONTEXT")]
    context: Option<String>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Built-in set of components to inspect
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Component to inspect, matched by pod name substring (repeatable)
    #[arg(long = "component", value_name = "NAME[=MATCH]", value_parser = parse_component)]
    components: Vec<Component>,

    /// Output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Deadline for listing pods, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Exit with status 2 if any container has a malformed --feature-gates flag
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(exit_status(run(args).await))
}

/// Map the outcome of a run to the process exit status, reporting errors on stderr
fn exit_status(result: Result<u8>) -> u8 {
    match result {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn run(args: Args) -> Result<u8> {
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, &args)?;
    tracing::debug!(?settings, "resolved settings");

    let client = KubeClient::connect(settings.context.as_deref())
        .await
        .context("Failed to connect to cluster")?;

    let mut stdout = std::io::stdout().lock();
    run_with(&client, &settings, args.strict, &mut stdout)
        .await
        .with_context(|| format!("Cluster context {}", client.context()))
}

/// Collect from `source`, write the report to `out` and pick the exit status
async fn run_with<S: PodSource, W: Write>(
    source: &S,
    settings: &Settings,
    strict: bool,
    out: &mut W,
) -> Result<u8> {
    let matrix = collect(source, &settings.components, settings.timeout)
        .await
        .context("Failed to collect feature gates")?;

    report::render(out, &matrix, settings.output, chrono::Utc::now())
        .context("Failed to write report")?;

    let malformed = matrix.malformed_count();
    if strict && malformed > 0 {
        tracing::warn!(malformed, "containers with malformed feature gates");
        return Ok(EXIT_MALFORMED);
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use gatescope_k8s::{ClusterError, ContainerInfo, PodInfo};

    struct StaticPods(Vec<PodInfo>);

    impl PodSource for StaticPods {
        async fn list_pods(
            &self,
            _namespace: &str,
            _timeout: Duration,
        ) -> Result<Vec<PodInfo>, ClusterError> {
            Ok(self.0.clone())
        }
    }

    struct TimedOut;

    impl PodSource for TimedOut {
        async fn list_pods(
            &self,
            namespace: &str,
            timeout: Duration,
        ) -> Result<Vec<PodInfo>, ClusterError> {
            Err(ClusterError::Timeout {
                namespace: namespace.to_string(),
                secs: timeout.as_secs(),
            })
        }
    }

    fn settings(extra: &[&str]) -> Settings {
        let args = Args::parse_from(std::iter::once("gatescope").chain(extra.iter().copied()));
        Settings::resolve(FileConfig::default(), &args).unwrap()
    }

    fn apiserver(flag: &str) -> StaticPods {
        StaticPods(vec![
            PodInfo::new("kube-apiserver-1")
                .with_container(ContainerInfo::new("kube-apiserver").with_args([flag])),
        ])
    }

    #[tokio::test]
    async fn test_success_exits_zero_after_report() {
        let mut out = Vec::new();
        let status = exit_status(
            run_with(&apiserver("--feature-gates=Foo=true"), &settings(&[]), true, &mut out)
                .await,
        );

        assert_eq!(status, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("        Foo: true"));
        assert!(text.contains("### kube-proxy"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_exits_one() {
        let mut out = Vec::new();
        let status = exit_status(run_with(&TimedOut, &settings(&[]), false, &mut out).await);

        assert_eq!(status, 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_gates_exit_two_only_when_strict() {
        let source = apiserver("--feature-gates=A=true,Bfalse");

        let mut out = Vec::new();
        let status = exit_status(run_with(&source, &settings(&[]), true, &mut out).await);
        assert_eq!(status, 2);
        assert!(String::from_utf8(out).unwrap().contains("token \"Bfalse\""));

        let mut out = Vec::new();
        let status = exit_status(run_with(&source, &settings(&[]), false, &mut out).await);
        assert_eq!(status, 0);
    }
}
