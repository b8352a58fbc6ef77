//! Configuration file and CLI flag resolution
//!
//! CLI flags win over the config file, which wins over built-in defaults.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use gatescope_gates::{Component, ComponentSet};

use crate::Args;

/// Default deadline for the pod list call
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Built-in component sets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// kube-apiserver and kube-scheduler
    Minimal,
    /// Adds kube-controller-manager and kube-proxy
    #[default]
    Full,
}

impl Preset {
    pub fn components(self) -> ComponentSet {
        match self {
            Self::Minimal => ComponentSet::minimal(),
            Self::Full => ComponentSet::full(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Grouped by component, one gate per line
    #[default]
    Text,
    /// The whole matrix as JSON
    Json,
    /// One `pod/container --feature-gates=...` line per configured container
    Flags,
}

/// Contents of the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub context: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output: Option<OutputFormat>,
    pub preset: Option<Preset>,
    pub components: Option<Vec<Component>>,
}

impl FromStr for FileConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Effective settings for one run
#[derive(Debug)]
pub struct Settings {
    pub context: Option<String>,
    pub timeout: Duration,
    pub output: OutputFormat,
    pub components: ComponentSet,
}

impl Settings {
    pub fn resolve(file: FileConfig, args: &Args) -> Result<Self> {
        let components = if !args.components.is_empty() {
            ComponentSet::new(args.components.clone()).context("Invalid --component flags")?
        } else if let Some(preset) = args.preset {
            preset.components()
        } else if let Some(components) = file.components {
            ComponentSet::new(components).context("Invalid [[components]] in config file")?
        } else {
            file.preset.unwrap_or_default().components()
        };

        let timeout_secs = args
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }

        Ok(Self {
            context: args.context.clone().or(file.context),
            timeout: Duration::from_secs(timeout_secs),
            output: args.output.or(file.output).unwrap_or_default(),
            components,
        })
    }
}

/// Parse a `--component NAME[=MATCH]` value
pub fn parse_component(s: &str) -> Result<Component, String> {
    let component = match s.split_once('=') {
        Some((name, matcher)) => Component::with_matcher(name, matcher),
        None => Component::new(s),
    };

    component
        .validate()
        .map_err(|e| format!("{} in '{}'", e, s))?;
    Ok(component)
}
