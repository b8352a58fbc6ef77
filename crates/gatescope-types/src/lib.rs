//! Shared types for gatescope
//!
//! This crate contains the pod snapshot handed over by the cluster client and
//! the feature gate matrix produced from it.

use serde::Serialize;

// ============================================================================
// Cluster Snapshot Types
// ============================================================================

/// Pod information as far as feature gate collection is concerned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub containers: Vec<ContainerInfo>,
}

impl PodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            containers: Vec::new(),
        }
    }

    /// Append a container, keeping declaration order
    pub fn with_container(mut self, container: ContainerInfo) -> Self {
        self.containers.push(container);
        self
    }
}

/// A container and its launch command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,

    /// Command followed by args, in declaration order
    pub args: Vec<String>,
}

impl ContainerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Feature Gate Types
// ============================================================================

/// A single `name=value` pair from a `--feature-gates` flag
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureGateEntry {
    pub key: String,
    pub value: String,
}

impl FeatureGateEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of inspecting one container
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContainerGates {
    /// The flag was present; entries are in first-seen key order
    Configured { entries: Vec<FeatureGateEntry> },

    /// No `--feature-gates` flag on the command line
    NotFound,

    /// The flag was present but a token had no `=`
    Malformed { token: String },
}

impl ContainerGates {
    /// Entries for a configured container, empty otherwise
    pub fn entries(&self) -> &[FeatureGateEntry] {
        match self {
            Self::Configured { entries } => entries,
            Self::NotFound | Self::Malformed { .. } => &[],
        }
    }

    /// Look up a gate's value by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContainerFeatureGates {
    pub name: String,
    #[serde(flatten)]
    pub gates: ContainerGates,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PodFeatureGates {
    pub name: String,
    pub containers: Vec<ContainerFeatureGates>,
}

/// All pods classified into one system component
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComponentFeatureGates {
    pub name: String,
    pub pods: Vec<PodFeatureGates>,
}

/// Component -> pod -> container -> feature gates, in configured component order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureGateMatrix {
    pub components: Vec<ComponentFeatureGates>,
}

impl FeatureGateMatrix {
    /// Find a component by its configured name
    pub fn component(&self, name: &str) -> Option<&ComponentFeatureGates> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Number of containers whose flag could not be parsed
    pub fn malformed_count(&self) -> usize {
        self.components
            .iter()
            .flat_map(|c| &c.pods)
            .flat_map(|p| &p.containers)
            .filter(|c| c.gates.is_malformed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> FeatureGateMatrix {
        FeatureGateMatrix {
            components: vec![ComponentFeatureGates {
                name: "kube-apiserver".to_string(),
                pods: vec![PodFeatureGates {
                    name: "kube-apiserver-1".to_string(),
                    containers: vec![
                        ContainerFeatureGates {
                            name: "kube-apiserver".to_string(),
                            gates: ContainerGates::Configured {
                                entries: vec![FeatureGateEntry::new("Foo", "true")],
                            },
                        },
                        ContainerFeatureGates {
                            name: "sidecar".to_string(),
                            gates: ContainerGates::Malformed {
                                token: "Bfalse".to_string(),
                            },
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn test_component_lookup() {
        let m = matrix();
        assert!(m.component("kube-apiserver").is_some());
        assert!(m.component("kube-proxy").is_none());
        assert_eq!(m.malformed_count(), 1);
    }

    #[test]
    fn test_gate_lookup() {
        let gates = ContainerGates::Configured {
            entries: vec![FeatureGateEntry::new("Foo", "true")],
        };
        assert_eq!(gates.get("Foo"), Some("true"));
        assert_eq!(gates.get("Bar"), None);
        assert!(ContainerGates::NotFound.entries().is_empty());
    }

    #[test]
    fn test_serialize_status_tags() {
        let json = serde_json::to_value(matrix()).unwrap();
        let containers = &json[0]["pods"][0]["containers"];
        assert_eq!(containers[0]["status"], "configured");
        assert_eq!(containers[0]["entries"][0]["key"], "Foo");
        assert_eq!(containers[1]["status"], "malformed");
        assert_eq!(containers[1]["token"], "Bfalse");

        let not_found = ContainerFeatureGates {
            name: "c".to_string(),
            gates: ContainerGates::NotFound,
        };
        let json = serde_json::to_value(not_found).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["name"], "c");
    }
}
