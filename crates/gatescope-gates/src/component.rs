use serde::Deserialize;
use thiserror::Error;

use gatescope_types::PodInfo;

/// Errors from building a component set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("component name is empty")]
    EmptyName,

    /// An empty substring would match every pod in the namespace
    #[error("component '{0}' has an empty match substring")]
    EmptyMatcher(String),

    #[error("component '{0}' is configured more than once")]
    Duplicate(String),

    #[error("no components configured")]
    Empty,
}

/// A system component and the pod name substring that identifies it
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Component {
    pub name: String,

    /// Substring matched against pod names (defaults to `name`)
    #[serde(rename = "match", default)]
    matcher: Option<String>,
}

impl Component {
    /// Component whose pods are matched by its own name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher: None,
        }
    }

    /// Component matched by a substring other than its name
    pub fn with_matcher(name: impl Into<String>, matcher: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher: Some(matcher.into()),
        }
    }

    pub fn matcher(&self) -> &str {
        self.matcher.as_deref().unwrap_or(&self.name)
    }

    pub fn matches(&self, pod_name: &str) -> bool {
        pod_name.contains(self.matcher())
    }

    pub fn validate(&self) -> Result<(), ComponentError> {
        if self.name.is_empty() {
            return Err(ComponentError::EmptyName);
        }
        if self.matcher().is_empty() {
            return Err(ComponentError::EmptyMatcher(self.name.clone()));
        }
        Ok(())
    }
}

/// Ordered set of components to classify pods into
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    /// Build a set, rejecting empty names, empty matchers and repeated names
    pub fn new(components: Vec<Component>) -> Result<Self, ComponentError> {
        if components.is_empty() {
            return Err(ComponentError::Empty);
        }

        for (idx, component) in components.iter().enumerate() {
            component.validate()?;
            if components[..idx].iter().any(|c| c.name == component.name) {
                return Err(ComponentError::Duplicate(component.name.clone()));
            }
        }

        Ok(Self { components })
    }

    /// API server and scheduler only
    pub fn minimal() -> Self {
        Self {
            components: vec![
                Component::new("kube-apiserver"),
                Component::new("kube-scheduler"),
            ],
        }
    }

    /// All four control plane components
    pub fn full() -> Self {
        Self {
            components: vec![
                Component::new("kube-apiserver"),
                Component::new("kube-scheduler"),
                Component::new("kube-controller-manager"),
                Component::new("kube-proxy"),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Default for ComponentSet {
    fn default() -> Self {
        Self::full()
    }
}

/// Pods belonging to one component, in discovery order
#[derive(Clone, Debug)]
pub struct ComponentBucket<'a> {
    pub component: &'a Component,
    pub pods: Vec<&'a PodInfo>,
}

/// Partition pods into one bucket per component
///
/// Buckets are not exclusive: a pod whose name contains several matchers is
/// placed in each of them.
pub fn classify<'a>(pods: &'a [PodInfo], components: &'a ComponentSet) -> Vec<ComponentBucket<'a>> {
    components
        .iter()
        .map(|component| ComponentBucket {
            component,
            pods: pods.iter().filter(|p| component.matches(&p.name)).collect(),
        })
        .collect()
}
