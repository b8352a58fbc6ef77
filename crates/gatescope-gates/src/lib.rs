//! Feature gate collection for gatescope
//!
//! This crate classifies system pods into components, pulls the
//! `--feature-gates` flag out of each container's command line and assembles
//! the resulting matrix.

mod aggregate;
mod component;
mod extract;
mod parser;

pub use aggregate::{aggregate, collect, inspect_container};
pub use component::{Component, ComponentBucket, ComponentError, ComponentSet, classify};
pub use extract::{FEATURE_GATES_FLAG, find_feature_gates};
pub use parser::{FeatureGateError, parse_feature_gates, render_feature_gates};

// Re-export types used in our public API
pub use gatescope_types::{
    ComponentFeatureGates, ContainerFeatureGates, ContainerGates, FeatureGateEntry,
    FeatureGateMatrix, PodFeatureGates,
};
