//! Kubernetes client for gatescope
//!
//! This crate loads the kubeconfig, connects to the selected context and
//! lists the pods whose command lines carry the feature gate flags.

mod client;
mod error;

pub use client::{KubeClient, PodSource, SYSTEM_NAMESPACE, pod_to_info, resolve_context};
pub use error::ClusterError;

// Re-export types that are used in our public API
pub use gatescope_types::{ContainerInfo, PodInfo};
