//! Error types for cluster access

use kube::config::KubeconfigError;
use thiserror::Error;

/// Errors that can occur while talking to the cluster
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Kubeconfig could not be read
    #[error("Failed to read kubeconfig. Is kubectl configured?")]
    Kubeconfig(#[source] KubeconfigError),

    /// Requested context is not in the kubeconfig
    #[error("Context '{0}' not found in kubeconfig")]
    ContextNotFound(String),

    /// No context requested and the kubeconfig has no current-context
    #[error("No context given and kubeconfig has no current-context")]
    NoContext,

    /// Context exists but its cluster/user settings are unusable
    #[error("Failed to create config for context: {context}")]
    Config {
        context: String,
        #[source]
        source: KubeconfigError,
    },

    /// HTTP client could not be built
    #[error("Failed to create client for context: {context}")]
    Connect {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// The pod list request failed (RBAC, network, server error)
    #[error("Failed to list pods in namespace {namespace}")]
    ListPods {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    /// The pod list request did not finish before the deadline
    #[error("Timed out after {secs}s listing pods in namespace {namespace}")]
    Timeout { namespace: String, secs: u64 },
}

impl ClusterError {
    /// True when the session could not be established at all, as opposed to
    /// the pod list call failing on an established session
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Kubeconfig(_)
                | Self::ContextNotFound(_)
                | Self::NoContext
                | Self::Config { .. }
                | Self::Connect { .. }
        )
    }
}
