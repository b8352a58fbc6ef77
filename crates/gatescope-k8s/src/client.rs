//! Kubernetes client for gatescope

use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};

use crate::error::ClusterError;
use gatescope_types::{ContainerInfo, PodInfo};

/// Namespace the control plane components run in
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Anything that can list the pods of a namespace
pub trait PodSource {
    fn list_pods(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<PodInfo>, ClusterError>> + Send;
}

/// Kubernetes client wrapper
pub struct KubeClient {
    client: kube::Client,
    context: String,
}

impl KubeClient {
    /// Load the kubeconfig and connect to `context`, or to the current context
    pub async fn connect(context: Option<&str>) -> Result<Self, ClusterError> {
        let kubeconfig = Kubeconfig::read().map_err(ClusterError::Kubeconfig)?;
        let context = resolve_context(&kubeconfig, context)?;

        let config = kube::Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(context.clone()),
                ..Default::default()
            },
        )
        .await
        .map_err(|source| ClusterError::Config {
            context: context.clone(),
            source,
        })?;

        let client = kube::Client::try_from(config).map_err(|source| ClusterError::Connect {
            context: context.clone(),
            source,
        })?;

        tracing::info!(%context, "connected");
        Ok(Self { client, context })
    }

    /// Name of the context this client talks to
    pub fn context(&self) -> &str {
        &self.context
    }
}

impl PodSource for KubeClient {
    async fn list_pods(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Vec<PodInfo>, ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let secs = timeout.as_secs();
        let params = ListParams::default().timeout(u32::try_from(secs).unwrap_or(u32::MAX));

        let list = tokio::time::timeout(timeout, pods.list(&params))
            .await
            .map_err(|_| ClusterError::Timeout {
                namespace: namespace.to_string(),
                secs,
            })?
            .map_err(|source| ClusterError::ListPods {
                namespace: namespace.to_string(),
                source,
            })?;

        tracing::debug!(namespace, count = list.items.len(), "listed pods");
        Ok(list.items.into_iter().map(pod_to_info).collect())
    }
}

/// Pick the requested context, falling back to the kubeconfig's current one
pub fn resolve_context(
    kubeconfig: &Kubeconfig,
    requested: Option<&str>,
) -> Result<String, ClusterError> {
    let Some(name) = requested.or(kubeconfig.current_context.as_deref()) else {
        return Err(ClusterError::NoContext);
    };

    if !kubeconfig.contexts.iter().any(|c| c.name == name) {
        return Err(ClusterError::ContextNotFound(name.to_string()));
    }

    Ok(name.to_string())
}

/// Convert a k8s Pod to PodInfo
///
/// A container's command line is its `command` followed by its `args`; static
/// control plane pods usually put every flag in `command`.
pub fn pod_to_info(pod: Pod) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let mut info = PodInfo::new(name);

    if let Some(spec) = pod.spec {
        info.containers = spec
            .containers
            .into_iter()
            .map(|c| {
                let args = c
                    .command
                    .unwrap_or_default()
                    .into_iter()
                    .chain(c.args.unwrap_or_default());
                ContainerInfo::new(c.name).with_args(args)
            })
            .collect();
    }

    info
}
