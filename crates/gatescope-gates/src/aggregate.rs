use std::time::Duration;

use gatescope_k8s::{ClusterError, PodSource, SYSTEM_NAMESPACE};
use gatescope_types::{
    ComponentFeatureGates, ContainerFeatureGates, ContainerGates, ContainerInfo,
    FeatureGateMatrix, PodFeatureGates, PodInfo,
};

use crate::component::{ComponentBucket, ComponentSet, classify};
use crate::extract::find_feature_gates;
use crate::parser::{FeatureGateError, parse_feature_gates};

/// List the system pods and build the feature gate matrix for `components`
pub async fn collect<S: PodSource>(
    source: &S,
    components: &ComponentSet,
    timeout: Duration,
) -> Result<FeatureGateMatrix, ClusterError> {
    let pods = source.list_pods(SYSTEM_NAMESPACE, timeout).await?;
    let buckets = classify(&pods, components);
    Ok(aggregate(&buckets))
}

/// Build the matrix from classified pods, keeping discovery order
pub fn aggregate(buckets: &[ComponentBucket<'_>]) -> FeatureGateMatrix {
    let components = buckets
        .iter()
        .map(|bucket| {
            tracing::debug!(
                component = %bucket.component.name,
                pods = bucket.pods.len(),
                "classified"
            );
            ComponentFeatureGates {
                name: bucket.component.name.clone(),
                pods: bucket.pods.iter().map(|pod| inspect_pod(pod)).collect(),
            }
        })
        .collect();

    FeatureGateMatrix { components }
}

fn inspect_pod(pod: &PodInfo) -> PodFeatureGates {
    PodFeatureGates {
        name: pod.name.clone(),
        containers: pod
            .containers
            .iter()
            .map(|container| ContainerFeatureGates {
                name: container.name.clone(),
                gates: inspect_container(&pod.name, container),
            })
            .collect(),
    }
}

/// Extract and parse one container's feature gates
///
/// A malformed flag is logged and recorded on the container; it never fails
/// the rest of the collection.
pub fn inspect_container(pod_name: &str, container: &ContainerInfo) -> ContainerGates {
    let Some(raw) = find_feature_gates(&container.args) else {
        return ContainerGates::NotFound;
    };

    match parse_feature_gates(raw) {
        Ok(entries) => ContainerGates::Configured { entries },
        Err(FeatureGateError::MalformedToken { token }) => {
            tracing::warn!(
                pod = pod_name,
                container = %container.name,
                %token,
                "malformed --feature-gates token"
            );
            ContainerGates::Malformed { token }
        }
    }
}
