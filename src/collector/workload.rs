//! Pods and pod controllers.

use super::{
    ClusterApi, CollectError, CollectionWarning, Collector, ResourceKind, created_at, labels_of,
    merge_listing, name_of, namespace_of, sort_namespaced,
};
use crate::models::{
    ContainerInfo, ContainerSecurityInfo, DaemonSetInfo, DeploymentInfo, PodInfo, PodSecurityInfo,
    ResourceList, ResourceRequirements, StatefulSetInfo, WorkloadAssessment,
};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Capabilities, Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

impl<C: ClusterApi> Collector<C> {
    pub(crate) async fn collect_workloads(
        &self,
        warnings: &mut Vec<CollectionWarning>,
    ) -> Result<WorkloadAssessment, CollectError> {
        let namespaces = self.namespace_names().await?;

        let listings = self
            .per_namespace(namespaces, |ns| async move {
                let pods = self.list_optional::<Pod>(ResourceKind::Pods, &ns).await;
                let deployments = self
                    .list_optional::<Deployment>(ResourceKind::Deployments, &ns)
                    .await;
                let stateful_sets = self
                    .list_optional::<StatefulSet>(ResourceKind::StatefulSets, &ns)
                    .await;
                let daemon_sets = self
                    .list_optional::<DaemonSet>(ResourceKind::DaemonSets, &ns)
                    .await;
                (pods, deployments, stateful_sets, daemon_sets)
            })
            .await;

        let mut assessment = WorkloadAssessment::default();
        for (pods, deployments, stateful_sets, daemon_sets) in listings {
            merge_listing(pods, &mut assessment.pods, warnings, |p| pod_from(&p));
            merge_listing(deployments, &mut assessment.deployments, warnings, |d| {
                deployment_from(&d)
            });
            merge_listing(stateful_sets, &mut assessment.stateful_sets, warnings, |s| {
                stateful_set_from(&s)
            });
            merge_listing(daemon_sets, &mut assessment.daemon_sets, warnings, |d| {
                daemon_set_from(&d)
            });
        }

        sort_namespaced(&mut assessment.pods);
        sort_namespaced(&mut assessment.deployments);
        sort_namespaced(&mut assessment.stateful_sets);
        sort_namespaced(&mut assessment.daemon_sets);

        Ok(assessment)
    }
}

/// `+NAME` for each added capability, then `-NAME` for each dropped one.
pub fn capability_deltas(capabilities: Option<&Capabilities>) -> Vec<String> {
    let Some(caps) = capabilities else {
        return Vec::new();
    };

    let added = caps.add.iter().flatten().map(|c| format!("+{}", c));
    let dropped = caps.drop.iter().flatten().map(|c| format!("-{}", c));
    added.chain(dropped).collect()
}

fn resource_list(quantities: Option<&BTreeMap<String, Quantity>>) -> ResourceList {
    let get = |key: &str| {
        quantities
            .and_then(|q| q.get(key))
            .map(|q| q.0.clone())
            .unwrap_or_default()
    };
    ResourceList {
        cpu: get("cpu"),
        memory: get("memory"),
    }
}

pub fn container_from(container: &Container) -> ContainerInfo {
    let security_context = container
        .security_context
        .as_ref()
        .map(|sc| ContainerSecurityInfo {
            capabilities: capability_deltas(sc.capabilities.as_ref()),
            run_as_user: sc.run_as_user,
            run_as_non_root: sc.run_as_non_root,
            read_only_root: sc.read_only_root_filesystem.unwrap_or(false),
            privileged: sc.privileged.unwrap_or(false),
            allow_privilege_escalation: sc.allow_privilege_escalation,
        })
        .unwrap_or_default();

    let resources = container.resources.as_ref();

    ContainerInfo {
        name: container.name.clone(),
        image: container.image.clone().unwrap_or_default(),
        security_context,
        resources: ResourceRequirements {
            limits: resource_list(resources.and_then(|r| r.limits.as_ref())),
            requests: resource_list(resources.and_then(|r| r.requests.as_ref())),
        },
        // Names only; values may carry credentials.
        env_vars: container
            .env
            .iter()
            .flatten()
            .map(|e| e.name.clone())
            .collect(),
    }
}

pub fn pod_from(pod: &Pod) -> PodInfo {
    let spec = pod.spec.as_ref();
    let pod_sc = spec.and_then(|s| s.security_context.as_ref());

    // Host namespace flags live on the pod spec, not the security context.
    let security_context = PodSecurityInfo {
        run_as_user: pod_sc.and_then(|sc| sc.run_as_user),
        run_as_group: pod_sc.and_then(|sc| sc.run_as_group),
        fs_group: pod_sc.and_then(|sc| sc.fs_group),
        host_network: spec.and_then(|s| s.host_network).unwrap_or(false),
        host_pid: spec.and_then(|s| s.host_pid).unwrap_or(false),
        host_ipc: spec.and_then(|s| s.host_ipc).unwrap_or(false),
        sysctls: pod_sc
            .and_then(|sc| sc.sysctls.as_ref())
            .into_iter()
            .flatten()
            .map(|s| format!("{}={}", s.name, s.value))
            .collect(),
    };

    PodInfo {
        name: name_of(&pod.metadata),
        namespace: namespace_of(&pod.metadata),
        node_name: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        service_account: spec
            .and_then(|s| s.service_account_name.clone())
            .unwrap_or_default(),
        labels: labels_of(&pod.metadata),
        created_at: created_at(&pod.metadata),
        security_context,
        containers: spec
            .map(|s| s.containers.iter().map(container_from).collect())
            .unwrap_or_default(),
        automount_service_account_token: spec.and_then(|s| s.automount_service_account_token),
    }
}

pub fn deployment_from(deployment: &Deployment) -> DeploymentInfo {
    let spec = deployment.spec.as_ref();
    DeploymentInfo {
        name: name_of(&deployment.metadata),
        namespace: namespace_of(&deployment.metadata),
        replicas: spec.and_then(|s| s.replicas).unwrap_or(1),
        update_strategy: spec
            .and_then(|s| s.strategy.as_ref())
            .and_then(|s| s.type_.clone())
            .unwrap_or_default(),
        labels: labels_of(&deployment.metadata),
        created_at: created_at(&deployment.metadata),
    }
}

pub fn stateful_set_from(stateful_set: &StatefulSet) -> StatefulSetInfo {
    let spec = stateful_set.spec.as_ref();
    StatefulSetInfo {
        name: name_of(&stateful_set.metadata),
        namespace: namespace_of(&stateful_set.metadata),
        replicas: spec.and_then(|s| s.replicas).unwrap_or(1),
        update_strategy: spec
            .and_then(|s| s.update_strategy.as_ref())
            .and_then(|s| s.type_.clone())
            .unwrap_or_default(),
        labels: labels_of(&stateful_set.metadata),
        created_at: created_at(&stateful_set.metadata),
    }
}

pub fn daemon_set_from(daemon_set: &DaemonSet) -> DaemonSetInfo {
    DaemonSetInfo {
        name: name_of(&daemon_set.metadata),
        namespace: namespace_of(&daemon_set.metadata),
        update_strategy: daemon_set
            .spec
            .as_ref()
            .and_then(|s| s.update_strategy.as_ref())
            .and_then(|s| s.type_.clone())
            .unwrap_or_default(),
        labels: labels_of(&daemon_set.metadata),
        created_at: created_at(&daemon_set.metadata),
    }
}
