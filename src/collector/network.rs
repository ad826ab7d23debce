//! Services, network policies and ingresses.

use super::{
    ClusterApi, CollectError, CollectionWarning, Collector, ResourceKind, created_at, labels_of,
    merge_listing, name_of, namespace_of, sort_namespaced,
};
use crate::models::{
    IngressInfo, IngressPath, IngressRule, NetworkAssessment, NetworkPolicyInfo, ServiceInfo,
    ServicePort,
};
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress, NetworkPolicy};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

impl<C: ClusterApi> Collector<C> {
    pub(crate) async fn collect_network(
        &self,
        warnings: &mut Vec<CollectionWarning>,
    ) -> Result<NetworkAssessment, CollectError> {
        let namespaces = self.namespace_names().await?;

        let listings = self
            .per_namespace(namespaces, |ns| async move {
                let services = self.list_optional::<Service>(ResourceKind::Services, &ns).await;
                let policies = self
                    .list_optional::<NetworkPolicy>(ResourceKind::NetworkPolicies, &ns)
                    .await;
                let ingresses = self
                    .list_optional::<Ingress>(ResourceKind::Ingresses, &ns)
                    .await;
                (services, policies, ingresses)
            })
            .await;

        let mut assessment = NetworkAssessment::default();
        for (services, policies, ingresses) in listings {
            merge_listing(services, &mut assessment.services, warnings, |s| {
                service_from(&s)
            });
            merge_listing(policies, &mut assessment.network_policies, warnings, |p| {
                network_policy_from(&p)
            });
            merge_listing(ingresses, &mut assessment.ingresses, warnings, |i| {
                ingress_from(&i)
            });
        }

        sort_namespaced(&mut assessment.services);
        sort_namespaced(&mut assessment.network_policies);
        sort_namespaced(&mut assessment.ingresses);

        Ok(assessment)
    }
}

pub fn service_from(service: &Service) -> ServiceInfo {
    let spec = service.spec.as_ref();

    let ports = spec
        .and_then(|s| s.ports.as_ref())
        .into_iter()
        .flatten()
        .map(|p| ServicePort {
            port: p.port,
            target_port: match &p.target_port {
                Some(IntOrString::Int(n)) => *n,
                // Named targets resolve per pod; nothing numeric to record.
                Some(IntOrString::String(_)) | None => 0,
            },
            protocol: p.protocol.clone().unwrap_or_default(),
        })
        .collect();

    ServiceInfo {
        name: name_of(&service.metadata),
        namespace: namespace_of(&service.metadata),
        labels: labels_of(&service.metadata),
        created_at: created_at(&service.metadata),
        service_type: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
        external_ips: spec
            .and_then(|s| s.external_ips.clone())
            .unwrap_or_default(),
        ports,
    }
}

fn requirement_to_string(req: &LabelSelectorRequirement) -> String {
    let values = req.values.as_deref().unwrap_or_default().join(",");
    match req.operator.as_str() {
        "In" => format!("{} in ({})", req.key, values),
        "NotIn" => format!("{} notin ({})", req.key, values),
        "Exists" => req.key.clone(),
        "DoesNotExist" => format!("!{}", req.key),
        other => format!("{} {} ({})", req.key, other, values),
    }
}

/// Render a label selector in `kubectl` syntax. Terms are sorted by key; an
/// empty selector matches every pod and renders as `<none>`.
pub fn format_label_selector(selector: &LabelSelector) -> String {
    let mut terms: Vec<(&str, String)> = selector
        .match_labels
        .iter()
        .flatten()
        .map(|(k, v)| (k.as_str(), format!("{}={}", k, v)))
        .collect();
    terms.extend(
        selector
            .match_expressions
            .iter()
            .flatten()
            .map(|req| (req.key.as_str(), requirement_to_string(req))),
    );

    if terms.is_empty() {
        return "<none>".to_string();
    }

    terms.sort_by(|a, b| a.0.cmp(b.0));
    terms
        .into_iter()
        .map(|(_, term)| term)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn network_policy_from(policy: &NetworkPolicy) -> NetworkPolicyInfo {
    let spec = policy.spec.as_ref();
    NetworkPolicyInfo {
        name: name_of(&policy.metadata),
        namespace: namespace_of(&policy.metadata),
        labels: labels_of(&policy.metadata),
        created_at: created_at(&policy.metadata),
        pod_selector: spec
            .map(|s| format_label_selector(&s.pod_selector))
            .unwrap_or_else(|| "<none>".to_string()),
        policy_types: spec
            .and_then(|s| s.policy_types.clone())
            .unwrap_or_default(),
    }
}

fn ingress_path_from(path: &HTTPIngressPath) -> IngressPath {
    let service = path.backend.service.as_ref();
    IngressPath {
        path: path.path.clone().unwrap_or_default(),
        service_name: service.map(|s| s.name.clone()).unwrap_or_default(),
        service_port: service
            .and_then(|s| s.port.as_ref())
            .and_then(|p| p.number)
            .unwrap_or(0),
    }
}

pub fn ingress_from(ingress: &Ingress) -> IngressInfo {
    let spec = ingress.spec.as_ref();

    // Host-less rules are catch-alls and are not listed.
    let rules = spec
        .and_then(|s| s.rules.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|rule| {
            let host = rule.host.as_deref().filter(|h| !h.is_empty())?;
            Some(IngressRule {
                host: host.to_string(),
                paths: rule
                    .http
                    .as_ref()
                    .map(|http| http.paths.iter().map(ingress_path_from).collect())
                    .unwrap_or_default(),
            })
        })
        .collect();

    let tls = spec
        .and_then(|s| s.tls.as_ref())
        .into_iter()
        .flatten()
        .flat_map(|t| t.hosts.iter().flatten().cloned())
        .collect();

    IngressInfo {
        name: name_of(&ingress.metadata),
        namespace: namespace_of(&ingress.metadata),
        labels: labels_of(&ingress.metadata),
        created_at: created_at(&ingress.metadata),
        rules,
        tls,
    }
}
