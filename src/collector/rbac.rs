//! Roles, bindings and service accounts.

use super::{
    ClusterApi, CollectError, CollectionWarning, Collector, ResourceKind, created_at, labels_of,
    merge_listing, name_of, namespace_of, sort_namespaced,
};
use crate::models::{BindingInfo, PolicyRule, RbacAssessment, RoleInfo, ServiceAccountInfo, Subject};
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::api::rbac::v1 as rbac;

impl<C: ClusterApi> Collector<C> {
    pub(crate) async fn collect_rbac(
        &self,
        warnings: &mut Vec<CollectionWarning>,
    ) -> Result<RbacAssessment, CollectError> {
        let cluster_roles: Vec<ClusterRole> =
            self.list_required(ResourceKind::ClusterRoles).await?;
        let cluster_role_bindings: Vec<ClusterRoleBinding> =
            self.list_required(ResourceKind::ClusterRoleBindings).await?;
        let namespaces = self.namespace_names().await?;

        let mut assessment = RbacAssessment {
            cluster_roles: cluster_roles.iter().map(cluster_role_from).collect(),
            cluster_role_bindings: cluster_role_bindings
                .iter()
                .map(cluster_role_binding_from)
                .collect(),
            ..Default::default()
        };

        let listings = self
            .per_namespace(namespaces, |ns| async move {
                let roles = self.list_optional::<Role>(ResourceKind::Roles, &ns).await;
                let bindings = self
                    .list_optional::<RoleBinding>(ResourceKind::RoleBindings, &ns)
                    .await;
                let accounts = self
                    .list_optional::<ServiceAccount>(ResourceKind::ServiceAccounts, &ns)
                    .await;
                (roles, bindings, accounts)
            })
            .await;

        for (roles, bindings, accounts) in listings {
            merge_listing(roles, &mut assessment.roles, warnings, |r| role_from(&r));
            merge_listing(bindings, &mut assessment.role_bindings, warnings, |b| {
                role_binding_from(&b)
            });
            merge_listing(accounts, &mut assessment.service_accounts, warnings, |sa| {
                service_account_from(&sa)
            });
        }

        sort_namespaced(&mut assessment.roles);
        sort_namespaced(&mut assessment.role_bindings);
        sort_namespaced(&mut assessment.service_accounts);

        Ok(assessment)
    }
}

fn rules_from(rules: Option<&Vec<rbac::PolicyRule>>) -> Vec<PolicyRule> {
    rules
        .into_iter()
        .flatten()
        .map(|rule| PolicyRule {
            api_groups: rule.api_groups.clone().unwrap_or_default(),
            resources: rule.resources.clone().unwrap_or_default(),
            resource_names: rule.resource_names.clone().unwrap_or_default(),
            verbs: rule.verbs.clone(),
        })
        .collect()
}

fn subjects_from(subjects: Option<&Vec<rbac::Subject>>) -> Vec<Subject> {
    subjects
        .into_iter()
        .flatten()
        .map(|s| Subject {
            kind: s.kind.clone(),
            name: s.name.clone(),
            namespace: s.namespace.clone().unwrap_or_default(),
        })
        .collect()
}

pub fn cluster_role_from(role: &ClusterRole) -> RoleInfo {
    RoleInfo {
        name: name_of(&role.metadata),
        namespace: String::new(),
        cluster_role: true,
        rules: rules_from(role.rules.as_ref()),
        created_at: created_at(&role.metadata),
    }
}

pub fn role_from(role: &Role) -> RoleInfo {
    RoleInfo {
        name: name_of(&role.metadata),
        namespace: namespace_of(&role.metadata),
        cluster_role: false,
        rules: rules_from(role.rules.as_ref()),
        created_at: created_at(&role.metadata),
    }
}

pub fn cluster_role_binding_from(binding: &ClusterRoleBinding) -> BindingInfo {
    BindingInfo {
        name: name_of(&binding.metadata),
        namespace: String::new(),
        role_ref: binding.role_ref.name.clone(),
        subjects: subjects_from(binding.subjects.as_ref()),
        created_at: created_at(&binding.metadata),
    }
}

pub fn role_binding_from(binding: &RoleBinding) -> BindingInfo {
    BindingInfo {
        name: name_of(&binding.metadata),
        namespace: namespace_of(&binding.metadata),
        role_ref: binding.role_ref.name.clone(),
        subjects: subjects_from(binding.subjects.as_ref()),
        created_at: created_at(&binding.metadata),
    }
}

pub fn service_account_from(sa: &ServiceAccount) -> ServiceAccountInfo {
    ServiceAccountInfo {
        name: name_of(&sa.metadata),
        namespace: namespace_of(&sa.metadata),
        labels: labels_of(&sa.metadata),
        created_at: created_at(&sa.metadata),
        secrets: sa
            .secrets
            .iter()
            .flatten()
            .filter_map(|s| s.name.clone())
            .collect(),
        image_pull_secrets: sa
            .image_pull_secrets
            .iter()
            .flatten()
            .map(|s| s.name.clone())
            .collect(),
    }
}
