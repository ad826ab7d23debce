//! Secret metadata. Payloads are dropped at conversion time.

use super::{
    ClusterApi, CollectError, CollectionWarning, Collector, ResourceKind, created_at, labels_of,
    merge_listing, name_of, namespace_of, sort_namespaced,
};
use crate::models::{SecretAssessment, SecretInfo};
use k8s_openapi::api::core::v1::Secret;

impl<C: ClusterApi> Collector<C> {
    pub(crate) async fn collect_secrets(
        &self,
        warnings: &mut Vec<CollectionWarning>,
    ) -> Result<SecretAssessment, CollectError> {
        let namespaces = self.namespace_names().await?;

        let listings = self
            .per_namespace(namespaces, |ns| async move {
                self.list_optional::<Secret>(ResourceKind::Secrets, &ns).await
            })
            .await;

        let mut assessment = SecretAssessment::default();
        for secrets in listings {
            merge_listing(secrets, &mut assessment.secrets, warnings, |s| secret_from(&s));
        }
        sort_namespaced(&mut assessment.secrets);

        Ok(assessment)
    }
}

pub fn secret_from(secret: &Secret) -> SecretInfo {
    SecretInfo {
        name: name_of(&secret.metadata),
        namespace: namespace_of(&secret.metadata),
        labels: labels_of(&secret.metadata),
        created_at: created_at(&secret.metadata),
        secret_type: secret.type_.clone().unwrap_or_default(),
    }
}
