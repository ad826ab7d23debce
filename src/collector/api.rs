//! Read-only access to the cluster control plane.
//!
//! Collectors only ever need three things from the API server: its version,
//! "list every object of kind K" for cluster-scoped kinds, and "list every
//! object of kind K in namespace N" for namespaced kinds. [`ClusterApi`]
//! captures exactly that, so the production client and test fakes are
//! interchangeable.

use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::{
    Client, Config, Resource,
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::Path;

/// A failed list or version call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("{0}")]
    Other(String),
}

/// Error type for establishing a cluster connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Failed to create Kubernetes client: {0}")]
    ClientCreation(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    ConfigError(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),
}

/// Any typed Kubernetes object that can be listed and deserialized.
pub trait ClusterObject: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug {}

impl<K> ClusterObject for K where K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug {}

/// The read-only query surface used by the collectors.
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    /// Endpoint of the API server, recorded in the report.
    fn api_server(&self) -> String;

    /// Server version string (`gitVersion`).
    async fn server_version(&self) -> Result<String, ApiError>;

    /// List all objects of a cluster-scoped kind.
    async fn list_cluster<K>(&self) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = ClusterResourceScope>;

    /// List all objects of a namespaced kind in one namespace.
    async fn list_namespaced<K>(&self, namespace: &str) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = NamespaceResourceScope>;
}

/// [`ClusterApi`] backed by a live `kube` client.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
    api_server: String,
}

impl KubeClusterApi {
    /// Connect using an explicit kubeconfig and/or context, or fall back to
    /// the default inference (`KUBECONFIG`, `~/.kube/config`, in-cluster).
    pub async fn connect(
        kubeconfig: Option<&Path>,
        context: Option<&str>,
    ) -> Result<Self, ConnectError> {
        let config = match (kubeconfig, context) {
            (None, None) => Config::infer().await?,
            (path, context) => {
                let kubeconfig = match path {
                    Some(path) => Kubeconfig::read_from(path)?,
                    None => Kubeconfig::read()?,
                };
                Config::from_custom_kubeconfig(
                    kubeconfig,
                    &KubeConfigOptions {
                        context: context.map(str::to_string),
                        ..Default::default()
                    },
                )
                .await?
            }
        };

        let api_server = config.cluster_url.to_string();
        let client = Client::try_from(config)?;
        log::debug!("Connected to API server at {}", api_server);

        Ok(Self { client, api_server })
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client, api_server: impl Into<String>) -> Self {
        Self {
            client,
            api_server: api_server.into(),
        }
    }
}

impl ClusterApi for KubeClusterApi {
    fn api_server(&self) -> String {
        self.api_server.clone()
    }

    async fn server_version(&self) -> Result<String, ApiError> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }

    async fn list_cluster<K>(&self) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = ClusterResourceScope>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_namespaced<K>(&self, namespace: &str) -> Result<Vec<K>, ApiError>
    where
        K: ClusterObject + Resource<Scope = NamespaceResourceScope>,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}

/// Kubeconfig contexts and the name of the current one.
pub fn list_contexts(
    kubeconfig: Option<&Path>,
) -> Result<(Vec<String>, Option<String>), ConnectError> {
    let kubeconfig = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path)?,
        None => Kubeconfig::read()?,
    };
    let names = kubeconfig.contexts.into_iter().map(|c| c.name).collect();
    Ok((names, kubeconfig.current_context))
}
