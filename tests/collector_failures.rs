mod common;

use common::{FakeCluster, three_namespace_cluster};
use kube_radar::collector::{CollectError, Collector, ResourceKind};

#[tokio::test]
async fn test_full_collection_is_complete_and_sorted() {
    let collection = Collector::new(three_namespace_cluster())
        .collect_all()
        .await
        .unwrap();

    assert!(collection.is_complete());
    let data = &collection.data;
    assert_eq!(data.cluster_info.version, "v1.29.4");
    assert_eq!(data.cluster_info.api_server, "https://fake.cluster.local:6443");
    assert_eq!(data.cluster_info.node_count, 1);
    assert_eq!(data.cluster_info.platform, "linux");
    assert!(data.cluster_info.nodes[0].ready);

    let pods: Vec<(&str, &str)> = data
        .workloads
        .pods
        .iter()
        .map(|p| (p.namespace.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        pods,
        vec![("team-a", "api"), ("team-b", "worker"), ("team-c", "web")]
    );
    assert_eq!(data.rbac.cluster_roles.len(), 1);
    assert_eq!(data.rbac.cluster_role_bindings.len(), 1);
    assert_eq!(data.secrets.secrets[0].name, "db-credentials");
}

#[tokio::test]
async fn test_namespace_failure_is_a_warning() {
    let api = three_namespace_cluster().failing("Pod", "team-b");
    let collection = Collector::new(api).collect_all().await.unwrap();

    let pod_namespaces: Vec<&str> = collection
        .data
        .workloads
        .pods
        .iter()
        .map(|p| p.namespace.as_str())
        .collect();
    assert_eq!(pod_namespaces, vec!["team-a", "team-c"]);

    assert_eq!(collection.warnings.len(), 1);
    let warning = &collection.warnings[0];
    assert_eq!(warning.kind, ResourceKind::Pods);
    assert_eq!(warning.namespace, "team-b");
    assert!(!collection.is_complete());
}

#[tokio::test]
async fn test_failure_only_omits_that_kind() {
    let api = three_namespace_cluster().failing("Secret", "team-a");
    let collection = Collector::new(api).collect_all().await.unwrap();

    assert!(collection.data.secrets.secrets.is_empty());
    assert_eq!(collection.data.workloads.pods.len(), 3);
    assert_eq!(collection.warnings.len(), 1);
    assert_eq!(collection.warnings[0].kind, ResourceKind::Secrets);
}

#[tokio::test]
async fn test_warnings_sorted_by_namespace() {
    let api = three_namespace_cluster()
        .failing("Service", "team-c")
        .failing("Pod", "team-c")
        .failing("Role", "team-a");
    let collection = Collector::new(api)
        .with_concurrency(1)
        .collect_all()
        .await
        .unwrap();

    let order: Vec<(String, ResourceKind)> = collection
        .warnings
        .iter()
        .map(|w| (w.namespace.clone(), w.kind))
        .collect();
    assert_eq!(
        order,
        vec![
            ("team-a".to_string(), ResourceKind::Roles),
            ("team-c".to_string(), ResourceKind::Pods),
            ("team-c".to_string(), ResourceKind::Services),
        ]
    );
}

#[tokio::test]
async fn test_cluster_role_failure_is_fatal() {
    let api = three_namespace_cluster().failing("ClusterRole", "");
    let err = Collector::new(api).collect_all().await.unwrap_err();

    assert!(matches!(
        err,
        CollectError::ClusterScoped {
            kind: ResourceKind::ClusterRoles,
            ..
        }
    ));
    assert_eq!(err.kind(), Some(ResourceKind::ClusterRoles));
}

#[tokio::test]
async fn test_node_failure_is_fatal() {
    let api = three_namespace_cluster().failing("Node", "");
    let err = Collector::new(api).collect_all().await.unwrap_err();

    assert!(matches!(
        err,
        CollectError::ClusterScoped {
            kind: ResourceKind::Nodes,
            ..
        }
    ));
}

#[tokio::test]
async fn test_namespace_listing_failure_is_fatal() {
    let api = three_namespace_cluster().failing("Namespace", "");
    let err = Collector::new(api).collect_all().await.unwrap_err();

    assert!(matches!(
        err,
        CollectError::ClusterScoped {
            kind: ResourceKind::Namespaces,
            ..
        }
    ));
    assert_eq!(err.kind(), Some(ResourceKind::Namespaces));
}

#[tokio::test]
async fn test_version_failure_is_fatal() {
    let api = three_namespace_cluster().failing_version();
    let err = Collector::new(api).collect_all().await.unwrap_err();
    assert!(matches!(err, CollectError::Version(_)));
}

#[tokio::test]
async fn test_concurrency_does_not_change_results() {
    let sequential = Collector::new(three_namespace_cluster())
        .with_concurrency(1)
        .collect_all()
        .await
        .unwrap();
    let parallel = Collector::new(three_namespace_cluster())
        .with_concurrency(16)
        .collect_all()
        .await
        .unwrap();

    assert_eq!(sequential.data, parallel.data);
}

#[tokio::test]
async fn test_empty_cluster() {
    let collection = Collector::new(FakeCluster::new())
        .collect_all()
        .await
        .unwrap();
    assert!(collection.is_complete());
    assert_eq!(collection.data.cluster_info.node_count, 0);
    assert!(collection.data.cluster_info.platform.is_empty());
}
