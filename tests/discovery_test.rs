//! 服务发现测试

mod common;

use std::sync::atomic::Ordering;

use common::{ScriptedNamingClient, raw_instance};
use flare_registry::{
    Discovery, ErrorCode, INSTANCE_ID_KEY, MAX_PAGE_SIZE, NamingDiscovery, NamingOptions,
    RawInstance, ServiceInstance,
};
use tokio_test::{assert_err, assert_ok};

fn query() -> ServiceInstance {
    ServiceInstance::builder()
        .name("order-svc")
        .scheme("grpc")
        .build()
}

#[tokio::test]
async fn test_only_enabled_healthy_weighted_instances_survive() {
    let client = ScriptedNamingClient::with_hosts(vec![
        RawInstance {
            enabled: false,
            ..raw_instance("disabled", "10.0.0.1", 8080)
        },
        RawInstance {
            healthy: false,
            ..raw_instance("unhealthy", "10.0.0.2", 8080)
        },
        RawInstance {
            weight: 0.0,
            ..raw_instance("weightless", "10.0.0.3", 8080)
        },
        raw_instance("good", "10.0.0.4", 8080),
    ]);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let instances = assert_ok!(discovery.get_instances(&query()).await);

    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].id(), "good");
    assert_eq!(instances[0].ip(), "10.0.0.4");
    assert_eq!(instances[0].port(), 8080);
    assert_eq!(instances[0].name(), "order-svc");
}

#[tokio::test]
async fn test_instance_id_metadata_takes_precedence() {
    let mut custom = raw_instance("backend-1", "10.0.0.1", 8080);
    custom
        .metadata
        .insert(INSTANCE_ID_KEY.to_string(), "custom-1".to_string());
    custom
        .metadata
        .insert("version".to_string(), "v2".to_string());
    let plain = raw_instance("backend-2", "10.0.0.2", 8080);
    let client = ScriptedNamingClient::with_hosts(vec![custom, plain]);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let instances = assert_ok!(discovery.get_instances(&query()).await);

    assert_eq!(instances[0].id(), "custom-1");
    assert!(!instances[0].metadata().contains_key(INSTANCE_ID_KEY));
    assert_eq!(
        instances[0].metadata().get("version").map(String::as_str),
        Some("v2")
    );
    assert_eq!(instances[1].id(), "backend-2");
}

#[tokio::test]
async fn test_scheme_is_taken_from_query_template() {
    let client = ScriptedNamingClient::with_hosts(vec![raw_instance("a", "10.0.0.1", 8080)]);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let instances = assert_ok!(discovery.get_instances(&query()).await);

    assert_eq!(instances[0].scheme(), "grpc");
}

#[tokio::test]
async fn test_query_parameters() {
    let client = ScriptedNamingClient::new();
    let options = NamingOptions::default().with_clusters(vec!["a".to_string(), "b".to_string()]);
    let discovery = NamingDiscovery::new(client.clone(), options);

    assert_ok!(discovery.get_instances(&query()).await);

    let calls = client.select_calls.lock().unwrap();
    assert_eq!(calls[0].service_name, "order-svc");
    assert_eq!(calls[0].clusters, ["a", "b"]);
    assert_eq!(calls[0].group_name, "grpc");
    assert!(calls[0].healthy_only);
}

#[tokio::test]
async fn test_nothing_surviving_is_an_empty_list() {
    let client = ScriptedNamingClient::with_hosts(vec![RawInstance {
        weight: -1.0,
        ..raw_instance("negative", "10.0.0.1", 8080)
    }]);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let instances = assert_ok!(discovery.get_instances(&query()).await);

    assert!(instances.is_empty());
}

#[tokio::test]
async fn test_get_instances_backend_failure_is_surfaced() {
    let client = ScriptedNamingClient::new();
    client.fail_backend.store(true, Ordering::SeqCst);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let err = assert_err!(discovery.get_instances(&query()).await);

    assert_eq!(err.code(), ErrorCode::BackendError);
    assert!(err.to_string().contains("order-svc"));
}

#[tokio::test]
async fn test_get_services_in_empty_namespace_is_empty() {
    let client = ScriptedNamingClient::new();
    let discovery = NamingDiscovery::new(client, NamingOptions::default().with_namespace("empty"));

    let services = assert_ok!(discovery.get_services().await);

    assert!(services.is_empty());
}

#[tokio::test]
async fn test_get_services_requests_single_maximal_page() {
    let client = ScriptedNamingClient::new();
    *client.services.lock().unwrap() = vec!["order-svc".to_string(), "user-svc".to_string()];
    let discovery = NamingDiscovery::new(client.clone(), NamingOptions::default().with_namespace("dev"));

    let services = assert_ok!(discovery.get_services().await);

    assert_eq!(services, ["order-svc", "user-svc"]);
    let calls = client.services_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].namespace, "dev");
    assert_eq!(calls[0].page_no, 1);
    assert_eq!(calls[0].page_size, MAX_PAGE_SIZE);
}

#[tokio::test]
async fn test_get_services_backend_failure_is_surfaced() {
    let client = ScriptedNamingClient::new();
    client.fail_backend.store(true, Ordering::SeqCst);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let err = assert_err!(discovery.get_services().await);

    assert_eq!(err.code(), ErrorCode::BackendError);
}

#[tokio::test]
async fn test_watch_fails_when_subscribe_fails() {
    let client = ScriptedNamingClient::new();
    client.fail_subscribe.store(true, Ordering::SeqCst);
    let discovery = NamingDiscovery::new(client, NamingOptions::default());

    let err = discovery.watch(query()).await.err().expect("watch should fail");

    assert_eq!(err.code(), ErrorCode::SubscribeFailed);
}

#[tokio::test]
async fn test_watch_subscribes_with_resolved_key() {
    let client = ScriptedNamingClient::new();
    let options = NamingOptions::default().with_clusters(vec!["a".to_string()]);
    let discovery = NamingDiscovery::new(client.clone(), options);

    let watcher = assert_ok!(discovery.watch(query()).await);

    let subscriptions = client.subscriptions();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].service_name, "order-svc");
    assert_eq!(subscriptions[0].clusters, ["a"]);
    assert_eq!(subscriptions[0].group_name, "grpc");

    assert_ok!(watcher.close().await);
}
