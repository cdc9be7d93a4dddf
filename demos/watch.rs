//! 注册、监听、注销的完整流程演示
//!
//! ```bash
//! cargo run --example watch
//! cargo run --example watch -- registry.toml
//! ```

use std::time::Duration;

use anyhow::Context;
use flare_registry::{RegistryConfig, RegistryFactory, ServiceInstance, init_tracing};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RegistryConfig::load_from_file(&path)
            .with_context(|| format!("loading {path}"))?,
        None => RegistryConfig::new("memory://local?namespaceId=demo"),
    };
    init_tracing(&config.logging)?;

    let factory = RegistryFactory::new();
    let registrar = factory.registrar_from_config(&config)?;
    let discovery = factory.discovery_from_config(&config)?;

    let query = ServiceInstance::builder()
        .name("order-svc")
        .scheme("grpc")
        .build();
    let watcher = discovery.watch(query.clone()).await?;
    let (tx, mut rx) = mpsc::channel(16);
    watcher.notify(tx).await;

    let instances: Vec<ServiceInstance> = (0..2)
        .map(|i| {
            ServiceInstance::builder()
                .name("order-svc")
                .ip("127.0.0.1")
                .port(50051 + i)
                .metadata_entry("version", "v1")
                .scheme("grpc")
                .build()
        })
        .collect();
    for instance in &instances {
        registrar.register(instance).await?;
    }

    let consumer = tokio::spawn(async move {
        while let Some(snapshot) = rx.recv().await {
            let addresses: Vec<String> = snapshot.iter().map(ServiceInstance::address).collect();
            info!(count = snapshot.len(), ?addresses, "Snapshot received");
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(services = ?discovery.get_services().await?, "Registered services");

    for instance in &instances {
        registrar.deregister(instance).await?;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    watcher.close().await?;
    // close 清空订阅集合后发送端被释放，消费循环随之结束
    consumer.await?;
    Ok(())
}
