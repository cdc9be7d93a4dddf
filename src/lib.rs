//! Flare Registry
//!
//! Backend-agnostic service registration, discovery and watch: register an outgoing
//! service endpoint, query the live endpoints of a named service, and subscribe to
//! membership changes without depending on a specific naming-service protocol.
//!
//! ```no_run
//! # async fn demo() -> flare_registry::Result<()> {
//! use flare_registry::{RegistryFactory, ServiceInstance};
//! use tokio::sync::mpsc;
//!
//! let factory = RegistryFactory::new();
//! let registrar = factory.registrar("memory://local", "orders")?;
//! let discovery = factory.discovery("memory://local", "orders")?;
//!
//! let query = ServiceInstance::builder().name("order-svc").build();
//! let watcher = discovery.watch(query).await?;
//! let (tx, mut rx) = mpsc::channel(8);
//! watcher.notify(tx).await;
//!
//! let instance = ServiceInstance::builder()
//!     .name("order-svc")
//!     .ip("10.0.0.5")
//!     .port(8080)
//!     .build();
//! registrar.register(&instance).await?;
//!
//! if let Some(snapshot) = rx.recv().await {
//!     println!("{} instance(s) available", snapshot.len());
//! }
//! watcher.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod registry;

// Re-exports
pub use config::RegistryConfig;
pub use error::{BoxError, ErrorCategory, ErrorCode, RegistryError, Result};
pub use logging::{LoggingConfig, init_tracing};
pub use naming::{
    DEFAULT_WEIGHT, INSTANCE_ID_KEY, MAX_PAGE_SIZE, MemoryNamingClient, NamingClient,
    NamingDiscovery, NamingOptions, NamingRegistrar, NamingWatcher, RawInstance, SubscriptionId,
};
pub use registry::{
    BackendProvider, BackendTarget, Discovery, InstanceSender, MEMORY_SCHEME, Registrar,
    RegistryFactory, ServiceInstance, ServiceInstanceBuilder, Watcher,
};
