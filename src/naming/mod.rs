//! 基于命名服务客户端的注册、发现与监听实现
//!
//! 只依赖 [`NamingClient`] 接口，任意实现了该接口的后端都可以接入。

pub mod client;
pub mod discovery;
pub mod memory;
pub mod options;
pub mod registrar;
pub mod watcher;

pub use client::{
    DeregisterInstanceParam, GetAllServicesParam, NamingClient, RawInstance,
    RegisterInstanceParam, SelectInstancesParam, SubscribeCallback, SubscribeParam,
    SubscriptionId,
};
pub use discovery::NamingDiscovery;
pub use memory::MemoryNamingClient;
pub use options::{DEFAULT_WEIGHT, MAX_PAGE_SIZE, NamingOptions};
pub use registrar::NamingRegistrar;
pub use watcher::NamingWatcher;

/// 元数据中保存调用方实例 ID 的保留键
pub const INSTANCE_ID_KEY: &str = "InstanceID";
