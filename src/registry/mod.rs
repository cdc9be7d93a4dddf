//! 服务注册发现模块
//!
//! 对外提供与后端无关的 [`Registrar`]、[`Discovery`]、[`Watcher`] 抽象，
//! 具体后端由 [`RegistryFactory`] 按连接 URI 的 scheme 选择。

pub mod factory;
pub mod instance;
pub mod trait_def;

pub use factory::{BackendProvider, BackendTarget, MEMORY_SCHEME, RegistryFactory};
pub use instance::{ServiceInstance, ServiceInstanceBuilder};
pub use trait_def::{Discovery, InstanceSender, Registrar, Watcher};
