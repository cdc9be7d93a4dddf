//! 命名服务客户端抽象
//!
//! 核心层只依赖这里定义的接口，具体后端（内存实现或外部命名服务绑定）实现
//! [`NamingClient`] 即可接入。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;

/// 后端返回的原始实例
#[derive(Debug, Clone, PartialEq)]
pub struct RawInstance {
    /// 后端分配的实例 ID
    pub instance_id: String,
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub healthy: bool,
    pub enabled: bool,
    pub ephemeral: bool,
    pub cluster_name: String,
    pub service_name: String,
    pub metadata: HashMap<String, String>,
}

/// 实例查询参数
#[derive(Debug, Clone, Default)]
pub struct SelectInstancesParam {
    pub service_name: String,
    pub clusters: Vec<String>,
    pub group_name: String,
    pub healthy_only: bool,
}

/// 服务列表查询参数
#[derive(Debug, Clone, Default)]
pub struct GetAllServicesParam {
    pub namespace: String,
    pub page_no: u32,
    pub page_size: u32,
}

/// 实例注册参数
#[derive(Debug, Clone, Default)]
pub struct RegisterInstanceParam {
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub enabled: bool,
    pub healthy: bool,
    pub metadata: HashMap<String, String>,
    pub cluster_name: String,
    pub service_name: String,
    pub group_name: String,
    pub ephemeral: bool,
}

/// 实例注销参数
#[derive(Debug, Clone, Default)]
pub struct DeregisterInstanceParam {
    pub ip: String,
    pub port: u16,
    pub cluster_name: String,
    pub service_name: String,
    pub group_name: String,
    pub ephemeral: bool,
}

/// 推送回调，由后端在自己的工作线程上调用
///
/// 实现方不得在回调中阻塞。
pub type SubscribeCallback =
    Arc<dyn Fn(Result<&[RawInstance], &BoxError>) + Send + Sync + 'static>;

/// 订阅参数
#[derive(Clone)]
pub struct SubscribeParam {
    pub service_name: String,
    pub clusters: Vec<String>,
    pub group_name: String,
    pub callback: SubscribeCallback,
}

impl fmt::Debug for SubscribeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeParam")
            .field("service_name", &self.service_name)
            .field("clusters", &self.clusters)
            .field("group_name", &self.group_name)
            .finish_non_exhaustive()
    }
}

/// 订阅句柄，用于取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// 命名服务客户端
///
/// 所有方法都可能阻塞在网络 I/O 上；核心层不做重试。
#[async_trait]
pub trait NamingClient: Send + Sync {
    /// 查询实例
    async fn select_instances(
        &self,
        param: SelectInstancesParam,
    ) -> Result<Vec<RawInstance>, BoxError>;

    /// 分页查询命名空间下的服务名
    async fn get_all_services_info(
        &self,
        param: GetAllServicesParam,
    ) -> Result<Vec<String>, BoxError>;

    /// 注册实例，返回后端是否接受
    async fn register_instance(&self, param: RegisterInstanceParam) -> Result<bool, BoxError>;

    /// 注销实例，返回后端是否接受
    async fn deregister_instance(&self, param: DeregisterInstanceParam) -> Result<bool, BoxError>;

    /// 订阅实例变化
    async fn subscribe(&self, param: SubscribeParam) -> Result<SubscriptionId, BoxError>;

    /// 取消订阅
    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), BoxError>;
}
