//! 服务注册、发现与监听 Trait 定义

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::instance::ServiceInstance;
use crate::error::Result;

/// 订阅者通道，由调用方创建并持有接收端
///
/// Watcher 只持有发送端，投递为非阻塞的 `try_send`：通道缓冲已满时本次快照被丢弃
/// （尽力而为、至多一次），慢消费者只会丢失更新，不会拖慢通知方或其他订阅者。
pub type InstanceSender = mpsc::Sender<Vec<ServiceInstance>>;

/// 服务注册
#[async_trait]
pub trait Registrar: Send + Sync {
    /// 注册服务实例
    async fn register(&self, instance: &ServiceInstance) -> Result<()>;

    /// 注销服务实例
    async fn deregister(&self, instance: &ServiceInstance) -> Result<()>;
}

/// 服务发现
#[async_trait]
pub trait Discovery: Send + Sync {
    /// 获取与 `query.name()` 关联的全部可用实例
    async fn get_instances(&self, query: &ServiceInstance) -> Result<Vec<ServiceInstance>>;

    /// 获取所有已知服务名
    async fn get_services(&self) -> Result<Vec<String>>;

    /// 监听与 `query.name()` 关联的实例变化
    async fn watch(&self, query: ServiceInstance) -> Result<Arc<dyn Watcher>>;
}

/// 实例变化监听器
///
/// `close` 之后不会再有任何快照投递，订阅集合为空。
#[async_trait]
pub trait Watcher: Send + Sync {
    /// 添加订阅通道，重复添加同一通道无效果
    async fn notify(&self, sender: InstanceSender);

    /// 移除订阅通道，不存在时无效果
    async fn stop_notify(&self, sender: &InstanceSender);

    /// 取消后端订阅并清空订阅集合
    async fn close(&self) -> Result<()>;
}
