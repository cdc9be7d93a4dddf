//! 实例变化监听器
//!
//! 后端在自己的工作线程上调用推送回调，回调只往无界的 tick 通道里 `send`（不阻塞），
//! 每个事件对应一次刷新，由每个 watcher 独占的刷新任务串行地重新查询并扇出快照：
//!
//! ```text
//! backend push ──send──▶ tick ──▶ refresh task ──get_instances──▶ try_send ─┬─▶ subscriber A
//!                                                                          └─▶ subscriber B
//! ```
//!
//! 订阅集合的增删、扇出遍历以及 `close` 的清理都在同一把锁下进行；`closed` 标志在该锁内
//! 与清空集合一起置位，扇出在持锁后先检查标志，因此 `close` 返回后不会再有任何投递。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::{RawInstance, SubscribeCallback, SubscribeParam, SubscriptionId};
use super::discovery::NamingDiscovery;
use crate::error::{BoxError, ErrorCode, RegistryError, Result};
use crate::registry::{Discovery, InstanceSender, ServiceInstance, Watcher};

/// 基于命名服务订阅的监听器
///
/// 由 [`NamingDiscovery::watch_service`] 创建。快照投递是尽力而为的：订阅者通道满时
/// 本次快照直接丢弃，接收端已关闭的通道会被移出订阅集合。
pub struct NamingWatcher {
    query: ServiceInstance,
    discovery: NamingDiscovery,
    subscribers: Mutex<Vec<InstanceSender>>,
    closed: AtomicBool,
    subscription: Mutex<Option<SubscriptionId>>,
    shutdown: CancellationToken,
}

impl NamingWatcher {
    /// 创建监听器并向后端订阅
    pub(crate) async fn start(
        discovery: NamingDiscovery,
        query: ServiceInstance,
    ) -> Result<Arc<Self>> {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel::<()>();
        let service = query.name().to_string();
        let callback: SubscribeCallback = Arc::new(
            move |event: std::result::Result<&[RawInstance], &BoxError>| {
                if let Err(e) = event {
                    debug!(service = %service, error = %e, "Backend pushed an error, refreshing anyway");
                }
                // 刷新任务退出后接收端已释放，发送失败可忽略
                let _ = tick_tx.send(());
            },
        );
        let param = SubscribeParam {
            service_name: query.name().to_string(),
            clusters: discovery.options().clusters.clone(),
            group_name: discovery.options().group_name_for(&query),
            callback,
        };

        let subscription = discovery
            .client()
            .subscribe(param)
            .await
            .map_err(|e| {
                RegistryError::backend(ErrorCode::SubscribeFailed, "subscribe", query.name(), e)
            })?;

        let watcher = Arc::new(Self {
            query,
            discovery,
            subscribers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            subscription: Mutex::new(Some(subscription)),
            shutdown: CancellationToken::new(),
        });
        tokio::spawn(refresh_loop(
            Arc::downgrade(&watcher),
            tick_rx,
            watcher.shutdown.clone(),
        ));

        info!(
            service = %watcher.query.name(),
            %subscription,
            "Watcher subscribed"
        );
        Ok(watcher)
    }

    /// 监听的查询模板
    pub fn query(&self) -> &ServiceInstance {
        &self.query
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 当前订阅者数量
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// 重新查询实例并投递给所有订阅者
    ///
    /// 后端推送时自动调用；也可以在 `notify` 之后手动调用以获取初始快照。
    /// 查询失败只记录日志，订阅者保留上一份快照。
    pub async fn refresh(&self) {
        if self.is_closed() {
            return;
        }

        let instances = match self.discovery.get_instances(&self.query).await {
            Ok(instances) => instances,
            Err(e) => {
                warn!(
                    service = %self.query.name(),
                    error = %e,
                    "Failed to refresh service instances"
                );
                return;
            }
        };

        let mut subscribers = self.subscribers.lock().await;
        if self.is_closed() {
            return;
        }

        let mut delivered = 0usize;
        let mut dropped = 0usize;
        subscribers.retain(|sender| match sender.try_send(instances.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });

        debug!(
            service = %self.query.name(),
            instances = instances.len(),
            delivered,
            dropped,
            "Instance snapshot fanned out"
        );
    }
}

#[async_trait]
impl Watcher for NamingWatcher {
    async fn notify(&self, sender: InstanceSender) {
        let mut subscribers = self.subscribers.lock().await;
        if self.is_closed() {
            debug!(service = %self.query.name(), "Watcher closed, notify ignored");
            return;
        }
        if !subscribers.iter().any(|s| s.same_channel(&sender)) {
            subscribers.push(sender);
        }
    }

    async fn stop_notify(&self, sender: &InstanceSender) {
        self.subscribers
            .lock()
            .await
            .retain(|s| !s.same_channel(sender));
    }

    async fn close(&self) -> Result<()> {
        {
            let mut subscribers = self.subscribers.lock().await;
            if self.closed.swap(true, Ordering::AcqRel) {
                return Ok(());
            }
            subscribers.clear();
        }
        self.shutdown.cancel();

        let subscription = self.subscription.lock().await.take();
        let Some(subscription) = subscription else {
            return Ok(());
        };
        self.discovery
            .client()
            .unsubscribe(subscription)
            .await
            .map_err(|e| {
                RegistryError::backend(
                    ErrorCode::UnsubscribeFailed,
                    "unsubscribe",
                    self.query.name(),
                    e,
                )
            })?;

        info!(service = %self.query.name(), %subscription, "Watcher closed");
        Ok(())
    }
}

impl Drop for NamingWatcher {
    fn drop(&mut self) {
        self.shutdown.cancel();

        // 未调用 close 就被释放时，尽量在后台取消后端订阅
        let Some(subscription) = self.subscription.get_mut().take() else {
            return;
        };
        warn!(
            service = %self.query.name(),
            %subscription,
            "Watcher dropped without close"
        );
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.discovery.client().clone();
            handle.spawn(async move {
                if let Err(e) = client.unsubscribe(subscription).await {
                    warn!(%subscription, error = %e, "Failed to unsubscribe dropped watcher");
                }
            });
        }
    }
}

async fn refresh_loop(
    watcher: Weak<NamingWatcher>,
    mut ticks: mpsc::UnboundedReceiver<()>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
                let Some(watcher) = watcher.upgrade() else {
                    break;
                };
                watcher.refresh().await;
            }
        }
    }
    debug!("Watcher refresh loop stopped");
}
