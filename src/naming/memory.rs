//! 进程内命名服务客户端
//!
//! 不做持久化，也没有心跳：临时实例在注销前一直可见。用于本地开发、测试以及
//! `memory://` scheme。分组和集群的默认值、实例 ID 的格式与常见命名服务保持一致。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::client::{
    DeregisterInstanceParam, GetAllServicesParam, NamingClient, RawInstance,
    RegisterInstanceParam, SelectInstancesParam, SubscribeCallback, SubscribeParam,
    SubscriptionId,
};
use crate::error::BoxError;

/// 未指定分组时使用的分组名
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// 未指定集群时使用的集群名
pub const DEFAULT_CLUSTER: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ServiceKey {
    group: String,
    service: String,
}

impl ServiceKey {
    fn new(group: &str, service: &str) -> Self {
        let group = if group.is_empty() { DEFAULT_GROUP } else { group };
        Self {
            group: group.to_string(),
            service: service.to_string(),
        }
    }
}

struct Subscription {
    key: ServiceKey,
    clusters: Vec<String>,
    callback: SubscribeCallback,
}

#[derive(Default)]
struct MemoryState {
    services: BTreeMap<ServiceKey, Vec<RawInstance>>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
}

impl MemoryState {
    /// 收集关心 `key` 下 `cluster` 变化的回调及各自应看到的实例
    fn pending_pushes(
        &self,
        key: &ServiceKey,
        cluster: &str,
    ) -> Vec<(SubscribeCallback, Vec<RawInstance>)> {
        let hosts = self.services.get(key).map(Vec::as_slice).unwrap_or_default();
        self.subscriptions
            .values()
            .filter(|sub| &sub.key == key)
            .filter(|sub| sub.clusters.is_empty() || sub.clusters.iter().any(|c| c == cluster))
            .map(|sub| {
                let visible = hosts
                    .iter()
                    .filter(|host| in_clusters(host, &sub.clusters))
                    .cloned()
                    .collect();
                (sub.callback.clone(), visible)
            })
            .collect()
    }
}

/// 进程内命名服务客户端
pub struct MemoryNamingClient {
    namespace: String,
    state: RwLock<MemoryState>,
    next_subscription: AtomicU64,
}

impl Default for MemoryNamingClient {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryNamingClient {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            state: RwLock::new(MemoryState::default()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 修改实例健康状态并推送变化，实例不存在时返回 `false`
    pub async fn set_instance_health(
        &self,
        service_name: &str,
        group_name: &str,
        ip: &str,
        port: u16,
        healthy: bool,
    ) -> bool {
        let key = ServiceKey::new(group_name, service_name);
        let pushes = {
            let mut state = self.state.write().await;
            let Some(host) = state
                .services
                .get_mut(&key)
                .and_then(|hosts| hosts.iter_mut().find(|h| h.ip == ip && h.port == port))
            else {
                return false;
            };
            host.healthy = healthy;
            let cluster = host.cluster_name.clone();
            state.pending_pushes(&key, &cluster)
        };
        debug!(service = %service_name, ip, port, healthy, "Instance health changed");
        push(pushes);
        true
    }

    /// 当前活跃订阅数
    pub async fn subscription_count(&self) -> usize {
        self.state.read().await.subscriptions.len()
    }
}

#[async_trait]
impl NamingClient for MemoryNamingClient {
    async fn select_instances(
        &self,
        param: SelectInstancesParam,
    ) -> Result<Vec<RawInstance>, BoxError> {
        let key = ServiceKey::new(&param.group_name, &param.service_name);
        let state = self.state.read().await;
        let hosts = state
            .services
            .get(&key)
            .map(|hosts| {
                hosts
                    .iter()
                    .filter(|host| in_clusters(host, &param.clusters))
                    .filter(|host| !param.healthy_only || host.healthy)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(hosts)
    }

    async fn get_all_services_info(
        &self,
        param: GetAllServicesParam,
    ) -> Result<Vec<String>, BoxError> {
        if !param.namespace.is_empty() && param.namespace != self.namespace {
            return Ok(Vec::new());
        }
        if param.page_no == 0 || param.page_size == 0 {
            return Err(format!(
                "invalid page: page_no={} page_size={}",
                param.page_no, param.page_size
            )
            .into());
        }

        let state = self.state.read().await;
        let names: BTreeSet<&str> = state
            .services
            .keys()
            .map(|key| key.service.as_str())
            .collect();
        let skip = (param.page_no as usize - 1).saturating_mul(param.page_size as usize);
        Ok(names
            .into_iter()
            .skip(skip)
            .take(param.page_size as usize)
            .map(str::to_string)
            .collect())
    }

    async fn register_instance(&self, param: RegisterInstanceParam) -> Result<bool, BoxError> {
        if param.ip.trim().is_empty() {
            return Err("instance ip is blank".into());
        }

        let key = ServiceKey::new(&param.group_name, &param.service_name);
        let cluster = if param.cluster_name.is_empty() {
            DEFAULT_CLUSTER.to_string()
        } else {
            param.cluster_name
        };
        let host = RawInstance {
            instance_id: format!(
                "{}#{}#{}#{}@@{}",
                param.ip, param.port, cluster, key.group, key.service
            ),
            ip: param.ip,
            port: param.port,
            weight: param.weight,
            healthy: param.healthy,
            enabled: param.enabled,
            ephemeral: param.ephemeral,
            cluster_name: cluster,
            service_name: param.service_name,
            metadata: param.metadata,
        };

        let cluster = host.cluster_name.clone();
        let pushes = {
            let mut state = self.state.write().await;
            let hosts = state.services.entry(key.clone()).or_default();
            match hosts.iter_mut().find(|h| h.instance_id == host.instance_id) {
                Some(existing) => *existing = host,
                None => hosts.push(host),
            }
            state.pending_pushes(&key, &cluster)
        };
        push(pushes);
        Ok(true)
    }

    async fn deregister_instance(&self, param: DeregisterInstanceParam) -> Result<bool, BoxError> {
        let key = ServiceKey::new(&param.group_name, &param.service_name);
        let cluster = if param.cluster_name.is_empty() {
            DEFAULT_CLUSTER
        } else {
            param.cluster_name.as_str()
        };

        let pushes = {
            let mut state = self.state.write().await;
            let Some(hosts) = state.services.get_mut(&key) else {
                return Ok(true);
            };
            let before = hosts.len();
            hosts.retain(|h| !(h.ip == param.ip && h.port == param.port && h.cluster_name == cluster));
            if hosts.len() == before {
                return Ok(true);
            }
            if hosts.is_empty() {
                state.services.remove(&key);
            }
            state.pending_pushes(&key, cluster)
        };
        push(pushes);
        Ok(true)
    }

    async fn subscribe(&self, param: SubscribeParam) -> Result<SubscriptionId, BoxError> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let subscription = Subscription {
            key: ServiceKey::new(&param.group_name, &param.service_name),
            clusters: param.clusters,
            callback: param.callback,
        };
        self.state.write().await.subscriptions.insert(id, subscription);
        debug!(service = %param.service_name, %id, "Subscribed");
        Ok(id)
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), BoxError> {
        match self.state.write().await.subscriptions.remove(&subscription) {
            Some(_) => Ok(()),
            None => Err(format!("{subscription} not found").into()),
        }
    }
}

fn in_clusters(host: &RawInstance, clusters: &[String]) -> bool {
    clusters.is_empty() || clusters.iter().any(|c| c == &host.cluster_name)
}

/// 在锁外调用推送回调
fn push(pushes: Vec<(SubscribeCallback, Vec<RawInstance>)>) {
    for (callback, hosts) in pushes {
        callback(Ok(hosts.as_slice()));
    }
}
