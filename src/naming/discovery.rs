//! 基于命名服务客户端的服务发现

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::{GetAllServicesParam, NamingClient, RawInstance, SelectInstancesParam};
use super::options::{MAX_PAGE_SIZE, NamingOptions};
use super::watcher::NamingWatcher;
use super::INSTANCE_ID_KEY;
use crate::error::{ErrorCode, RegistryError, Result};
use crate::registry::instance::is_blank;
use crate::registry::{Discovery, ServiceInstance, Watcher};

/// 服务发现器
#[derive(Clone)]
pub struct NamingDiscovery {
    client: Arc<dyn NamingClient>,
    options: Arc<NamingOptions>,
}

impl NamingDiscovery {
    pub fn new(client: Arc<dyn NamingClient>, options: NamingOptions) -> Self {
        Self {
            client,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &NamingOptions {
        &self.options
    }

    pub(crate) fn client(&self) -> &Arc<dyn NamingClient> {
        &self.client
    }

    /// 创建并初始化监听器，返回具体类型
    pub async fn watch_service(&self, query: ServiceInstance) -> Result<Arc<NamingWatcher>> {
        NamingWatcher::start(self.clone(), query).await
    }
}

#[async_trait]
impl Discovery for NamingDiscovery {
    async fn get_instances(&self, query: &ServiceInstance) -> Result<Vec<ServiceInstance>> {
        let param = SelectInstancesParam {
            service_name: query.name().to_string(),
            clusters: self.options.clusters.clone(),
            group_name: self.options.group_name_for(query),
            healthy_only: true,
        };
        let hosts = self.client.select_instances(param).await.map_err(|e| {
            RegistryError::backend(ErrorCode::BackendError, "select instances", query.name(), e)
        })?;

        let total = hosts.len();
        let instances = to_service_instances(hosts, query);
        debug!(
            service = %query.name(),
            total,
            available = instances.len(),
            "Instances selected"
        );
        Ok(instances)
    }

    async fn get_services(&self) -> Result<Vec<String>> {
        let param = GetAllServicesParam {
            namespace: self.options.namespace.clone(),
            page_no: 1,
            page_size: MAX_PAGE_SIZE,
        };
        self.client.get_all_services_info(param).await.map_err(|e| {
            RegistryError::backend(
                ErrorCode::BackendError,
                "get all services",
                self.options.namespace.clone(),
                e,
            )
        })
    }

    async fn watch(&self, query: ServiceInstance) -> Result<Arc<dyn Watcher>> {
        let watcher: Arc<dyn Watcher> = self.watch_service(query).await?;
        Ok(watcher)
    }
}

/// 过滤后端原始实例并转换为对外实例
///
/// 后端不保证 `healthy_only` 生效，这里再过滤一次：下线、不健康、权重非正的实例都被忽略。
/// 顺序与后端返回一致。
pub(crate) fn to_service_instances(
    hosts: Vec<RawInstance>,
    query: &ServiceInstance,
) -> Vec<ServiceInstance> {
    hosts
        .into_iter()
        .filter(|host| host.enabled && host.healthy && host.weight > 0.0)
        .map(|host| {
            let RawInstance {
                instance_id,
                ip,
                port,
                service_name,
                mut metadata,
                ..
            } = host;
            let id = match metadata.remove(INSTANCE_ID_KEY) {
                Some(id) if !is_blank(&id) => id,
                _ => instance_id,
            };
            ServiceInstance::builder()
                .id(id)
                .name(service_name)
                .ip(ip)
                .port(port)
                .metadata(metadata)
                .scheme(query.scheme())
                .build()
        })
        .collect()
}
