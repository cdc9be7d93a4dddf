//! 注册中心工厂
//!
//! 根据连接 URI 的 scheme 选择后端，构建绑定到同一命名服务客户端的
//! [`Registrar`] / [`Discovery`]。URI 形如：
//!
//! ```text
//! memory://local?namespaceId=dev
//! nacos://10.0.0.1:8848,10.0.0.2:8848?namespaceId=public
//! ```
//!
//! 内置 `memory` scheme；其他后端通过 [`RegistryFactory::register_backend`] 接入。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use super::{Discovery, Registrar};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::naming::{
    MemoryNamingClient, NamingClient, NamingDiscovery, NamingOptions, NamingRegistrar,
};

/// 内置进程内后端的 scheme
pub const MEMORY_SCHEME: &str = "memory";

/// 解析后的后端连接目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub scheme: String,
    /// 服务端地址列表（`host:port`），由 authority 按逗号拆分
    pub hosts: Vec<String>,
    /// URI 查询参数 `namespaceId`；装配时显式配置的命名空间会覆盖它
    pub namespace: String,
}

impl BackendTarget {
    /// 解析连接 URI
    ///
    /// authority 允许逗号分隔的多个地址，通用 URI 解析器不接受这种写法，因此这里手工拆分。
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| RegistryError::invalid_uri(uri, "missing scheme"))?;
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(RegistryError::invalid_uri(uri, "bad scheme"));
        }

        let (authority, query) = match rest.split_once('?') {
            Some((authority, query)) => (authority, query),
            None => (rest, ""),
        };
        let authority = authority.trim_end_matches('/');
        let hosts = authority
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();

        let namespace = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "namespaceId")
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            hosts,
            namespace,
        })
    }
}

/// 根据连接目标创建命名服务客户端
pub type BackendProvider =
    Arc<dyn Fn(&BackendTarget) -> Result<Arc<dyn NamingClient>> + Send + Sync>;

/// 注册中心工厂
pub struct RegistryFactory {
    providers: HashMap<String, BackendProvider>,
}

impl Default for RegistryFactory {
    fn default() -> Self {
        let mut factory = Self {
            providers: HashMap::new(),
        };
        factory.register_backend(MEMORY_SCHEME, memory_provider());
        factory
    }
}

impl RegistryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或替换）某个 scheme 的后端
    pub fn register_backend(&mut self, scheme: impl Into<String>, provider: BackendProvider) {
        self.providers
            .insert(scheme.into().to_ascii_lowercase(), provider);
    }

    /// 是否支持该 scheme
    pub fn supports(&self, scheme: &str) -> bool {
        self.providers.contains_key(&scheme.to_ascii_lowercase())
    }

    /// 创建服务注册器，`group_name` 为空时使用实例的 scheme 作为分组
    pub fn registrar(&self, uri: &str, group_name: &str) -> Result<Arc<dyn Registrar>> {
        self.registrar_with_options(uri, NamingOptions::default().with_group_name(group_name))
    }

    /// 创建服务发现器，`group_name` 为空时使用查询模板的 scheme 作为分组
    pub fn discovery(&self, uri: &str, group_name: &str) -> Result<Arc<dyn Discovery>> {
        self.discovery_with_options(uri, NamingOptions::default().with_group_name(group_name))
    }

    pub fn registrar_with_options(
        &self,
        uri: &str,
        options: NamingOptions,
    ) -> Result<Arc<dyn Registrar>> {
        let (client, options) = self.resolve(uri, options)?;
        Ok(Arc::new(NamingRegistrar::new(client, options)))
    }

    pub fn discovery_with_options(
        &self,
        uri: &str,
        options: NamingOptions,
    ) -> Result<Arc<dyn Discovery>> {
        let (client, options) = self.resolve(uri, options)?;
        Ok(Arc::new(NamingDiscovery::new(client, options)))
    }

    /// 从配置创建服务注册器
    pub fn registrar_from_config(&self, config: &RegistryConfig) -> Result<Arc<dyn Registrar>> {
        self.registrar_with_options(&config.uri, config.naming.clone())
    }

    /// 从配置创建服务发现器
    pub fn discovery_from_config(&self, config: &RegistryConfig) -> Result<Arc<dyn Discovery>> {
        self.discovery_with_options(&config.uri, config.naming.clone())
    }

    fn resolve(
        &self,
        uri: &str,
        mut options: NamingOptions,
    ) -> Result<(Arc<dyn NamingClient>, NamingOptions)> {
        let mut target = BackendTarget::parse(uri)?;
        let provider = self
            .providers
            .get(&target.scheme)
            .ok_or_else(|| RegistryError::unsupported_scheme(&target.scheme))?;
        // 显式配置的命名空间优先于 URI 中的 namespaceId，后端与查询使用同一个值
        if options.namespace.is_empty() {
            options.namespace = target.namespace.clone();
        } else {
            target.namespace = options.namespace.clone();
        }

        let client = provider(&target)?;
        info!(
            scheme = %target.scheme,
            hosts = ?target.hosts,
            namespace = %options.namespace,
            group = %options.group_name,
            "Naming client resolved"
        );
        Ok((client, options))
    }
}

/// 同一 authority + namespace 共享一个进程内客户端，注册方与发现方因此能互相看到
fn memory_provider() -> BackendProvider {
    let clients: Mutex<HashMap<(Vec<String>, String), Arc<MemoryNamingClient>>> =
        Mutex::new(HashMap::new());
    Arc::new(move |target: &BackendTarget| {
        let mut clients = clients.lock().unwrap_or_else(PoisonError::into_inner);
        let client = clients
            .entry((target.hosts.clone(), target.namespace.clone()))
            .or_insert_with(|| Arc::new(MemoryNamingClient::new(target.namespace.clone())))
            .clone();
        let client: Arc<dyn NamingClient> = client;
        Ok(client)
    })
}
