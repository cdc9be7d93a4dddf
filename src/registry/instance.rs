//! 服务实例定义

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 服务实例
///
/// 构建后不可变，需要修改时通过 [`ServiceInstance::to_builder`] 重新构建。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInstance {
    id: String,
    name: String,
    ip: String,
    port: u16,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    scheme: String,
}

impl ServiceInstance {
    /// 创建新的实例构建器
    pub fn builder() -> ServiceInstanceBuilder {
        ServiceInstanceBuilder::new()
    }

    /// 实例 ID（同名服务内唯一）
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 逻辑服务名
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// 实例携带的扩展信息，未设置时为空 map
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// 协议标记，用于区分分组
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `ip:port` 形式的地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// 以当前实例为初值的构建器（保留 ID）
    pub fn to_builder(&self) -> ServiceInstanceBuilder {
        ServiceInstanceBuilder {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            ip: self.ip.clone(),
            port: self.port,
            metadata: Some(self.metadata.clone()),
            scheme: self.scheme.clone(),
        }
    }
}

/// 服务实例构建器
#[derive(Debug, Clone, Default)]
pub struct ServiceInstanceBuilder {
    id: Option<String>,
    name: String,
    ip: String,
    port: u16,
    metadata: Option<HashMap<String, String>>,
    scheme: String,
}

impl ServiceInstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置实例 ID，不设置（或为空白）时在 `build` 中生成
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 整体替换元数据
    #[must_use]
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 添加单个元数据项
    #[must_use]
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// 构建服务实例
    ///
    /// 未提供 ID 时生成 `<name>.<ip>.<port>.<8 位十六进制随机后缀>`。
    pub fn build(self) -> ServiceInstance {
        let id = match self.id {
            Some(id) if !is_blank(&id) => id,
            _ => format!(
                "{}.{}.{}.{}",
                self.name,
                self.ip,
                self.port,
                random_hex_suffix()
            ),
        };
        ServiceInstance {
            id,
            name: self.name,
            ip: self.ip,
            port: self.port,
            metadata: self.metadata.unwrap_or_default(),
            scheme: self.scheme,
        }
    }
}

fn random_hex_suffix() -> String {
    format!("{:08x}", rand::random::<u32>())
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_generated_id(id: &str, prefix: &str) {
        let suffix = id
            .strip_prefix(prefix)
            .unwrap_or_else(|| panic!("id {id} does not start with {prefix}"));
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_build_generates_id_when_unset() {
        let instance = ServiceInstance::builder()
            .name("order-svc")
            .ip("10.0.0.5")
            .port(8080)
            .build();

        assert_generated_id(instance.id(), "order-svc.10.0.0.5.8080.");
    }

    #[test]
    fn test_build_generates_id_when_blank() {
        let instance = ServiceInstance::builder()
            .id("   ")
            .name("order-svc")
            .ip("10.0.0.5")
            .port(8080)
            .build();

        assert_generated_id(instance.id(), "order-svc.10.0.0.5.8080.");
    }

    #[test]
    fn test_generated_ids_differ() {
        let build = || {
            ServiceInstance::builder()
                .name("order-svc")
                .ip("10.0.0.5")
                .port(8080)
                .build()
        };
        assert_ne!(build().id(), build().id());
    }

    #[test]
    fn test_explicit_id_is_kept() {
        let instance = ServiceInstance::builder().id("custom-1").name("svc").build();
        assert_eq!(instance.id(), "custom-1");
    }

    #[test]
    fn test_metadata_defaults_to_empty() {
        let instance = ServiceInstance::builder().name("svc").build();
        assert!(instance.metadata().is_empty());
    }

    #[test]
    fn test_to_builder_keeps_identity() {
        let original = ServiceInstance::builder()
            .name("svc")
            .ip("127.0.0.1")
            .port(9000)
            .metadata_entry("zone", "a")
            .scheme("grpc")
            .build();

        let updated = original.to_builder().metadata_entry("zone", "b").build();

        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.scheme(), "grpc");
        assert_eq!(updated.metadata().get("zone").map(String::as_str), Some("b"));
        assert_eq!(original.metadata().get("zone").map(String::as_str), Some("a"));
    }
}
