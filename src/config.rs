//! 注册中心配置加载

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::logging::LoggingConfig;
use crate::naming::NamingOptions;

/// 注册中心配置
///
/// ```toml
/// uri = "memory://local?namespaceId=dev"
///
/// [naming]
/// group_name = "orders"
/// cluster_name = "cn-east"
/// weight = 10.0
///
/// [logging]
/// level = "debug"
/// json = false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// 连接 URI，scheme 决定后端
    pub uri: String,
    #[serde(default)]
    pub naming: NamingOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RegistryConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            naming: NamingOptions::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RegistryError::configuration(format!("invalid registry config: {e}")))
    }
}
