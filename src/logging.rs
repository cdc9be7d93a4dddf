//! 日志初始化

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{RegistryError, Result};

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认日志级别过滤（`RUST_LOG` 存在时以环境变量为准）
    pub level: String,

    /// 是否输出 JSON 格式
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// 安装全局 tracing subscriber
///
/// 重复调用会返回配置错误。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            RegistryError::configuration(format!("invalid log level {}: {e}", config.level))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| RegistryError::configuration(format!("failed to init tracing: {e}")))
}
