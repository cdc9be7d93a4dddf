//! 注册中心统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// 后端命名客户端返回的原始错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 注册中心统一错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    /// 参数校验失败（未发起任何后端调用）
    #[error("参数校验失败 [{code}]: {reason}")]
    Validation { code: ErrorCode, reason: String },

    /// 后端调用本身失败，原样携带后端错误
    #[error("后端调用失败 [{code}] {operation} ({target}): {source}")]
    Backend {
        code: ErrorCode,
        operation: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },

    /// 后端调用成功但返回了失败结果
    #[error("failed to {operation} instance [{code}] ({target})")]
    OperationFailed {
        code: ErrorCode,
        operation: &'static str,
        target: String,
    },

    /// 配置或装配错误
    #[error("配置错误 [{code}]: {reason}")]
    Configuration { code: ErrorCode, reason: String },
}

impl RegistryError {
    /// 服务名为空
    pub fn blank_service_name(operation: &'static str) -> Self {
        RegistryError::Validation {
            code: ErrorCode::BlankServiceName,
            reason: format!("no service to {operation}: service name is blank"),
        }
    }

    /// 包装后端错误
    pub fn backend(
        code: ErrorCode,
        operation: &'static str,
        target: impl Into<String>,
        source: BoxError,
    ) -> Self {
        RegistryError::Backend {
            code,
            operation,
            target: target.into(),
            source,
        }
    }

    /// 注册返回失败
    pub fn register_failed(target: impl Into<String>) -> Self {
        RegistryError::OperationFailed {
            code: ErrorCode::RegisterFailed,
            operation: "register",
            target: target.into(),
        }
    }

    /// 注销返回失败
    pub fn deregister_failed(target: impl Into<String>) -> Self {
        RegistryError::OperationFailed {
            code: ErrorCode::DeregisterFailed,
            operation: "deregister",
            target: target.into(),
        }
    }

    /// 通用配置错误
    pub fn configuration(reason: impl Into<String>) -> Self {
        RegistryError::Configuration {
            code: ErrorCode::ConfigurationError,
            reason: reason.into(),
        }
    }

    /// 不支持的 URI scheme
    pub fn unsupported_scheme(scheme: &str) -> Self {
        RegistryError::Configuration {
            code: ErrorCode::UnsupportedScheme,
            reason: format!("not support this scheme {scheme}"),
        }
    }

    /// 非法的连接 URI
    pub fn invalid_uri(uri: &str, reason: impl std::fmt::Display) -> Self {
        RegistryError::Configuration {
            code: ErrorCode::InvalidUri,
            reason: format!("invalid registry uri {uri}: {reason}"),
        }
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::Validation { code, .. }
            | RegistryError::Backend { code, .. }
            | RegistryError::OperationFailed { code, .. }
            | RegistryError::Configuration { code, .. } => *code,
        }
    }

    /// 是否为参数校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::Validation { .. })
    }

    /// 判断调用方是否值得重试
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, RegistryError>;
