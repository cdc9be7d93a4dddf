//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 注册中心错误代码
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 参数校验错误
/// - 2000-2999: 后端调用错误
/// - 3000-3999: 后端返回失败结果
/// - 6000-6999: 配置与装配错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 参数校验错误 (1000-1999)
    // ============================================================
    InvalidParameter = 1000,
    BlankServiceName = 1001,

    // ============================================================
    // 后端调用错误 (2000-2999)
    // ============================================================
    BackendError = 2000,
    SubscribeFailed = 2001,
    UnsubscribeFailed = 2002,

    // ============================================================
    // 后端返回失败结果 (3000-3999)
    // ============================================================
    RegisterFailed = 3000,
    DeregisterFailed = 3001,

    // ============================================================
    // 配置与装配错误 (6000-6999)
    // ============================================================
    ConfigurationError = 6000,
    UnsupportedScheme = 6001,
    InvalidUri = 6002,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::InvalidParameter),
            1001 => Some(ErrorCode::BlankServiceName),
            2000 => Some(ErrorCode::BackendError),
            2001 => Some(ErrorCode::SubscribeFailed),
            2002 => Some(ErrorCode::UnsubscribeFailed),
            3000 => Some(ErrorCode::RegisterFailed),
            3001 => Some(ErrorCode::DeregisterFailed),
            6000 => Some(ErrorCode::ConfigurationError),
            6001 => Some(ErrorCode::UnsupportedScheme),
            6002 => Some(ErrorCode::InvalidUri),
            9999 => Some(ErrorCode::UnknownError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::BlankServiceName => "BLANK_SERVICE_NAME",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::SubscribeFailed => "SUBSCRIBE_FAILED",
            ErrorCode::UnsubscribeFailed => "UNSUBSCRIBE_FAILED",
            ErrorCode::RegisterFailed => "REGISTER_FAILED",
            ErrorCode::DeregisterFailed => "DEREGISTER_FAILED",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::UnsupportedScheme => "UNSUPPORTED_SCHEME",
            ErrorCode::InvalidUri => "INVALID_URI",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Validation,
            2000..=2999 => ErrorCategory::Backend,
            3000..=3999 => ErrorCategory::Outcome,
            6000..=6999 => ErrorCategory::Configuration,
            _ => ErrorCategory::General,
        }
    }

    /// 判断调用方是否值得重试
    ///
    /// 核心层本身从不重试，重试策略由调用方决定。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Backend | ErrorCategory::Outcome
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Validation,
    Backend,
    Outcome,
    Configuration,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "VALIDATION"),
            ErrorCategory::Backend => write!(f, "BACKEND"),
            ErrorCategory::Outcome => write!(f, "OUTCOME"),
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
