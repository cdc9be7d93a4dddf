//! Flare Registry 错误处理模块
//!
//! 三类错误：参数校验错误、后端调用错误（原样携带后端错误并标注操作与目标）、
//! 后端返回失败结果。核心层不做任何自动重试。

pub mod code;
pub mod registry_error;

pub use code::{ErrorCategory, ErrorCode};
pub use registry_error::{BoxError, RegistryError, Result};
