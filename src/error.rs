//! 错误处理系统
//!
//! 统一的错误类型和错误处理机制

use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug)]
pub enum ByzantineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// 读取值时期望的类型与存储的类型不符
    #[error("Type mismatch for key {key}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// 事件处理器执行失败
    #[error("Handler {handler} failed at position {index} while dispatching {event}: {source}")]
    Handler {
        event: &'static str,
        handler: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ByzantineError {
    /// 创建类型不匹配错误
    pub fn type_mismatch<V>(key: impl ToString) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<V>(),
        }
    }

    /// 创建配置相关错误
    pub fn config(message: &str) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ByzantineError>;
