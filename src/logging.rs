//! 日志初始化

use crate::config::LoggingConfig;
use crate::{Result, FRAMEWORK_NAME, VERSION};
use tracing_subscriber::EnvFilter;

/// 初始化日志系统
///
/// 设置了 `RUST_LOG` 时以其为准。全局订阅器已存在时不会重复安装
pub fn initialize(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_directive()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(logging.verbose)
        .with_file(logging.verbose)
        .with_line_number(logging.verbose)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Global tracing subscriber already installed");
    }
    tracing::info!("Initializing {} v{}", FRAMEWORK_NAME, VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let logging = LoggingConfig::default();
        assert!(initialize(&logging).is_ok());
        assert!(initialize(&logging).is_ok());
    }
}
