//! 配置管理
//!
//! 支持 YAML 配置文件，所有字段都有默认值，缺省的段落按默认值补齐

use crate::{ByzantineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 核心配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// 日志配置
    pub logging: LoggingConfig,
    /// 分发器配置
    pub dispatcher: DispatcherConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出事件目标与源码位置
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            verbose: false,
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// 转换为 `EnvFilter` 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 处理器失败时的策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 立即返回错误，不再调用后续处理器
    #[default]
    FailFast,
    /// 记录错误并继续调用后续处理器
    Continue,
}

/// 分发器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub failure_policy: FailurePolicy,
}

/// 配置管理器
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: CoreConfig,
}

impl ConfigManager {
    /// 创建默认配置
    pub fn new_default() -> Self {
        Self::default()
    }

    /// 从 YAML 文本解析配置
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: CoreConfig = serde_yaml::from_str(content)?;
        Ok(Self { config })
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ByzantineError::config(&format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let manager = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(manager)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self.config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取配置
    pub fn get_config(&self) -> &CoreConfig {
        &self.config
    }

    /// 获取可变配置
    pub fn get_config_mut(&mut self) -> &mut CoreConfig {
        &mut self.config
    }

    /// 验证配置有效性
    ///
    /// 详细日志只在 debug 及以上级别有意义
    pub fn validate(&self) -> Result<()> {
        let logging = &self.config.logging;
        if logging.verbose && matches!(logging.level, LogLevel::Error | LogLevel::Warn) {
            return Err(ByzantineError::config(
                "Verbose logging requires level info or lower",
            ));
        }

        tracing::info!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_config_manager_default() {
        let config_manager = ConfigManager::new_default();
        let config = config_manager.get_config();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.dispatcher.failure_policy, FailurePolicy::FailFast);
        assert!(config_manager.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "dispatcher:\n  failure_policy: continue\n";
        let manager = ConfigManager::from_yaml_str(yaml).unwrap();
        let config = manager.get_config();

        assert_eq!(config.dispatcher.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[rstest]
    #[case("error", LogLevel::Error)]
    #[case("warn", LogLevel::Warn)]
    #[case("info", LogLevel::Info)]
    #[case("debug", LogLevel::Debug)]
    #[case("trace", LogLevel::Trace)]
    fn test_log_level_parsing(#[case] raw: &str, #[case] expected: LogLevel) {
        let yaml = format!("logging:\n  level: {raw}\n");
        let manager = ConfigManager::from_yaml_str(&yaml).unwrap();
        assert_eq!(manager.get_config().logging.level, expected);
        assert_eq!(expected.as_directive(), raw);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = ConfigManager::from_yaml_str("dispatcher:\n  failure_policy: retry\n");
        assert!(matches!(result, Err(ByzantineError::Yaml(_))));
    }

    #[rstest]
    #[case(LogLevel::Error, true, false)]
    #[case(LogLevel::Warn, true, false)]
    #[case(LogLevel::Info, true, true)]
    #[case(LogLevel::Trace, true, true)]
    #[case(LogLevel::Error, false, true)]
    fn test_validate_verbose_level(
        #[case] level: LogLevel,
        #[case] verbose: bool,
        #[case] valid: bool,
    ) {
        let mut manager = ConfigManager::new_default();
        manager.get_config_mut().logging = LoggingConfig { level, verbose };
        assert_eq!(manager.validate().is_ok(), valid);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("byzantine.yaml");

        let mut manager = ConfigManager::new_default();
        manager.get_config_mut().dispatcher.failure_policy = FailurePolicy::Continue;
        manager.get_config_mut().logging.level = LogLevel::Debug;
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config(), manager.get_config());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::load_from_file(dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(ByzantineError::Config { .. })));
    }
}
