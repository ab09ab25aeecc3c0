//! 应用配置
//!
//! 从 TOML 文件加载，所有字段都有默认值，环境变量可覆盖部分字段。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::infrastructure::container::ConflictPolicy;
use crate::logging::LoggingConfig;

/// 默认配置文件名（当前目录）
pub const DEFAULT_CONFIG_FILE: &str = "portkit.toml";

pub const ENV_LOG_LEVEL: &str = "PORTKIT_LOG_LEVEL";
pub const ENV_FIXED_EMAIL: &str = "PORTKIT_FIXED_EMAIL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub container: ContainerConfig,
    pub logging: LoggingConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub sender: String,
    /// 固定收件人，未配置时邮件适配器无法构造
    pub fixed_recipient: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender: "onboarding@portkit.dev".to_string(),
            fixed_recipient: None,
        }
    }
}

impl AppConfig {
    /// 从指定文件加载，并应用环境变量覆盖
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        let mut config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::TomlParse(_, source) => ConfigError::TomlParse(display, source),
            other => other,
        })?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 指定了路径时必须能读取；未指定时尝试默认文件，不存在则使用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::load(&default_path);
        }

        tracing::debug!("No configuration file found, using defaults");
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse("<inline>".to_string(), e))
    }

    /// 应用覆盖项，`lookup` 通常是环境变量读取
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
        if let Some(recipient) = lookup(ENV_FIXED_EMAIL).filter(|v| !v.trim().is_empty()) {
            self.email.fixed_recipient = Some(recipient);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        tracing_subscriber::EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::Invalid {
                field: "logging.level".to_string(),
                reason: e.to_string(),
            }
        })?;

        if self.email.sender.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "email.sender".to_string(),
                reason: "sender address must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.container.conflict_policy, ConflictPolicy::Replace);
        assert_eq!(config.logging.level, "info");
        assert!(config.email.fixed_recipient.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [container]
            conflict_policy = "reject"

            [logging]
            format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.container.conflict_policy, ConflictPolicy::Reject);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.email, EmailConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let err = AppConfig::from_toml("[container]\nconflict_policy = \"ignore\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(..)));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_LOG_LEVEL => Some("debug".to_string()),
            ENV_FIXED_EMAIL => Some("ops@example.com".to_string()),
            _ => None,
        });

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.email.fixed_recipient.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[email]\nsender = \"team@example.com\"\nfixed_recipient = \"inbox@example.com\""
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.email.sender, "team@example.com");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(..)));
    }

    #[test]
    fn test_empty_sender_is_invalid() {
        let config = AppConfig::from_toml("[email]\nsender = \" \"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "email.sender"
        ));
    }
}
