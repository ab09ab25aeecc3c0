use std::sync::Arc;

use thiserror::Error;

/// 容器错误
///
/// 可克隆：同一次单例构造失败会被分发给所有正在等待的解析者。
/// `ConstructionFailed` 的 `reason` 保留了工厂返回错误的完整链路。
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    #[error("Contract '{contract}' is not registered")]
    UnregisteredContract { contract: String },

    #[error("Contract '{contract}' is already registered")]
    DuplicateRegistration { contract: String },

    #[error("Failed to construct '{contract}': {reason}")]
    ConstructionFailed {
        contract: String,
        reason: String,
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Contract '{contract}' is registered with a different instance type (expected {expected})")]
    TypeMismatch {
        contract: String,
        expected: &'static str,
    },
}

impl ContainerError {
    pub(crate) fn construction_failed(contract: &str, source: anyhow::Error) -> Self {
        ContainerError::ConstructionFailed {
            contract: contract.to_string(),
            reason: format!("{source:#}"),
            source: Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(source)),
        }
    }

    /// 出错的契约名称
    pub fn contract(&self) -> Option<&str> {
        match self {
            ContainerError::UnregisteredContract { contract }
            | ContainerError::DuplicateRegistration { contract }
            | ContainerError::ConstructionFailed { contract, .. }
            | ContainerError::TypeMismatch { contract, .. } => Some(contract),
            ContainerError::CircularDependency { .. } => None,
        }
    }
}

/// 组合根校验错误
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Contract '{0}' is bound more than once in the composition root")]
    DuplicateBinding(String),

    #[error("Contract '{dependent}' depends on '{missing}', which has no binding")]
    MissingBinding { dependent: String, missing: String },

    #[error("Circular port dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Contract '{dependent}' is bound before its dependency '{dependency}'")]
    OutOfOrder {
        dependent: String,
        dependency: String,
    },

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Logging error: {0}")]
    Logging(String),
}

pub type ContainerResult<T> = Result<T, ContainerError>;
