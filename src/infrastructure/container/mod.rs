//! 依赖注入容器
//!
//! 以契约名称为键，把端口契约绑定到适配器工厂，并按生命周期管理解析出的实例。

mod registration;
mod resolver;
mod service_container;
mod wait_graph;

use serde::{Deserialize, Serialize};

pub use registration::AdapterRegistration;
pub use resolver::Resolver;
pub use service_container::{Container, ContainerStats};

/// 实例生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// 每个契约名称只构造一次，之后一直复用
    Singleton,
    /// 每次解析都构造新实例，从不缓存
    Transient,
}

/// 同名契约重复注册时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// 后注册者覆盖先注册者，记录警告并丢弃已缓存的实例
    #[default]
    Replace,
    /// 拒绝重复注册，返回 `DuplicateRegistration`
    Reject,
}
