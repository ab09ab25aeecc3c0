//! 基础设施层
//!
//! 提供具体的技术实现，包括：
//! - 依赖注入容器
//! - 端口适配器
//! - 外部协作方接口及内存实现
//! - 组合根

pub mod adapters;
pub mod collaborators;
pub mod composition;
pub mod container;

// 重新导出API
pub use composition::{bootstrap, default_root, Collaborators, CompositionRoot};
pub use container::{AdapterRegistration, ConflictPolicy, Container, ContainerStats, Lifecycle, Resolver};
