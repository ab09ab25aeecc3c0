//! 领域层
//!
//! 包含端口契约和契约之间传递的实体：
//! - 领域实体
//! - 端口契约（调用方唯一依赖的接口）

pub mod entities;
pub mod ports;
