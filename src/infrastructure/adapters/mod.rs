//! 端口适配器
//!
//! 每个适配器都提供一个 `create_*` 工厂函数，返回端口的 trait 对象。
//! 适配器只依赖协作方接口和其他端口，从不依赖其他适配器的具体类型。

mod email;
mod identity;
mod session;
mod user_repository;

pub use email::{create_email_adapter, EmailAdapter};
pub use identity::{create_identity_adapter, IdentityAdapter};
pub use session::{create_session_adapter, SessionAdapter};
pub use user_repository::{create_user_repository_adapter, UserRepositoryAdapter};
