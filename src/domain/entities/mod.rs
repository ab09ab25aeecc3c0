//! 领域实体定义
//!
//! 端口契约之间传递的请求与结果类型，不包含任何适配器相关的类型。

pub mod email;
pub mod response;
pub mod user;

pub use email::{EmailReceipt, EmailTemplate, OutgoingEmail};
pub use response::PortResult;
pub use user::{Credentials, Role, SignUpUser, User};
