//! 身份端口（宽端口）

use async_trait::async_trait;

use super::{OperationSignature, PortContract};
use crate::domain::entities::{Credentials, PortResult, SignUpUser, User};

#[async_trait]
pub trait IdentityPort: Send + Sync {
    async fn sign_up(&self, user: SignUpUser) -> PortResult<User>;

    async fn sign_in(&self, credentials: Credentials) -> PortResult<User>;

    async fn sign_out(&self) -> PortResult<String>;

    /// 申请重置密码，成功时返回重置令牌
    async fn request_password_reset(&self, email: &str) -> PortResult<String>;

    async fn complete_password_reset(&self, password: &str, token: &str) -> PortResult<String>;

    /// 当前请求是否带有有效会话
    async fn verify_session(&self) -> PortResult<bool>;
}

pub struct IdentityContract;

impl PortContract for IdentityContract {
    type Instance = dyn IdentityPort;

    const NAME: &'static str = "identity";

    const OPERATIONS: &'static [OperationSignature] = &[
        OperationSignature::new("sign_up", "SignUpUser", "PortResult<User>"),
        OperationSignature::new("sign_in", "Credentials", "PortResult<User>"),
        OperationSignature::new("sign_out", "()", "PortResult<String>"),
        OperationSignature::new("request_password_reset", "email: &str", "PortResult<String>"),
        OperationSignature::new(
            "complete_password_reset",
            "password: &str, token: &str",
            "PortResult<String>",
        ),
        OperationSignature::new("verify_session", "()", "PortResult<bool>"),
    ];
}
