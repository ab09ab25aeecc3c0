//! 用户仓储端口
//!
//! 身份适配器通过它创建用户，而不是直接访问文档存储。

use async_trait::async_trait;

use super::{OperationSignature, PortContract};
use crate::domain::entities::{PortResult, SignUpUser, User};

#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    async fn get_by_email(&self, email: &str) -> PortResult<User>;

    async fn get_by_id(&self, id: &str) -> PortResult<User>;

    async fn create(&self, user: &SignUpUser) -> PortResult<User>;

    /// 删除用户，注册流程中途失败时用来撤销已创建的用户
    async fn delete(&self, id: &str) -> PortResult<()>;
}

pub struct UserRepositoryContract;

impl PortContract for UserRepositoryContract {
    type Instance = dyn UserRepositoryPort;

    const NAME: &'static str = "user_repository";

    const OPERATIONS: &'static [OperationSignature] = &[
        OperationSignature::new("get_by_email", "email: &str", "PortResult<User>"),
        OperationSignature::new("get_by_id", "id: &str", "PortResult<User>"),
        OperationSignature::new("create", "&SignUpUser", "PortResult<User>"),
        OperationSignature::new("delete", "id: &str", "PortResult<()>"),
    ];
}
