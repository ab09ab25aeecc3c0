//! 外部协作方接口
//!
//! 认证服务、文档存储、邮件发送等第三方服务只以这里的 trait 出现，
//! 适配器通过它们完成实际 I/O。失败统一用 `anyhow::Error` 表示，
//! 由适配器转换成端口层的 `PortResult::Error`。

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{Credentials, EmailReceipt, OutgoingEmail, User};

pub mod memory;

pub use memory::{InMemoryAuthProvider, InMemoryDocumentStore, InMemoryEmailSender, InMemorySessionService};

/// 会话服务（签发与销毁会话凭证）
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn begin_session(&self) -> anyhow::Result<()>;

    async fn end_session(&self) -> anyhow::Result<()>;
}

/// 认证服务
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 为新用户登记密码
    async fn enroll(&self, user: &User, password: &str) -> anyhow::Result<()>;

    async fn login(&self, credentials: &Credentials) -> anyhow::Result<User>;

    /// 注销当前会话，返回服务端消息
    async fn logout(&self) -> anyhow::Result<String>;

    /// 生成密码重置令牌
    async fn forgot_password(&self, email: &str) -> anyhow::Result<String>;

    async fn reset_password(&self, password: &str, token: &str) -> anyhow::Result<()>;

    /// 当前会话对应的用户
    async fn authenticated_user(&self) -> anyhow::Result<Option<User>>;
}

/// 文档存储
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 插入文档，返回生成的 id（同时写入文档的 `id` 字段）
    async fn insert(&self, collection: &str, document: Value) -> anyhow::Result<String>;

    async fn find_by_id(&self, collection: &str, id: &str) -> anyhow::Result<Option<Value>>;

    /// 按字段精确匹配查找第一个文档
    async fn find_one(&self, collection: &str, field: &str, value: &str) -> anyhow::Result<Option<Value>>;

    /// 仅当集合中没有 `field == value` 的文档时插入，检查与插入是原子的。
    /// 已存在时返回 `None`。
    async fn insert_unique(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        document: Value,
    ) -> anyhow::Result<Option<String>>;

    /// 删除文档，返回是否存在
    async fn remove(&self, collection: &str, id: &str) -> anyhow::Result<bool>;
}

/// 邮件发送
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<EmailReceipt>;
}
