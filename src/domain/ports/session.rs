//! 会话端口（窄端口）

use async_trait::async_trait;

use super::{OperationSignature, PortContract};
use crate::domain::entities::PortResult;

#[async_trait]
pub trait SessionPort: Send + Sync {
    /// 建立会话
    async fn login(&self) -> PortResult<()>;

    /// 结束会话
    async fn logout(&self) -> PortResult<()>;
}

pub struct SessionContract;

impl PortContract for SessionContract {
    type Instance = dyn SessionPort;

    const NAME: &'static str = "session";

    const OPERATIONS: &'static [OperationSignature] = &[
        OperationSignature::new("login", "()", "PortResult<()>"),
        OperationSignature::new("logout", "()", "PortResult<()>"),
    ];
}
