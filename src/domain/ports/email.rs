use async_trait::async_trait;

use super::{OperationSignature, PortContract};
use crate::domain::entities::{EmailReceipt, EmailTemplate, PortResult};

#[async_trait]
pub trait EmailPort: Send + Sync {
    /// 向配置中的固定收件人发送邮件，未提供模板时使用默认模板
    async fn send_fixed_email(&self, template: Option<EmailTemplate>) -> PortResult<EmailReceipt>;
}

pub struct EmailContract;

impl PortContract for EmailContract {
    type Instance = dyn EmailPort;

    const NAME: &'static str = "email";

    const OPERATIONS: &'static [OperationSignature] = &[OperationSignature::new(
        "send_fixed_email",
        "Option<EmailTemplate>",
        "PortResult<EmailReceipt>",
    )];
}
