use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use tracing::{error, info};

use crate::config::EmailConfig;
use crate::domain::entities::{EmailReceipt, EmailTemplate, OutgoingEmail, PortResult};
use crate::domain::ports::EmailPort;
use crate::infrastructure::collaborators::EmailSender;

/// 邮件适配器，收件人在构造时固定
pub struct EmailAdapter {
    sender: Arc<dyn EmailSender>,
    from: String,
    to: String,
}

#[async_trait]
impl EmailPort for EmailAdapter {
    async fn send_fixed_email(&self, template: Option<EmailTemplate>) -> PortResult<EmailReceipt> {
        let template = template.unwrap_or_else(|| EmailTemplate::welcome("there"));
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            subject: template.subject,
            html: template.html,
        };

        let result = PortResult::from_anyhow(self.sender.send(email).await);
        match &result {
            PortResult::Success { value } => info!(id = %value.id, "Email sent"),
            PortResult::Error { message } => error!(%message, "Email send failed"),
        }
        result
    }
}

/// 邮件适配器工厂
///
/// 缺少固定收件人属于配置缺陷，在构造阶段直接失败。
pub fn create_email_adapter(
    sender: Arc<dyn EmailSender>,
    config: &EmailConfig,
) -> anyhow::Result<Arc<dyn EmailPort>> {
    let to = match config.fixed_recipient.as_deref().map(str::trim) {
        Some(recipient) if !recipient.is_empty() => recipient.to_string(),
        _ => bail!("email.fixed_recipient is not configured"),
    };

    Ok(Arc::new(EmailAdapter {
        sender,
        from: config.sender.clone(),
        to,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::collaborators::InMemoryEmailSender;

    fn config(recipient: Option<&str>) -> EmailConfig {
        EmailConfig {
            sender: "noreply@example.com".to_string(),
            fixed_recipient: recipient.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_recipient_fails_construction() {
        let sender = Arc::new(InMemoryEmailSender::new());
        assert!(create_email_adapter(sender.clone(), &config(None)).is_err());
        assert!(create_email_adapter(sender, &config(Some("  "))).is_err());
    }

    #[tokio::test]
    async fn test_default_template_goes_to_fixed_recipient() {
        let sender = Arc::new(InMemoryEmailSender::new());
        let email = create_email_adapter(sender.clone(), &config(Some("ops@example.com"))).unwrap();

        assert!(email.send_fixed_email(None).await.is_success());

        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ops@example.com".to_string()]);
        assert_eq!(sent[0].from, "noreply@example.com");
        assert_eq!(sent[0].subject, "Welcome aboard");
    }
}
