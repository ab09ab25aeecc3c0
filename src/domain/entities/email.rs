use serde::{Deserialize, Serialize};

/// 邮件模板（已渲染）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub html: String,
}

impl EmailTemplate {
    /// 未提供模板时使用的默认欢迎邮件
    pub fn welcome(first_name: &str) -> Self {
        Self {
            subject: "Welcome aboard".to_string(),
            html: format!("<h1>Welcome, {first_name}!</h1>"),
        }
    }
}

/// 发送回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

/// 发往协作方的完整邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}
