//! demo 命令处理器
//!
//! 在内存协作方上走一遍会话、身份和邮件端口，输出每一步的 `PortResult`。

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use portkit::domain::entities::{Credentials, EmailTemplate, SignUpUser};
use portkit::domain::ports::{EmailContract, IdentityContract, SessionContract};
use portkit::infrastructure::{bootstrap, Collaborators};
use portkit::{AppConfig, PortResult};

use super::HandlerResult;

const DEMO_PASSWORD: &str = "correct-horse";

/// 演示中的一步
#[derive(Debug, Serialize)]
pub struct DemoStep {
    pub operation: &'static str,
    pub result: Value,
}

impl DemoStep {
    fn record<T: Serialize>(operation: &'static str, result: &PortResult<T>) -> HandlerResult<Self> {
        Ok(Self {
            operation,
            result: serde_json::to_value(result)?,
        })
    }

    pub fn status(&self) -> Option<&str> {
        self.result.get("status").and_then(Value::as_str)
    }
}

pub async fn run_demo(config: &AppConfig, email: &str) -> HandlerResult<Vec<DemoStep>> {
    let mut config = config.clone();
    if config.email.fixed_recipient.is_none() {
        warn!(recipient = email, "No fixed recipient configured, using the demo account");
        config.email.fixed_recipient = Some(email.to_string());
    }

    let container = bootstrap(&config, &Collaborators::in_memory())?;
    let session = container.resolve::<SessionContract>().await?;
    let identity = container.resolve::<IdentityContract>().await?;
    let mailer = container.resolve::<EmailContract>().await?;

    let mut steps = Vec::new();

    steps.push(DemoStep::record("session.login", &session.login().await)?);

    let sign_up = SignUpUser {
        name: "Ada".to_string(),
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        confirm_password: DEMO_PASSWORD.to_string(),
    };
    steps.push(DemoStep::record("identity.sign_up", &identity.sign_up(sign_up).await)?);

    let wrong = identity
        .sign_in(Credentials::new(email, "wrong-password"))
        .await;
    steps.push(DemoStep::record("identity.sign_in (wrong password)", &wrong)?);

    let signed_in = identity.sign_in(Credentials::new(email, DEMO_PASSWORD)).await;
    steps.push(DemoStep::record("identity.sign_in", &signed_in)?);
    steps.push(DemoStep::record("identity.verify_session", &identity.verify_session().await)?);

    let token = identity.request_password_reset(email).await;
    steps.push(DemoStep::record("identity.request_password_reset", &token)?);
    if let Some(token) = token.value() {
        let reset = identity.complete_password_reset("battery-staple", token).await;
        steps.push(DemoStep::record("identity.complete_password_reset", &reset)?);
    }

    let welcome = mailer
        .send_fixed_email(Some(EmailTemplate::welcome("Ada")))
        .await;
    steps.push(DemoStep::record("email.send_fixed_email", &welcome)?);

    steps.push(DemoStep::record("identity.sign_out", &identity.sign_out().await)?);
    steps.push(DemoStep::record("session.logout", &session.logout().await)?);

    info!("{}", container.stats().summary());
    Ok(steps)
}

/// 处理 demo 命令
pub async fn handle_demo(config: &AppConfig, email: &str) -> HandlerResult<()> {
    for step in run_demo(config, email).await? {
        println!("{}", serde_json::to_string(&step)?);
    }
    Ok(())
}
