//! check 命令处理器
//!
//! 组合默认绑定，并按组合顺序逐个解析端口，确认每个适配器都能构造。

use tracing::info;

use portkit::domain::ports::{
    EmailContract, IdentityContract, SessionContract, UserRepositoryContract,
};
use portkit::PortContract;
use portkit::infrastructure::{bootstrap, Collaborators};
use portkit::{AppConfig, Container};

use super::HandlerResult;

#[derive(Debug, Default)]
pub struct CheckReport {
    pub contracts: Vec<&'static str>,
    pub resolved: Vec<&'static str>,
}

pub async fn run_check(config: &AppConfig, skip_resolve: bool) -> HandlerResult<CheckReport> {
    let container = bootstrap(config, &Collaborators::in_memory())?;
    let mut report = CheckReport {
        contracts: container.registered_contracts(),
        resolved: Vec::new(),
    };

    if !skip_resolve {
        report.resolved = resolve_all(&container).await?;
        info!("{}", container.stats().summary());
    }

    Ok(report)
}

async fn resolve_all(container: &Container) -> HandlerResult<Vec<&'static str>> {
    let mut resolved = Vec::new();

    container.resolve::<UserRepositoryContract>().await?;
    resolved.push(UserRepositoryContract::NAME);
    container.resolve::<IdentityContract>().await?;
    resolved.push(IdentityContract::NAME);
    container.resolve::<SessionContract>().await?;
    resolved.push(SessionContract::NAME);
    container.resolve::<EmailContract>().await?;
    resolved.push(EmailContract::NAME);

    Ok(resolved)
}

/// 处理 check 命令，失败时返回错误（进程以非零状态退出）
pub async fn handle_check(config: &AppConfig, skip_resolve: bool) -> HandlerResult<()> {
    println!("🔍 检查组合根...");
    let report = run_check(config, skip_resolve).await?;

    println!("✅ 已绑定 {} 个契约: {}", report.contracts.len(), report.contracts.join(", "));
    if !skip_resolve {
        println!("✅ 已解析: {}", report.resolved.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portkit::{AppError, ContainerError};

    #[tokio::test]
    async fn test_check_reports_unconfigured_email() {
        let err = run_check(&AppConfig::default(), false).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Container(ContainerError::ConstructionFailed { ref contract, .. }) if contract == "email"
        ));
    }

    #[tokio::test]
    async fn test_check_with_recipient() {
        let mut config = AppConfig::default();
        config.email.fixed_recipient = Some("ops@example.com".to_string());

        let report = run_check(&config, false).await.unwrap();
        assert_eq!(report.contracts, vec!["email", "identity", "session", "user_repository"]);
        assert_eq!(report.resolved.len(), 4);
    }

    #[tokio::test]
    async fn test_skip_resolve_only_composes() {
        let report = run_check(&AppConfig::default(), true).await.unwrap();
        assert_eq!(report.contracts.len(), 4);
        assert!(report.resolved.is_empty());
    }
}
