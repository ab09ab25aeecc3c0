//! 身份适配器
//!
//! 登录、注销、密码重置直接委托给认证服务；注册时通过已解析的用户仓储端口
//! 创建用户，再向认证服务登记密码。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::entities::{Credentials, PortResult, SignUpUser, User};
use crate::domain::ports::{IdentityPort, UserRepositoryContract, UserRepositoryPort};
use crate::infrastructure::collaborators::AuthProvider;
use crate::infrastructure::container::Resolver;

pub struct IdentityAdapter {
    auth: Arc<dyn AuthProvider>,
    users: Arc<dyn UserRepositoryPort>,
}

impl IdentityAdapter {
    pub fn new(auth: Arc<dyn AuthProvider>, users: Arc<dyn UserRepositoryPort>) -> Self {
        Self { auth, users }
    }
}

#[async_trait]
impl IdentityPort for IdentityAdapter {
    async fn sign_up(&self, user: SignUpUser) -> PortResult<User> {
        if !user.passwords_match() {
            return PortResult::error("Passwords do not match.");
        }

        let created = match self.users.create(&user).await {
            PortResult::Success { value } => value,
            PortResult::Error { message } => {
                warn!(email = %user.email, %message, "Sign-up rejected by user repository");
                return PortResult::Error { message };
            }
        };

        debug!(user_id = %created.id, "User created, enrolling credentials");
        if let Err(err) = self.auth.enroll(&created, &user.password).await {
            // 撤销已创建的用户，否则同一邮箱之后再也无法注册
            if let PortResult::Error { message } = self.users.delete(&created.id).await {
                warn!(user_id = %created.id, %message, "Failed to roll back user after enrollment error");
            }
            return PortResult::from_anyhow(Err(err));
        }
        PortResult::success(created)
    }

    async fn sign_in(&self, credentials: Credentials) -> PortResult<User> {
        PortResult::from_anyhow(self.auth.login(&credentials).await)
    }

    async fn sign_out(&self) -> PortResult<String> {
        PortResult::from_anyhow(self.auth.logout().await)
    }

    async fn request_password_reset(&self, email: &str) -> PortResult<String> {
        PortResult::from_anyhow(self.auth.forgot_password(email).await)
    }

    async fn complete_password_reset(&self, password: &str, token: &str) -> PortResult<String> {
        PortResult::from_anyhow(
            self.auth
                .reset_password(password, token)
                .await
                .map(|()| "Password has been reset.".to_string()),
        )
    }

    async fn verify_session(&self) -> PortResult<bool> {
        PortResult::from_anyhow(self.auth.authenticated_user().await.map(|user| user.is_some()))
    }
}

/// 身份适配器工厂，用户仓储从容器解析
pub async fn create_identity_adapter(
    resolver: Resolver,
    auth: Arc<dyn AuthProvider>,
) -> anyhow::Result<Arc<dyn IdentityPort>> {
    let users = resolver.resolve::<UserRepositoryContract>().await?;
    Ok(Arc::new(IdentityAdapter::new(auth, users)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::create_user_repository_adapter;
    use crate::infrastructure::collaborators::{InMemoryAuthProvider, InMemoryDocumentStore};

    fn adapter() -> (IdentityAdapter, Arc<InMemoryAuthProvider>) {
        let auth = Arc::new(InMemoryAuthProvider::new());
        let users = create_user_repository_adapter(Arc::new(InMemoryDocumentStore::new()));
        (IdentityAdapter::new(auth.clone(), users), auth)
    }

    fn sign_up(password: &str, confirm: &str) -> SignUpUser {
        SignUpUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_rejects_mismatched_passwords() {
        let (identity, _) = adapter();
        let result = identity.sign_up(sign_up("a", "b")).await;
        assert_eq!(result, PortResult::error("Passwords do not match."));
    }

    #[tokio::test]
    async fn test_full_identity_flow() {
        let (identity, _) = adapter();

        let user = identity.sign_up(sign_up("pw", "pw")).await.into_result().unwrap();
        assert_eq!(identity.verify_session().await, PortResult::success(false));

        let signed_in = identity
            .sign_in(Credentials::new("ada@example.com", "pw"))
            .await;
        assert_eq!(signed_in, PortResult::success(user));
        assert_eq!(identity.verify_session().await, PortResult::success(true));

        let token = identity
            .request_password_reset("ada@example.com")
            .await
            .into_result()
            .unwrap();
        assert!(identity.complete_password_reset("pw2", &token).await.is_success());

        assert!(identity.sign_out().await.is_success());
        assert_eq!(identity.verify_session().await, PortResult::success(false));
        assert!(identity
            .sign_in(Credentials::new("ada@example.com", "pw2"))
            .await
            .is_success());
    }

    #[tokio::test]
    async fn test_sign_up_can_be_retried_after_enrollment_failure() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let auth = Arc::new(InMemoryAuthProvider::new());
        let identity = IdentityAdapter::new(auth.clone(), create_user_repository_adapter(store.clone()));

        auth.fail_with(Some("auth down")).await;
        let failed = identity.sign_up(sign_up("pw", "pw")).await;
        assert_eq!(failed, PortResult::error("auth down"));
        assert_eq!(store.count("users").await, 0);

        auth.fail_with(None).await;
        let retried = identity.sign_up(sign_up("pw", "pw")).await;
        assert!(retried.is_success(), "{retried:?}");
        assert_eq!(store.count("users").await, 1);
    }

    #[tokio::test]
    async fn test_collaborator_outage_is_reported_as_value() {
        let (identity, auth) = adapter();
        auth.fail_with(Some("auth backend unavailable")).await;

        assert_eq!(
            identity.verify_session().await,
            PortResult::error("auth backend unavailable")
        );
    }
}
