//! 基于文档存储的用户仓储适配器

use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::entities::{PortResult, Role, SignUpUser, User};
use crate::domain::ports::UserRepositoryPort;
use crate::infrastructure::collaborators::DocumentStore;

const USERS: &str = "users";

pub struct UserRepositoryAdapter {
    store: Arc<dyn DocumentStore>,
}

impl UserRepositoryAdapter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn find(&self, field: &str, value: &str) -> anyhow::Result<User> {
        match self.store.find_one(USERS, field, value).await? {
            Some(document) => decode(document),
            None => bail!("No user found with {field} '{value}'"),
        }
    }

    async fn insert(&self, user: &SignUpUser) -> anyhow::Result<User> {
        // 密码只交给认证服务，不落在用户文档里
        let document = json!({ "name": user.name, "email": user.email, "role": Role::User });
        let Some(id) = self
            .store
            .insert_unique(USERS, "email", &user.email, document)
            .await?
        else {
            bail!("A user with email '{}' already exists", user.email);
        };

        Ok(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: Role::User,
        })
    }
}

fn decode(document: Value) -> anyhow::Result<User> {
    serde_json::from_value(document).context("stored user document is malformed")
}

#[async_trait]
impl UserRepositoryPort for UserRepositoryAdapter {
    async fn get_by_email(&self, email: &str) -> PortResult<User> {
        PortResult::from_anyhow(self.find("email", email).await)
    }

    async fn get_by_id(&self, id: &str) -> PortResult<User> {
        let found = match self.store.find_by_id(USERS, id).await {
            Ok(Some(document)) => decode(document),
            Ok(None) => Err(anyhow::anyhow!("No user found with id '{id}'")),
            Err(err) => Err(err),
        };
        PortResult::from_anyhow(found)
    }

    async fn create(&self, user: &SignUpUser) -> PortResult<User> {
        PortResult::from_anyhow(self.insert(user).await)
    }

    async fn delete(&self, id: &str) -> PortResult<()> {
        let removed = match self.store.remove(USERS, id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(anyhow::anyhow!("No user found with id '{id}'")),
            Err(err) => Err(err),
        };
        PortResult::from_anyhow(removed)
    }
}

pub fn create_user_repository_adapter(store: Arc<dyn DocumentStore>) -> Arc<dyn UserRepositoryPort> {
    Arc::new(UserRepositoryAdapter::new(store))
}
