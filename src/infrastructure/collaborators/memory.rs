//! 内存版协作方
//!
//! 供命令行演示和测试使用。每个实现都可以通过 `fail_with` 切换到失败模式，
//! 之后的所有调用都返回同一条错误。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{AuthProvider, DocumentStore, EmailSender, SessionService};
use crate::domain::entities::{Credentials, EmailReceipt, OutgoingEmail, User};

#[derive(Default)]
struct FailureSwitch {
    message: RwLock<Option<String>>,
}

impl FailureSwitch {
    async fn set(&self, message: Option<String>) {
        *self.message.write().await = message;
    }

    async fn check(&self) -> anyhow::Result<()> {
        match self.message.read().await.as_deref() {
            Some(message) => Err(anyhow!(message.to_string())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemorySessionService {
    active: AtomicBool,
    failure: FailureSwitch,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn fail_with(&self, message: Option<&str>) {
        self.failure.set(message.map(str::to_string)).await;
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn begin_session(&self) -> anyhow::Result<()> {
        self.failure.check().await?;
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn end_session(&self) -> anyhow::Result<()> {
        self.failure.check().await?;
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct AuthState {
    /// email -> (用户, 密码)
    accounts: HashMap<String, (User, String)>,
    /// 重置令牌 -> email
    reset_tokens: HashMap<String, String>,
    current: Option<User>,
}

#[derive(Default)]
pub struct InMemoryAuthProvider {
    state: RwLock<AuthState>,
    failure: FailureSwitch,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: Option<&str>) {
        self.failure.set(message.map(str::to_string)).await;
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn enroll(&self, user: &User, password: &str) -> anyhow::Result<()> {
        self.failure.check().await?;
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&user.email) {
            bail!("an account for {} already exists", user.email);
        }
        state
            .accounts
            .insert(user.email.clone(), (user.clone(), password.to_string()));
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> anyhow::Result<User> {
        self.failure.check().await?;
        let mut state = self.state.write().await;
        let user = match state.accounts.get(&credentials.email) {
            Some((user, password)) if *password == credentials.password => user.clone(),
            _ => bail!("The email or password provided is incorrect."),
        };
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> anyhow::Result<String> {
        self.failure.check().await?;
        let mut state = self.state.write().await;
        match state.current.take() {
            Some(_) => Ok("Logged out successfully.".to_string()),
            None => bail!("No user is currently logged in."),
        }
    }

    async fn forgot_password(&self, email: &str) -> anyhow::Result<String> {
        self.failure.check().await?;
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(email) {
            bail!("no account registered for {email}");
        }
        let token = uuid::Uuid::new_v4().to_string();
        state.reset_tokens.insert(token.clone(), email.to_string());
        Ok(token)
    }

    async fn reset_password(&self, password: &str, token: &str) -> anyhow::Result<()> {
        self.failure.check().await?;
        let mut state = self.state.write().await;
        let email = state
            .reset_tokens
            .remove(token)
            .context("Token is either invalid or has expired.")?;
        let account = state
            .accounts
            .get_mut(&email)
            .with_context(|| format!("account {email} disappeared during reset"))?;
        account.1 = password.to_string();
        Ok(())
    }

    async fn authenticated_user(&self) -> anyhow::Result<Option<User>> {
        self.failure.check().await?;
        Ok(self.state.read().await.current.clone())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    failure: FailureSwitch,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: Option<&str>) {
        self.failure.set(message.map(str::to_string)).await;
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> anyhow::Result<String> {
        self.failure.check().await?;
        let (id, document) = with_id(document)?;

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn insert_unique(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        document: Value,
    ) -> anyhow::Result<Option<String>> {
        self.failure.check().await?;
        let (id, document) = with_id(document)?;

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|existing| matches_field(existing, field, value)) {
            return Ok(None);
        }
        documents.push(document);
        Ok(Some(id))
    }

    async fn remove(&self, collection: &str, id: &str) -> anyhow::Result<bool> {
        self.failure.check().await?;
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|document| !matches_field(document, "id", id));
        Ok(documents.len() != before)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> anyhow::Result<Option<Value>> {
        self.find_one(collection, "id", id).await
    }

    async fn find_one(&self, collection: &str, field: &str, value: &str) -> anyhow::Result<Option<Value>> {
        self.failure.check().await?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches_field(document, field, value))
                .cloned()
        }))
    }
}

fn matches_field(document: &Value, field: &str, value: &str) -> bool {
    document.get(field).and_then(Value::as_str) == Some(value)
}

/// 生成 id 并写入文档的 `id` 字段
fn with_id(mut document: Value) -> anyhow::Result<(String, Value)> {
    let id = uuid::Uuid::new_v4().to_string();
    document
        .as_object_mut()
        .context("documents must be JSON objects")?
        .insert("id".to_string(), Value::String(id.clone()));
    Ok((id, document))
}

#[derive(Default)]
pub struct InMemoryEmailSender {
    outbox: RwLock<Vec<OutgoingEmail>>,
    failure: FailureSwitch,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: Option<&str>) {
        self.failure.set(message.map(str::to_string)).await;
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<EmailReceipt> {
        self.failure.check().await?;
        if email.to.is_empty() {
            bail!("email has no recipients");
        }
        self.outbox.write().await.push(email);
        Ok(EmailReceipt {
            id: uuid::Uuid::new_v4().to_string(),
        })
    }
}
