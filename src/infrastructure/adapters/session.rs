use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::entities::PortResult;
use crate::domain::ports::SessionPort;
use crate::infrastructure::collaborators::SessionService;

/// 会话适配器，直接委托给会话服务
pub struct SessionAdapter {
    sessions: Arc<dyn SessionService>,
}

impl SessionAdapter {
    pub fn new(sessions: Arc<dyn SessionService>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl SessionPort for SessionAdapter {
    async fn login(&self) -> PortResult<()> {
        info!("Creating session");
        PortResult::from_anyhow(self.sessions.begin_session().await)
    }

    async fn logout(&self) -> PortResult<()> {
        PortResult::from_anyhow(self.sessions.end_session().await)
    }
}

pub fn create_session_adapter(sessions: Arc<dyn SessionService>) -> Arc<dyn SessionPort> {
    Arc::new(SessionAdapter::new(sessions))
}
