//! 组合根
//!
//! 进程启动时唯一一处把端口绑定到适配器的地方。绑定按依赖顺序显式列出，
//! `compose` 先整体校验，再一次性注册到容器。

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::CompositionError;
use crate::infrastructure::adapters::{
    create_email_adapter, create_identity_adapter, create_session_adapter,
    create_user_repository_adapter,
};
use crate::infrastructure::collaborators::{
    AuthProvider, DocumentStore, EmailSender, InMemoryAuthProvider, InMemoryDocumentStore,
    InMemoryEmailSender, InMemorySessionService, SessionService,
};
use crate::infrastructure::container::{AdapterRegistration, ConflictPolicy, Container};
use crate::domain::ports::{
    EmailContract, IdentityContract, SessionContract, UserRepositoryContract,
};
use crate::logging::OperationTimer;

/// 有序的绑定列表
#[derive(Debug, Default)]
pub struct CompositionRoot {
    bindings: Vec<AdapterRegistration>,
}

impl CompositionRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, registration: AdapterRegistration) -> Self {
        self.bindings.push(registration);
        self
    }

    pub fn contracts(&self) -> Vec<&'static str> {
        self.bindings.iter().map(AdapterRegistration::contract).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 校验绑定列表，不修改任何状态
    pub fn validate(&self) -> Result<(), CompositionError> {
        let mut positions: HashMap<&'static str, usize> = HashMap::new();
        for (index, binding) in self.bindings.iter().enumerate() {
            if positions.insert(binding.contract(), index).is_some() {
                return Err(CompositionError::DuplicateBinding(binding.contract().to_string()));
            }
        }

        for binding in &self.bindings {
            for dependency in binding.dependencies() {
                if !positions.contains_key(dependency) {
                    return Err(CompositionError::MissingBinding {
                        dependent: binding.contract().to_string(),
                        missing: dependency.to_string(),
                    });
                }
            }
        }

        if let Some(chain) = self.find_cycle() {
            return Err(CompositionError::CircularDependency {
                chain: chain.into_iter().map(str::to_string).collect(),
            });
        }

        for (index, binding) in self.bindings.iter().enumerate() {
            for dependency in binding.dependencies() {
                if positions[dependency] > index {
                    return Err(CompositionError::OutOfOrder {
                        dependent: binding.contract().to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn find_cycle(&self) -> Option<Vec<&'static str>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            name: &'static str,
            graph: &HashMap<&'static str, &[&'static str]>,
            marks: &mut HashMap<&'static str, Mark>,
            stack: &mut Vec<&'static str>,
        ) -> Option<Vec<&'static str>> {
            match marks.get(name) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                    let mut chain = stack[start..].to_vec();
                    chain.push(name);
                    return Some(chain);
                }
                None => {}
            }

            marks.insert(name, Mark::Visiting);
            stack.push(name);
            for dependency in graph.get(name).copied().unwrap_or_default() {
                if let Some(chain) = visit(*dependency, graph, marks, stack) {
                    return Some(chain);
                }
            }
            stack.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let graph: HashMap<&'static str, &[&'static str]> = self
            .bindings
            .iter()
            .map(|binding| (binding.contract(), binding.dependencies()))
            .collect();
        let mut marks = HashMap::new();
        let mut stack = Vec::new();

        self.bindings
            .iter()
            .find_map(|binding| visit(binding.contract(), &graph, &mut marks, &mut stack))
    }

    /// 校验并注册全部绑定
    ///
    /// 组合根中的重复始终被拒绝；容器里已有的同名绑定同样视为冲突。
    pub fn compose(self, container: &Container) -> Result<(), CompositionError> {
        let timer = OperationTimer::new("compose");
        self.validate()?;

        let count = self.bindings.len();
        for binding in self.bindings {
            container.register_with_policy(binding, ConflictPolicy::Reject)?;
        }

        info!(bindings = count, "Composition root applied");
        timer.finish();
        Ok(())
    }
}

/// 适配器使用的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionService>,
    pub auth: Arc<dyn AuthProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub email: Arc<dyn EmailSender>,
}

impl Collaborators {
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionService::new()),
            auth: Arc::new(InMemoryAuthProvider::new()),
            documents: Arc::new(InMemoryDocumentStore::new()),
            email: Arc::new(InMemoryEmailSender::new()),
        }
    }
}

/// 默认组合：用户仓储、身份、会话、邮件
pub fn default_root(config: &AppConfig, collaborators: &Collaborators) -> CompositionRoot {
    let documents = Arc::clone(&collaborators.documents);
    let auth = Arc::clone(&collaborators.auth);
    let sessions = Arc::clone(&collaborators.sessions);
    let sender = Arc::clone(&collaborators.email);
    let email_config = config.email.clone();

    CompositionRoot::new()
        .bind(AdapterRegistration::singleton::<UserRepositoryContract, _, _>(
            move |_| future::ready(anyhow::Ok(create_user_repository_adapter(documents.clone()))),
        ))
        .bind(
            AdapterRegistration::singleton::<IdentityContract, _, _>(move |resolver| {
                create_identity_adapter(resolver, auth.clone())
            })
            .depends_on::<UserRepositoryContract>(),
        )
        .bind(AdapterRegistration::singleton::<SessionContract, _, _>(
            move |_| future::ready(anyhow::Ok(create_session_adapter(sessions.clone()))),
        ))
        .bind(AdapterRegistration::singleton::<EmailContract, _, _>(
            move |_| future::ready(create_email_adapter(sender.clone(), &email_config)),
        ))
}

/// 创建容器并应用默认组合
pub fn bootstrap(config: &AppConfig, collaborators: &Collaborators) -> Result<Container, CompositionError> {
    let container = Container::with_policy(config.container.conflict_policy);
    default_root(config, collaborators).compose(&container)?;
    Ok(container)
}
