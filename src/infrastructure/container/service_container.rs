use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error, info, warn};

use super::registration::{AdapterRegistration, ErasedInstance};
use super::wait_graph::WaitGraph;
use super::{ConflictPolicy, Lifecycle, Resolver};
use crate::domain::ports::{ContractDescriptor, PortContract};
use crate::errors::{ContainerError, ContainerResult};

type Construction = Shared<BoxFuture<'static, Result<ErasedInstance, ContainerError>>>;

/// 单例槽位：要么正在构造，要么已经就绪
#[derive(Clone)]
enum Slot {
    /// 正在构造，后到的解析者等待同一个 future
    Constructing { id: u64, construction: Construction },
    Ready(ErasedInstance),
}

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    in_flight_joins: AtomicU64,
    factory_invocations: AtomicU64,
    construction_failures: AtomicU64,
}

struct Inner {
    /// 契约名称 -> 注册信息
    registrations: DashMap<&'static str, Arc<AdapterRegistration>>,
    /// 契约名称 -> 单例槽位，首次解析时填充
    slots: DashMap<&'static str, Slot>,
    conflict_policy: ConflictPolicy,
    next_construction_id: AtomicU64,
    /// 工厂之间跨任务的等待关系
    waits: WaitGraph,
    stats: InnerStats,
}

/// 一条等待边，离开作用域（包括取消和 panic）时撤销
struct WaitGuard {
    container: Container,
    waiter: &'static str,
    target: &'static str,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.container.inner.waits.leave(self.waiter, self.target);
    }
}

/// 服务容器
///
/// 克隆代价很低，所有克隆共享同一份注册表和单例缓存。由组合根的调用方创建，
/// 再按引用或克隆传给需要解析端口的代码。
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// 创建新的容器实例，重复注册时后者覆盖前者
    pub fn new() -> Self {
        Self::with_policy(ConflictPolicy::default())
    }

    pub fn with_policy(conflict_policy: ConflictPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                registrations: DashMap::new(),
                slots: DashMap::new(),
                conflict_policy,
                next_construction_id: AtomicU64::new(0),
                waits: WaitGraph::default(),
                stats: InnerStats::default(),
            }),
        }
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.inner.conflict_policy
    }

    /// 注册适配器工厂
    pub fn register<P, F, Fut>(&self, factory: F, lifecycle: Lifecycle) -> ContainerResult<()>
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        self.register_with(AdapterRegistration::new::<P, F, Fut>(factory, lifecycle))
    }

    pub fn register_singleton<P, F, Fut>(&self, factory: F) -> ContainerResult<()>
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        self.register::<P, F, Fut>(factory, Lifecycle::Singleton)
    }

    pub fn register_transient<P, F, Fut>(&self, factory: F) -> ContainerResult<()>
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        self.register::<P, F, Fut>(factory, Lifecycle::Transient)
    }

    /// 按冲突策略添加绑定
    pub fn register_with(&self, registration: AdapterRegistration) -> ContainerResult<()> {
        self.register_with_policy(registration, self.inner.conflict_policy)
    }

    pub(crate) fn register_with_policy(
        &self,
        registration: AdapterRegistration,
        policy: ConflictPolicy,
    ) -> ContainerResult<()> {
        let contract = registration.contract();
        let lifecycle = registration.lifecycle();

        let replaced = match self.inner.registrations.entry(contract) {
            Entry::Occupied(mut entry) => match policy {
                ConflictPolicy::Reject => {
                    return Err(ContainerError::DuplicateRegistration {
                        contract: contract.to_string(),
                    });
                }
                ConflictPolicy::Replace => {
                    entry.insert(Arc::new(registration));
                    true
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(registration));
                false
            }
        };

        if replaced {
            // 旧适配器构造出的实例不能再被解析到
            self.inner.slots.remove(contract);
            warn!(contract, ?lifecycle, "Contract registered twice, last registration wins");
        } else {
            debug!(contract, ?lifecycle, "Registered adapter");
        }
        Ok(())
    }

    /// 解析端口
    pub async fn resolve<P: PortContract>(&self) -> ContainerResult<Arc<P::Instance>> {
        self.resolve_in_chain::<P>(Vec::new()).await
    }

    pub(crate) async fn resolve_in_chain<P: PortContract>(
        &self,
        chain: Vec<&'static str>,
    ) -> ContainerResult<Arc<P::Instance>> {
        self.inner
            .stats
            .total_resolutions
            .fetch_add(1, Ordering::Relaxed);

        if chain.contains(&P::NAME) {
            let mut cycle: Vec<String> = chain.iter().map(|name| name.to_string()).collect();
            cycle.push(P::NAME.to_string());
            return Err(ContainerError::CircularDependency { chain: cycle });
        }

        let registration = self
            .inner
            .registrations
            .get(P::NAME)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ContainerError::UnregisteredContract {
                contract: P::NAME.to_string(),
            })?;

        let expected = std::any::type_name::<P::Instance>();
        if registration.instance_type() != std::any::TypeId::of::<Arc<P::Instance>>() {
            warn!(
                contract = P::NAME,
                expected,
                registered = registration.instance_type_name(),
                "Contract resolved with a different instance type"
            );
            return Err(ContainerError::TypeMismatch {
                contract: P::NAME.to_string(),
                expected,
            });
        }

        let _wait = self.enter_wait(&chain, P::NAME)?;

        let instance = match registration.lifecycle() {
            Lifecycle::Transient => self.construct(registration, chain).await?,
            Lifecycle::Singleton => self.resolve_singleton(registration, chain).await?,
        };

        instance
            .downcast_ref::<Arc<P::Instance>>()
            .cloned()
            .ok_or_else(|| ContainerError::TypeMismatch {
                contract: P::NAME.to_string(),
                expected,
            })
    }

    /// 工厂内部的解析要先登记等待关系，若会与其他任务的构造互相等待则立即失败
    fn enter_wait(
        &self,
        chain: &[&'static str],
        target: &'static str,
    ) -> ContainerResult<Option<WaitGuard>> {
        let Some(&waiter) = chain.last() else {
            return Ok(None);
        };

        self.inner
            .waits
            .enter(waiter, target, chain)
            .map_err(|cycle| {
                warn!(waiter, target, "Adapters are waiting on each other across tasks");
                ContainerError::CircularDependency {
                    chain: cycle.into_iter().map(str::to_string).collect(),
                }
            })?;

        Ok(Some(WaitGuard {
            container: self.clone(),
            waiter,
            target,
        }))
    }

    async fn resolve_singleton(
        &self,
        registration: Arc<AdapterRegistration>,
        chain: Vec<&'static str>,
    ) -> Result<ErasedInstance, ContainerError> {
        let contract = registration.contract();
        let stats = &self.inner.stats;

        let (id, construction) = match self.inner.slots.entry(contract) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(instance) => {
                    stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(instance));
                }
                Slot::Constructing { id, construction } => {
                    stats.in_flight_joins.fetch_add(1, Ordering::Relaxed);
                    (*id, construction.clone())
                }
            },
            Entry::Vacant(entry) => {
                stats.cache_misses.fetch_add(1, Ordering::Relaxed);
                let id = self
                    .inner
                    .next_construction_id
                    .fetch_add(1, Ordering::Relaxed);
                let container = self.clone();
                let construction = async move { container.construct(registration, chain).await }
                    .boxed()
                    .shared();
                entry.insert(Slot::Constructing {
                    id,
                    construction: construction.clone(),
                });
                (id, construction)
            }
        };

        let outcome = construction.await;
        self.settle(contract, id, &outcome);
        outcome
    }

    /// 构造结束后更新槽位
    ///
    /// 只有槽位仍指向同一次构造时才更新；`reset` 或重新注册之后完成的构造不会写回缓存。
    /// 失败时清除标记，下一次解析会重新构造。
    fn settle(&self, contract: &'static str, id: u64, outcome: &Result<ErasedInstance, ContainerError>) {
        if let Entry::Occupied(mut entry) = self.inner.slots.entry(contract) {
            let current = matches!(entry.get(), Slot::Constructing { id: current, .. } if *current == id);
            if !current {
                return;
            }
            match outcome {
                Ok(instance) => {
                    entry.insert(Slot::Ready(Arc::clone(instance)));
                }
                Err(_) => {
                    entry.remove();
                }
            }
        }
    }

    async fn construct(
        &self,
        registration: Arc<AdapterRegistration>,
        mut chain: Vec<&'static str>,
    ) -> Result<ErasedInstance, ContainerError> {
        let contract = registration.contract();
        chain.push(contract);
        let resolver = Resolver::new(self.clone(), chain);

        self.inner
            .stats
            .factory_invocations
            .fetch_add(1, Ordering::Relaxed);
        debug!(contract, lifecycle = ?registration.lifecycle(), "Constructing adapter");

        let invocation = {
            let registration = Arc::clone(&registration);
            async move { registration.invoke(resolver).await }
        };
        // panic 也要变成构造失败，否则共享的构造会一直停在进行中
        let outcome = match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(anyhow::anyhow!(
                "adapter factory panicked: {}",
                panic_message(&*panic)
            )),
        };

        match outcome {
            Ok(instance) => {
                debug!(contract, "Adapter constructed");
                Ok(instance)
            }
            Err(err) => {
                self.inner
                    .stats
                    .construction_failures
                    .fetch_add(1, Ordering::Relaxed);
                let message = format!("{err:#}");
                error!(contract, error = %message, "Adapter construction failed");
                Err(match err.downcast::<ContainerError>() {
                    Ok(cycle @ ContainerError::CircularDependency { .. }) => cycle,
                    Ok(other) => ContainerError::construction_failed(contract, other.into()),
                    Err(err) => ContainerError::construction_failed(contract, err),
                })
            }
        }
    }

    /// 清空全部注册和缓存实例，用于隔离测试
    pub fn reset(&self) {
        let registrations = self.inner.registrations.len();
        self.inner.registrations.clear();
        self.inner.slots.clear();
        info!(registrations, "Container reset");
    }

    pub fn is_registered(&self, contract: &str) -> bool {
        self.inner.registrations.contains_key(contract)
    }

    /// 已注册的契约名称（排序后）
    pub fn registered_contracts(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .inner
            .registrations
            .iter()
            .map(|entry| *entry.key())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn descriptors(&self) -> Vec<ContractDescriptor> {
        let mut descriptors: Vec<ContractDescriptor> = self
            .inner
            .registrations
            .iter()
            .map(|entry| entry.value().descriptor())
            .collect();
        descriptors.sort_unstable_by_key(|descriptor| descriptor.name);
        descriptors
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let stats = &self.inner.stats;
        ContainerStats {
            total_resolutions: stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: stats.cache_misses.load(Ordering::Relaxed),
            in_flight_joins: stats.in_flight_joins.load(Ordering::Relaxed),
            factory_invocations: stats.factory_invocations.load(Ordering::Relaxed),
            construction_failures: stats.construction_failures.load(Ordering::Relaxed),
            registered_contracts: self.inner.registrations.len(),
            active_singletons: self
                .inner
                .slots
                .iter()
                .filter(|entry| matches!(entry.value(), Slot::Ready(_)))
                .count(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("contracts", &self.registered_contracts())
            .field("conflict_policy", &self.inner.conflict_policy)
            .finish()
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: u64,
    /// 单例缓存命中次数
    pub cache_hits: u64,
    /// 单例缓存未命中（开始一次新构造）次数
    pub cache_misses: u64,
    /// 加入进行中构造的次数
    pub in_flight_joins: u64,
    pub factory_invocations: u64,
    pub construction_failures: u64,
    pub registered_contracts: usize,
    pub active_singletons: usize,
}

impl ContainerStats {
    /// 单例缓存命中率（小数形式）
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses + self.in_flight_joins;
        if total == 0 {
            0.0
        } else {
            (self.cache_hits + self.in_flight_joins) as f64 / total as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Container: {} resolutions, {:.1}% singleton hit rate, {} factory invocations, {} registered contracts, {} active singletons",
            self.total_resolutions,
            self.hit_rate() * 100.0,
            self.factory_invocations,
            self.registered_contracts,
            self.active_singletons
        )
    }
}
