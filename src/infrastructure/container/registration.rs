use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use super::{Lifecycle, Resolver};
use crate::domain::ports::{ContractDescriptor, PortContract};

pub(crate) type ErasedInstance = Arc<dyn Any + Send + Sync>;
pub(crate) type ErasedFactory =
    Arc<dyn Fn(Resolver) -> BoxFuture<'static, anyhow::Result<ErasedInstance>> + Send + Sync>;

/// 适配器注册信息
///
/// 由组合根创建后交给容器，之后归容器独占。
pub struct AdapterRegistration {
    descriptor: ContractDescriptor,
    lifecycle: Lifecycle,
    depends_on: Vec<&'static str>,
    instance_type: TypeId,
    instance_type_name: &'static str,
    factory: ErasedFactory,
}

impl AdapterRegistration {
    /// 为契约 `P` 创建注册信息
    ///
    /// 工厂在解析时才会被调用，并拿到一个 [`Resolver`] 用来解析它依赖的其他端口。
    pub fn new<P, F, Fut>(factory: F, lifecycle: Lifecycle) -> Self
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        let factory: ErasedFactory = Arc::new(move |resolver: Resolver| {
            let construction = factory(resolver);
            async move {
                let instance = construction.await?;
                Ok(Arc::new(instance) as ErasedInstance)
            }
            .boxed()
        });

        Self {
            descriptor: P::descriptor(),
            lifecycle,
            depends_on: Vec::new(),
            instance_type: TypeId::of::<Arc<P::Instance>>(),
            instance_type_name: std::any::type_name::<P::Instance>(),
            factory,
        }
    }

    pub fn singleton<P, F, Fut>(factory: F) -> Self
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        Self::new::<P, F, Fut>(factory, Lifecycle::Singleton)
    }

    pub fn transient<P, F, Fut>(factory: F) -> Self
    where
        P: PortContract,
        F: Fn(Resolver) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<P::Instance>>> + Send + 'static,
    {
        Self::new::<P, F, Fut>(factory, Lifecycle::Transient)
    }

    /// 声明工厂会解析契约 `D`，组合根据此检查顺序和环
    pub fn depends_on<D: PortContract>(mut self) -> Self {
        if !self.depends_on.contains(&D::NAME) {
            self.depends_on.push(D::NAME);
        }
        self
    }

    pub fn contract(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> ContractDescriptor {
        self.descriptor
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn dependencies(&self) -> &[&'static str] {
        &self.depends_on
    }

    pub(crate) fn instance_type(&self) -> TypeId {
        self.instance_type
    }

    pub(crate) fn instance_type_name(&self) -> &'static str {
        self.instance_type_name
    }

    pub(crate) fn invoke(&self, resolver: Resolver) -> BoxFuture<'static, anyhow::Result<ErasedInstance>> {
        (self.factory)(resolver)
    }
}

impl fmt::Debug for AdapterRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistration")
            .field("contract", &self.descriptor.name)
            .field("lifecycle", &self.lifecycle)
            .field("depends_on", &self.depends_on)
            .field("instance_type", &self.instance_type_name)
            .finish()
    }
}
