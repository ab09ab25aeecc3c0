use std::sync::Arc;

use super::Container;
use crate::domain::ports::PortContract;
use crate::errors::ContainerResult;

/// 交给适配器工厂的解析句柄
///
/// 携带当前的解析链，工厂内部再次解析链上已有的契约时返回
/// `CircularDependency`，而不是等待自己的构造完成。
#[derive(Clone)]
pub struct Resolver {
    container: Container,
    chain: Vec<&'static str>,
}

impl Resolver {
    pub(crate) fn new(container: Container, chain: Vec<&'static str>) -> Self {
        Self { container, chain }
    }

    pub async fn resolve<P: PortContract>(&self) -> ContainerResult<Arc<P::Instance>> {
        self.container
            .resolve_in_chain::<P>(self.chain.clone())
            .await
    }

    /// 从最外层到当前工厂的契约名称
    pub fn chain(&self) -> &[&'static str] {
        &self.chain
    }
}
