//! 端口契约定义
//!
//! 端口是面向调用方的接口，与任何具体实现无关。每个端口由两部分组成：
//! - 一个 `Send + Sync` 的 trait（调用方持有的 `Arc<dyn Trait>`）
//! - 一个实现了 [`PortContract`] 的标记类型，给出契约名称和操作签名
//!
//! 容器以契约名称为键完成绑定与解析，调用方只依赖这里的类型。

use serde::Serialize;

pub mod email;
pub mod identity;
pub mod session;
pub mod user_repository;

pub use email::{EmailContract, EmailPort};
pub use identity::{IdentityContract, IdentityPort};
pub use session::{SessionContract, SessionPort};
pub use user_repository::{UserRepositoryContract, UserRepositoryPort};

/// 单个操作的签名（名称、参数形状、结果形状）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSignature {
    pub name: &'static str,
    pub input: &'static str,
    pub output: &'static str,
}

impl OperationSignature {
    pub const fn new(name: &'static str, input: &'static str, output: &'static str) -> Self {
        Self {
            name,
            input,
            output,
        }
    }
}

/// 端口契约
///
/// 声明后不可变。`Instance` 通常是 `dyn SomePort`，容器解析出的实例类型为
/// `Arc<Self::Instance>`。
pub trait PortContract: 'static {
    /// 调用方拿到的实例类型
    type Instance: ?Sized + Send + Sync + 'static;

    /// 全局唯一的契约名称
    const NAME: &'static str;

    /// 有序的操作签名列表
    const OPERATIONS: &'static [OperationSignature];

    fn descriptor() -> ContractDescriptor {
        ContractDescriptor {
            name: Self::NAME,
            operations: Self::OPERATIONS,
        }
    }
}

/// 可序列化的契约描述，用于自省输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractDescriptor {
    pub name: &'static str,
    pub operations: &'static [OperationSignature],
}

impl ContractDescriptor {
    pub fn operation(&self, name: &str) -> Option<&OperationSignature> {
        self.operations.iter().find(|op| op.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_names_are_unique() {
        let names = [
            SessionContract::NAME,
            IdentityContract::NAME,
            UserRepositoryContract::NAME,
            EmailContract::NAME,
        ];
        let mut deduped = names.to_vec();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn test_narrow_and_rich_ports_share_the_mechanism() {
        let narrow = SessionContract::descriptor();
        let rich = IdentityContract::descriptor();

        assert_eq!(narrow.operations.len(), 2);
        assert_eq!(rich.operations.len(), 6);
        assert_eq!(
            rich.operation("sign_in").map(|op| op.input),
            Some("Credentials")
        );
        assert!(narrow.operation("sign_in").is_none());
    }

    #[test]
    fn test_descriptor_serializes_operations_in_order() {
        let json = serde_json::to_value(SessionContract::descriptor()).unwrap();
        assert_eq!(json["name"], "session");
        assert_eq!(json["operations"][0]["name"], "login");
        assert_eq!(json["operations"][1]["name"], "logout");
    }
}
