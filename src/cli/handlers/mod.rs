//! portkit 命令处理器模块
//!
//! 每个子命令对应一个处理器模块。

pub mod check;
pub mod demo;
pub mod describe;

/// 命令处理器的通用结果类型
pub type HandlerResult<T> = std::result::Result<T, portkit::AppError>;
