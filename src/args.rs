use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portkit - 端口/适配器组合工具
#[derive(Parser, Debug)]
#[command(name = "portkit")]
#[command(about = "Port/adapter composition: inspect, verify and exercise the default composition root")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件路径（默认读取当前目录下的 portkit.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 以 JSON 输出所有已绑定契约的描述
    Describe,
    /// 组合默认绑定并逐个解析端口
    Check {
        /// 只校验组合根，不构造适配器
        #[arg(long)]
        skip_resolve: bool,
    },
    /// 使用内存协作方运行会话与身份流程
    Demo {
        /// 演示账号邮箱
        #[arg(long, default_value = "ada@example.com")]
        email: String,
    },
}
