//! CLI 命令处理模块

pub mod network; // vApp 网络配置
pub mod output; // 输出格式化
