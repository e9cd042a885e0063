//! vcdnet CLI 应用

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "vcdnet")]
#[command(about = "vCloud vApp 网络配置工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别（RUST_LOG 优先）
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 配置文件路径（默认 ~/.config/vcd/config.toml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// vApp 网络配置
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },
}

#[derive(Subcommand)]
pub enum NetworkAction {
    /// 合并编辑网络配置（隔离模式、父网络）
    SetConfig {
        /// vApp ID
        #[arg(long)]
        vapp: String,

        /// 网络名称
        #[arg(long)]
        network: String,

        /// 隔离模式 (bridged/natRouted/isolated)
        #[arg(long)]
        fence_mode: Option<String>,

        /// 父网络名称
        #[arg(long, requires = "parent_id")]
        parent_name: Option<String>,

        /// 父网络 ID
        #[arg(long, requires = "parent_name")]
        parent_id: Option<String>,
    },

    /// 整体替换为端口转发配置
    SetPortForwarding {
        /// vApp ID
        #[arg(long)]
        vapp: String,

        /// 网络名称
        #[arg(long)]
        network: String,

        /// 父网络 ID
        #[arg(long)]
        parent: String,

        /// 隔离模式 (bridged/natRouted/isolated)
        #[arg(long)]
        fence_mode: Option<String>,

        /// NAT 策略 (allowTraffic/allowTrafficIn)
        #[arg(long)]
        policy: Option<String>,

        /// 转发规则 EXT:VMID:INT[:PROTO[:NIC]]，可重复
        #[arg(long = "rule")]
        rules: Vec<String>,
    },

    /// 列出端口转发规则
    Rules {
        /// vApp ID
        #[arg(long)]
        vapp: String,

        /// 网络名称（缺省取第一个网络）
        #[arg(long)]
        network: Option<String>,

        /// 输出格式 (table/json)
        #[arg(short = 'f', long, default_value = "table")]
        format: String,
    },

    /// 查询边缘设备公网 IP
    EdgeIp {
        /// vApp ID
        #[arg(long)]
        vapp: String,

        /// 网络名称（缺省取第一个网络）
        #[arg(long)]
        network: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，输出到 stderr 以免干扰命令结果
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("vcdnet 启动");

    let config = config::CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Network { action } => commands::network::handle(action, &config).await?,
    }

    Ok(())
}
