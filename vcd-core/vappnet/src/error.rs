//! vApp 网络配置错误定义

use thiserror::Error;
use vcd_transport::TransportError;

use crate::models::StateCheck;

/// vApp 网络配置错误类型
#[derive(Error, Debug)]
pub enum VAppNetError {
    /// 指定名称的网络配置不存在
    #[error("网络 {0} 不存在")]
    NetworkNotFound(String),

    /// 状态前置条件不满足
    #[error("请求无效: {check} 必须为 {expected}，当前为 \"{actual}\"")]
    InvalidState {
        check: StateCheck,
        expected: &'static str,
        actual: String,
    },

    /// 文档缺少必须修改或读取的节点
    #[error("配置文档缺少节点: {0}")]
    MissingElement(String),

    /// 响应缺少 Location 头
    #[error("响应缺少 Location 头，无法获取任务 ID")]
    MissingTaskLocation,

    /// Location 头中没有任务标识
    #[error("Location 头中未找到任务 ID: {0}")]
    InvalidTaskLocation(String),

    /// 响应没有返回文档
    #[error("响应为空: {0}")]
    EmptyResponse(String),

    /// 未知的枚举取值
    #[error("无效的 {kind} 取值: {value}")]
    InvalidValue { kind: &'static str, value: String },

    /// 传输层错误（原样透传）
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// vApp 网络配置结果类型
pub type Result<T> = std::result::Result<T, VAppNetError>;
