//! 异步任务 ID 提取
//!
//! 接受修改请求后，服务端在 `Location` 头中返回任务地址，
//! 形如 `https://vcd.example.com/api/task/<id>`。调用方拿到 ID 后自行轮询。

use vcd_transport::TransportResponse;

use crate::error::{Result, VAppNetError};

const TASK_MARKER: &str = "task/";

/// 去掉最后一个 `task/` 及其之前的全部内容，剩余部分即任务 ID
pub fn extract_task_id(location: &str) -> Option<&str> {
    let start = location.rfind(TASK_MARKER)? + TASK_MARKER.len();
    let id = &location[start..];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// 从响应的 `Location` 头中提取任务 ID
pub fn task_id_from_response(response: &TransportResponse) -> Result<String> {
    let location = response.location().ok_or(VAppNetError::MissingTaskLocation)?;
    extract_task_id(location)
        .map(str::to_string)
        .ok_or_else(|| VAppNetError::InvalidTaskLocation(location.to_string()))
}
