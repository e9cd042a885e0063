//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式

use anyhow::{bail, Result};
use serde::Serialize;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => bail!("不支持的输出格式: {} (可选 table/json)", other),
        }
    }
}

/// 渲染表格文本
pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers = T::headers();

    let header_line: String = headers
        .iter()
        .map(|h| format!("{:<20}", h))
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![header_line.trim_end().to_string(), "-".repeat(header_line.len())];
    for item in items {
        let row_line: String = item
            .row()
            .iter()
            .map(|c| format!("{:<20}", c))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(row_line.trim_end().to_string());
    }

    lines.join("\n")
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[T]) {
    println!("{}", render_table(items));
}

/// JSON 格式输出
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
