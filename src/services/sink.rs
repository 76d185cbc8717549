//! 结果落盘服务 - 业务能力层
//!
//! 只负责"把一批课程写成 JSON 文件"能力，不关心流程。
//! 对核心而言这是不透明的收纳端：收下一批完成的记录

use std::fs;

use tracing::info;

use crate::error::{AppResult, FileError};
use crate::models::Course;

/// JSON 落盘服务
pub struct JsonSink {
    path: String,
}

impl JsonSink {
    /// 创建落盘服务
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// 将合并后的课程序列写为 JSON 数组
    ///
    /// 缺失的可选字段省略 key（见模型的 serde 标注），与页面
    /// 采集时的"字段不可用"语义保持一致
    pub fn write(&self, courses: &[Course]) -> AppResult<()> {
        let json = serde_json::to_string_pretty(courses)?;

        fs::write(&self.path, json).map_err(|e| {
            crate::error::AppError::File(FileError::WriteFailed {
                path: self.path.clone(),
                source: Box::new(e),
            })
        })?;

        info!("💾 已写入 {} 门课程到 {}", courses.len(), self.path);
        Ok(())
    }
}
