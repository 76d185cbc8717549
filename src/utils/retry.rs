//! 统一的有限重试策略
//!
//! 所有非关键页面交互都经过同一个重试入口，而不是在各调用点
//! 散落 try/catch 式的兜底逻辑

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::TransientUiError;

/// 以固定间隔重试一次页面交互
///
/// # 参数
/// - `action`: 交互名称（用于日志和错误信息）
/// - `max_attempts`: 最大尝试次数
/// - `delay`: 两次尝试之间的间隔
/// - `op`: 交互本身，每次调用产生一个新的 future
///
/// # 返回
/// 成功返回交互结果；重试耗尽后返回 `TransientUiError`，
/// 由调用方决定是记录后继续还是向上传播
pub async fn with_retries<T, F, Fut>(
    action: &str,
    max_attempts: usize,
    delay: Duration,
    op: F,
) -> Result<T, TransientUiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    "交互 '{}' 第 {}/{} 次尝试失败: {}",
                    action, attempt, max_attempts, e
                );
                last_error = e.to_string();
                if attempt < max_attempts {
                    sleep(delay).await;
                }
            }
        }
    }

    Err(TransientUiError {
        action: action.to_string(),
        attempts: max_attempts,
        last_error,
    })
}
