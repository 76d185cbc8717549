//! 浏览器会话 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露能力：导航、执行 JS、
//! 条件等待、读取渲染后的 HTML

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{AppResult, BrowserError};

/// 条件等待的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 浏览器会话
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() / wait_until() / html() 能力
/// - 不认识 Course / Section
/// - 不处理业务流程
pub struct BrowserSession {
    page: Page,
}

impl BrowserSession {
    /// 创建新的浏览器会话
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定 URL
    pub async fn navigate(&self, url: &str) -> AppResult<()> {
        self.page.goto(url).await.map_err(|e| {
            crate::error::AppError::Browser(BrowserError::NavigationFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 轮询等待页面条件成立
    ///
    /// `js_predicate` 必须是求值为布尔的 JS 表达式；
    /// 超出限时仍不成立则返回 `BrowserError::WaitTimeout`，
    /// 任何等待都有显式上限，不会无限阻塞
    pub async fn wait_until(
        &self,
        description: &str,
        js_predicate: &str,
        timeout: Duration,
    ) -> AppResult<()> {
        let started = Instant::now();
        loop {
            if self.eval_as::<bool>(js_predicate).await? {
                debug!("条件成立: {}", description);
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(crate::error::AppError::Browser(BrowserError::WaitTimeout {
                    description: description.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                }));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 读取当前渲染后的完整 HTML
    pub async fn html(&self) -> AppResult<String> {
        let content = self.page.content().await?;
        Ok(content)
    }
}
