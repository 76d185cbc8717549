//! 翻页服务 - 业务能力层
//!
//! 只负责"是否有下一页"与"前进一页"两个原语，不关心通道逻辑。
//!
//! "下一页"的唯一判定标准：文本恰为 `Next` 的 `a.page-link`，
//! 且不在 `li.disabled` 祖先之内。"结果已到末尾"与"控件暂时禁用"
//! 在这个判定下不可区分，统一视为没有下一页

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, BrowserError, PaginationError};
use crate::infrastructure::BrowserSession;
use crate::utils::with_retries;

/// 判断可用的 Next 控件是否存在
const HAS_NEXT_JS: &str = r#"
    (() => {
        const links = Array.from(document.querySelectorAll('a.page-link'))
            .filter(a => a.textContent.trim() === 'Next' && !a.closest('li.disabled'));
        return links.length > 0;
    })()
"#;

/// 点击 Next 控件，控件缺失时返回 false
const CLICK_NEXT_JS: &str = r#"
    (() => {
        const links = Array.from(document.querySelectorAll('a.page-link'))
            .filter(a => a.textContent.trim() === 'Next' && !a.closest('li.disabled'));
        if (links.length === 0) {
            return false;
        }
        links[0].scrollIntoView(true);
        links[0].click();
        return true;
    })()
"#;

/// 新页面的列表容器出现即视为翻页完成
const LISTING_PRESENT_JS: &str = "document.querySelector('app-course') !== null";

/// 翻页服务
pub struct Paginator {
    confirm_timeout: Duration,
    max_retries: usize,
    pause: Duration,
}

impl Paginator {
    /// 从配置创建翻页服务
    pub fn new(config: &Config) -> Self {
        Self {
            confirm_timeout: Duration::from_millis(config.page_confirm_timeout_ms),
            max_retries: config.max_interaction_retries,
            pause: Duration::from_millis(config.interaction_pause_ms),
        }
    }

    /// 是否存在可用的下一页控件
    pub async fn has_next(&self, session: &BrowserSession) -> anyhow::Result<bool> {
        let has_next = session.eval_as::<bool>(HAS_NEXT_JS).await?;
        debug!("下一页控件: {}", if has_next { "可用" } else { "不存在或已禁用" });
        Ok(has_next)
    }

    /// 前进一页
    ///
    /// 点击后阻塞等待新页面的列表容器出现；限时内未确认则返回
    /// `PaginationError::Timeout`，绝不静默停留在旧页面上。
    ///
    /// 约定：在 `has_next()` 为 false 时调用属于调用方错误
    pub async fn advance(&self, session: &BrowserSession) -> Result<(), PaginationError> {
        // 点击本身走统一重试策略
        let click = with_retries("点击下一页", self.max_retries, self.pause, || async {
            let clicked = session.eval_as::<bool>(CLICK_NEXT_JS).await?;
            if !clicked {
                anyhow::bail!("Next 控件不存在或已禁用");
            }
            Ok(())
        })
        .await;

        if let Err(e) = click {
            return Err(PaginationError::ClickFailed { attempts: e.attempts });
        }

        // 页面渲染有短暂空窗，先让出一个交互间隔再开始确认
        tokio::time::sleep(self.pause).await;

        match session
            .wait_until("翻页后列表容器出现", LISTING_PRESENT_JS, self.confirm_timeout)
            .await
        {
            Ok(()) => Ok(()),
            Err(AppError::Browser(BrowserError::WaitTimeout { waited_ms, .. })) => {
                Err(PaginationError::Timeout { waited_ms })
            }
            // 确认阶段的会话级失败同样意味着拿不到新页面
            Err(_) => Err(PaginationError::Timeout {
                waited_ms: self.confirm_timeout.as_millis() as u64,
            }),
        }
    }
}
