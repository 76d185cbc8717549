//! 检索设置服务 - 业务能力层
//!
//! 每个通道独立完成一次检索设置：关闭页面动画、全选学部和学期
//! 筛选项、点击 Search，然后判定检索结果的终态。
//!
//! "无结果提示出现"或"限时内列表容器始终未出现"都是合法终态，
//! 通道据此直接返回空结果，不算故障

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, BrowserError};
use crate::infrastructure::BrowserSession;
use crate::utils::with_retries;

/// 关闭所有 CSS 动画与过渡，消除折叠面板的展开竞态
const DISABLE_ANIMATIONS_JS: &str = r#"
    (() => {
        const css = document.createElement('style');
        css.type = 'text/css';
        css.innerHTML = '* { animation: none !important; transition: none !important; }';
        document.head.appendChild(css);
        return true;
    })()
"#;

/// 点击一个下拉容器内的全部选项，返回点击数量
fn select_all_options_js(container_selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const options = Array.from(document.querySelectorAll('{} app-ttb-option'));
            for (const o of options) {{
                o.scrollIntoView(true);
                o.click();
            }}
            return options.length;
        }})()
        "#,
        container_selector
    )
}

/// 点击文本恰为 Search 的按钮
const CLICK_SEARCH_JS: &str = r#"
    (() => {
        const btn = Array.from(document.querySelectorAll('button'))
            .find(b => b.textContent.trim() === 'Search');
        if (!btn) {
            return false;
        }
        btn.scrollIntoView(true);
        btn.click();
        return true;
    })()
"#;

const NO_RESULTS_PRESENT_JS: &str =
    "document.querySelector('div.alert-info.results-error-info') !== null";
const LISTING_PRESENT_JS: &str = "document.querySelector('app-course') !== null";

/// 检索结果终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 列表容器已出现，可以开始采集
    Results,
    /// 出现无结果提示，或列表容器限时内未出现
    NoResults,
}

/// 检索设置服务
pub struct SearchService {
    control_timeout: Duration,
    result_timeout: Duration,
    no_results_probe: Duration,
    max_retries: usize,
    pause: Duration,
}

impl SearchService {
    /// 从配置创建检索设置服务
    pub fn new(config: &Config) -> Self {
        Self {
            control_timeout: Duration::from_millis(config.page_confirm_timeout_ms),
            result_timeout: Duration::from_millis(config.search_result_timeout_ms),
            no_results_probe: Duration::from_millis(config.no_results_probe_ms),
            max_retries: config.max_interaction_retries,
            pause: Duration::from_millis(config.interaction_pause_ms),
        }
    }

    /// 完成检索设置并判定终态
    pub async fn prepare(&self, session: &BrowserSession) -> Result<SearchOutcome> {
        session.eval(DISABLE_ANIMATIONS_JS).await?;
        debug!("已关闭页面动画");

        self.select_all("#division", "#division-combo-bottom-container", session)
            .await?;
        self.select_all("#session", "#session-combo-bottom-container", session)
            .await?;

        // Search 按钮是关键交互，重试耗尽后让通道失败
        with_retries("点击 Search 按钮", self.max_retries, self.pause, || async {
            let clicked = session.eval_as::<bool>(CLICK_SEARCH_JS).await?;
            if !clicked {
                anyhow::bail!("Search 按钮不存在");
            }
            Ok(())
        })
        .await?;
        info!("🔍 已提交检索");

        self.resolve_outcome(session).await
    }

    /// 等待下拉控件与选项出现，然后全选
    async fn select_all(
        &self,
        control_selector: &str,
        container_selector: &str,
        session: &BrowserSession,
    ) -> Result<()> {
        let control_present = format!("document.querySelector('{}') !== null", control_selector);
        session
            .wait_until(control_selector, &control_present, self.control_timeout)
            .await?;

        let options_present = format!(
            "document.querySelectorAll('{} app-ttb-option').length > 0",
            container_selector
        );
        session
            .wait_until("下拉选项出现", &options_present, self.control_timeout)
            .await?;

        let js = select_all_options_js(container_selector);
        let count = with_retries("全选下拉选项", self.max_retries, self.pause, || async {
            let n: usize = session.eval_as(js.as_str()).await?;
            if n == 0 {
                anyhow::bail!("未找到任何选项");
            }
            Ok(n)
        })
        .await?;
        debug!("{} 已全选 {} 个选项", control_selector, count);

        tokio::time::sleep(self.pause).await;
        Ok(())
    }

    /// 判定检索终态
    ///
    /// 先短暂探测无结果提示，再等待列表容器；两者都未出现
    /// 视为无结果终态而不是故障
    async fn resolve_outcome(&self, session: &BrowserSession) -> Result<SearchOutcome> {
        if wait_for(session, "无结果提示", NO_RESULTS_PRESENT_JS, self.no_results_probe).await? {
            info!("检索无结果");
            return Ok(SearchOutcome::NoResults);
        }

        if wait_for(session, "课程列表容器", LISTING_PRESENT_JS, self.result_timeout).await? {
            return Ok(SearchOutcome::Results);
        }

        info!("限时内未出现课程列表，按无结果处理");
        Ok(SearchOutcome::NoResults)
    }
}

/// 区分"条件未在限时内成立"与会话级失败
async fn wait_for(
    session: &BrowserSession,
    description: &str,
    js_predicate: &str,
    timeout: Duration,
) -> Result<bool> {
    match session.wait_until(description, js_predicate, timeout).await {
        Ok(()) => Ok(true),
        Err(AppError::Browser(BrowserError::WaitTimeout { .. })) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
