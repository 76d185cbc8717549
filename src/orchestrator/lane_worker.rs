//! 单通道采集器 - 编排层
//!
//! ## 职责
//!
//! 本模块驱动一个采集通道走完属于它的全部页面。
//!
//! ## 通道划分
//!
//! N 个通道按页码交错分片：通道 i（0 起）从第 1 页前进 i 页到达
//! 自己的起始页，之后每采完一页就尝试整体前进 N 页（步长），任何
//! 一步发现没有下一页即正常收尾。第 p 页恰好属于通道 `(p-1) mod N`，
//! 不需要任何共享的总页数信息，只靠各通道本地的"有没有下一页"判断。
//!
//! 前提是总页数在一轮采集期间稳定；结果集若被并发增删页，
//! 通道可能少采或多采——数据源按只读短时处理，这是已接受的竞态。
//!
//! ## 每页协议
//!
//! 展开（幂等）→ 快照 → 纯解析。展开失败不会中断页面或通道

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::browser::launch_headless_browser;
use crate::config::Config;
use crate::error::PaginationError;
use crate::infrastructure::BrowserSession;
use crate::models::Course;
use crate::services::{extract_page, PanelExpander, Paginator, SearchOutcome, SearchService};

/// 通道视角下的页面会话能力
///
/// 核心只依赖这四个操作；真实实现由浏览器会话提供，
/// 测试用模拟的分页结果集代替
#[async_trait]
pub trait LaneSession: Send + Sync {
    /// 展开当前页的全部折叠面板（幂等），返回新展开的数量
    async fn expand_panels(&self) -> usize;
    /// 读取当前页渲染后的 HTML 快照
    async fn snapshot(&self) -> Result<String>;
    /// 是否存在可用的下一页控件
    async fn has_next(&self) -> Result<bool>;
    /// 前进一页，翻页确认超时返回 `PaginationError::Timeout`
    async fn advance(&self) -> std::result::Result<(), PaginationError>;
}

/// 真实通道会话：浏览器会话 + 面板展开 + 翻页
pub struct CatalogLane<'a> {
    session: &'a BrowserSession,
    expander: PanelExpander,
    paginator: Paginator,
}

impl<'a> CatalogLane<'a> {
    /// 从配置组装真实通道会话
    pub fn new(session: &'a BrowserSession, config: &Config) -> Self {
        Self {
            session,
            expander: PanelExpander::new(
                config.max_interaction_retries,
                Duration::from_millis(config.interaction_pause_ms),
            ),
            paginator: Paginator::new(config),
        }
    }
}

#[async_trait]
impl LaneSession for CatalogLane<'_> {
    async fn expand_panels(&self) -> usize {
        self.expander.expand_all(self.session).await
    }

    async fn snapshot(&self) -> Result<String> {
        Ok(self.session.html().await?)
    }

    async fn has_next(&self) -> Result<bool> {
        self.paginator.has_next(self.session).await
    }

    async fn advance(&self) -> std::result::Result<(), PaginationError> {
        self.paginator.advance(self.session).await
    }
}

/// 驱动一个通道走完自己的页面分片
///
/// 起始页超出末页的通道不采任何页，立即返回空；
/// 步长推进途中超时视为到达末页，通道带着已采数据正常收尾
pub async fn harvest_lane<S: LaneSession>(
    driver: &S,
    lane_index: usize,
    lane_count: usize,
) -> Result<Vec<Course>> {
    // 前进到本通道的起始页（第 lane_index + 1 页）
    for _ in 0..lane_index {
        if !driver.has_next().await? {
            info!("[通道 {}] 起始页超出末页，本通道无页可采", lane_index);
            return Ok(Vec::new());
        }
        if let Err(e) = driver.advance().await {
            info!("[通道 {}] 就位途中视为到达末页: {}", lane_index, e);
            return Ok(Vec::new());
        }
    }

    let mut courses = Vec::new();
    let mut page_in_lane = 0usize;

    loop {
        driver.expand_panels().await;
        let html = driver.snapshot().await?;
        let page_courses = extract_page(&html);
        page_in_lane += 1;
        info!(
            "[通道 {}] 第 {} 个分片页采到 {} 门课程",
            lane_index,
            page_in_lane,
            page_courses.len()
        );
        courses.extend(page_courses);

        if !advance_stride(driver, lane_count, lane_index).await? {
            break;
        }
    }

    Ok(courses)
}

/// 整体前进一个步长（lane_count 页）
///
/// 任何一步没有下一页或翻页失败都返回 false，表示通道应当收尾
async fn advance_stride<S: LaneSession>(
    driver: &S,
    stride: usize,
    lane_index: usize,
) -> Result<bool> {
    for _ in 0..stride {
        if !driver.has_next().await? {
            return Ok(false);
        }
        if let Err(e) = driver.advance().await {
            info!("[通道 {}] 步长推进中视为到达末页: {}", lane_index, e);
            return Ok(false);
        }
    }
    Ok(true)
}

/// 运行一个真实通道：独占浏览器、检索设置、走完分片
///
/// "无结果"终态直接返回空结果，不算故障；
/// 任何未恢复的错误向上交给协调器计入部分失败报告
pub async fn process_lane(lane_index: usize, config: Config) -> Result<Vec<Course>> {
    info!("[通道 {}] 启动", lane_index);

    let (mut browser, page) = launch_headless_browser(&config, &config.target_url).await?;
    let session = BrowserSession::new(page);

    let result = run_lane(&session, lane_index, &config).await;

    // 无论成败都释放浏览器进程
    if let Err(e) = browser.close().await {
        warn!("[通道 {}] 关闭浏览器失败: {}", lane_index, e);
    }
    let _ = browser.wait().await;

    match &result {
        Ok(courses) => info!("[通道 {}] ✅ 完成，共 {} 门课程", lane_index, courses.len()),
        Err(e) => error!("[通道 {}] ❌ 通道失败: {}", lane_index, e),
    }

    result
}

async fn run_lane(
    session: &BrowserSession,
    lane_index: usize,
    config: &Config,
) -> Result<Vec<Course>> {
    let search = SearchService::new(config);
    if search.prepare(session).await? == SearchOutcome::NoResults {
        info!("[通道 {}] 检索无结果，返回空集", lane_index);
        return Ok(Vec::new());
    }

    let lane = CatalogLane::new(session, config);
    harvest_lane(&lane, lane_index, config.lane_count).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 模拟的分页结果集：第 p 页恰好包含一门课程 C{p}
    struct SimulatedLane {
        total_pages: usize,
        pos: Mutex<usize>,
        visited: Mutex<Vec<usize>>,
        /// 从该页前进时翻页确认超时
        timeout_when_leaving: Option<usize>,
    }

    impl SimulatedLane {
        fn new(total_pages: usize) -> Self {
            Self {
                total_pages,
                pos: Mutex::new(1),
                visited: Mutex::new(Vec::new()),
                timeout_when_leaving: None,
            }
        }

        fn with_timeout_leaving(total_pages: usize, page: usize) -> Self {
            Self {
                timeout_when_leaving: Some(page),
                ..Self::new(total_pages)
            }
        }

        fn visited(&self) -> Vec<usize> {
            self.visited.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LaneSession for SimulatedLane {
        async fn expand_panels(&self) -> usize {
            0
        }

        async fn snapshot(&self) -> Result<String> {
            let pos = *self.pos.lock().unwrap();
            if self.total_pages == 0 {
                return Ok("<html><body></body></html>".to_string());
            }
            self.visited.lock().unwrap().push(pos);
            Ok(format!(
                r#"<html><body><app-course>
                     <button class="accordion-button"><span>C{}</span></button>
                   </app-course></body></html>"#,
                pos
            ))
        }

        async fn has_next(&self) -> Result<bool> {
            Ok(*self.pos.lock().unwrap() < self.total_pages)
        }

        async fn advance(&self) -> std::result::Result<(), PaginationError> {
            let mut pos = self.pos.lock().unwrap();
            // 契约：has_next 为 false 时不允许调用 advance
            assert!(*pos < self.total_pages, "advance called with no next page");
            if self.timeout_when_leaving == Some(*pos) {
                return Err(PaginationError::Timeout { waited_ms: 10_000 });
            }
            *pos += 1;
            Ok(())
        }
    }

    fn code_titles(courses: &[Course]) -> Vec<String> {
        courses.iter().map(|c| c.code_title.clone()).collect()
    }

    #[tokio::test]
    async fn test_three_lanes_cover_seven_pages_exactly_once() {
        let mut merged = Vec::new();
        let mut all_visited = Vec::new();

        for lane_index in 0..3 {
            let sim = SimulatedLane::new(7);
            let courses = harvest_lane(&sim, lane_index, 3).await.unwrap();
            all_visited.push(sim.visited());
            merged.extend(courses);
        }

        assert_eq!(all_visited[0], vec![1, 4, 7]);
        assert_eq!(all_visited[1], vec![2, 5]);
        assert_eq!(all_visited[2], vec![3, 6]);

        // 通道序拼接：通道内保持页序，页间无全局排序要求
        assert_eq!(
            code_titles(&merged),
            vec!["C1", "C4", "C7", "C2", "C5", "C3", "C6"]
        );

        // 每页恰被采集一次，无重复无遗漏
        let mut union: Vec<usize> = all_visited.into_iter().flatten().collect();
        union.sort_unstable();
        assert_eq!(union, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_single_lane_visits_every_page_in_order() {
        let sim = SimulatedLane::new(4);
        let courses = harvest_lane(&sim, 0, 1).await.unwrap();

        assert_eq!(sim.visited(), vec![1, 2, 3, 4]);
        assert_eq!(code_titles(&courses), vec!["C1", "C2", "C3", "C4"]);
    }

    #[tokio::test]
    async fn test_lanes_beyond_last_page_visit_nothing() {
        // 5 个通道对 3 页：通道 3、4 起始页超出末页
        for lane_index in 3..5 {
            let sim = SimulatedLane::new(3);
            let courses = harvest_lane(&sim, lane_index, 5).await.unwrap();
            assert!(courses.is_empty());
            assert!(sim.visited().is_empty());
        }
    }

    #[tokio::test]
    async fn test_lane_terminates_without_error_on_last_page() {
        // 通道 2（共 3 通道）在第 6 页后步长推进发现无下一页，正常收尾
        let sim = SimulatedLane::new(6);
        let courses = harvest_lane(&sim, 2, 3).await.unwrap();

        assert_eq!(sim.visited(), vec![3, 6]);
        assert_eq!(code_titles(&courses), vec!["C3", "C6"]);
    }

    #[tokio::test]
    async fn test_advance_timeout_ends_lane_with_collected_data() {
        // 从第 5 页离开时确认超时：通道 0 已采 1、4，带着数据收尾
        let sim = SimulatedLane::with_timeout_leaving(10, 5);
        let courses = harvest_lane(&sim, 0, 3).await.unwrap();

        assert_eq!(sim.visited(), vec![1, 4]);
        assert_eq!(code_titles(&courses), vec!["C1", "C4"]);
    }

    #[tokio::test]
    async fn test_timeout_during_positioning_yields_empty_lane() {
        let sim = SimulatedLane::with_timeout_leaving(10, 1);
        let courses = harvest_lane(&sim, 2, 3).await.unwrap();

        assert!(courses.is_empty());
        assert!(sim.visited().is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_yields_no_courses() {
        let sim = SimulatedLane::new(0);
        let courses = harvest_lane(&sim, 0, 3).await.unwrap();
        assert!(courses.is_empty());
    }
}
