//! 采集协调器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责通道的并发调度与结果合并。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载配置、记录启动信息
//! 2. **并发调度**：为每个通道 tokio::spawn 一个任务，一通道一浏览器
//! 3. **结果合并**：各通道持有私有结果序列，join 后按通道序拼接一次，
//!    采集热路径上没有任何共享锁
//! 4. **失败隔离**：单个通道出错或 panic 只计入部分失败报告，
//!    其余通道的数据照常返回
//! 5. **落盘**：合并结果交给 JSON 收纳端
//!
//! ## 设计特点
//!
//! - 一次运行总会产出结果（可能是部分或空数据集），绝不因单个
//!   通道的故障放弃整次采集
//! - 通道失败与"检索无结果"在日志里明确区分，便于运维判断
//!   是"没东西可采"还是"采集坏了"

use std::future::Future;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::Course;
use crate::orchestrator::lane_worker::process_lane;
use crate::services::JsonSink;

/// 单个通道的失败记录
#[derive(Debug)]
pub struct LaneFailure {
    pub lane: usize,
    pub reason: String,
}

/// 一次采集的完整结果：合并数据 + 部分失败报告
#[derive(Debug, Default)]
pub struct HarvestOutcome {
    pub courses: Vec<Course>,
    pub failures: Vec<LaneFailure>,
}

impl HarvestOutcome {
    /// 是否所有通道都正常完成
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 并发运行 `lane_count` 个通道并按通道序合并结果
///
/// 通道工厂 `make_lane` 为每个通道编号产出一个独立任务；
/// 通道间不共享任何可变状态，合并只发生在 join 之后。
/// 出错或 panic 的通道贡献空结果并记入失败报告
pub async fn harvest_with<F, Fut>(lane_count: usize, make_lane: F) -> HarvestOutcome
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<Vec<Course>>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(lane_count);
    for lane in 0..lane_count {
        handles.push((lane, tokio::spawn(make_lane(lane))));
    }

    let mut outcome = HarvestOutcome::default();

    // 按通道序 join，保证合并顺序与通道编号一致
    for (lane, handle) in handles {
        match handle.await {
            Ok(Ok(partial)) => {
                outcome.courses.extend(partial);
            }
            Ok(Err(e)) => {
                outcome.failures.push(LaneFailure {
                    lane,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                // 任务 panic 同样只隔离到本通道
                outcome.failures.push(LaneFailure {
                    lane,
                    reason: format!("任务执行失败: {}", e),
                });
            }
        }
    }

    outcome
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        log_startup(&config);
        Self { config }
    }

    /// 运行应用主逻辑：采集、合并、落盘
    pub async fn run(&self) -> Result<HarvestOutcome> {
        let config = self.config.clone();
        let outcome = harvest_with(config.lane_count, move |lane| {
            process_lane(lane, config.clone())
        })
        .await;

        log_outcome(&outcome);

        let sink = JsonSink::new(self.config.output_file.clone());
        sink.write(&outcome.courses)?;

        print_final_stats(&outcome, &self.config);
        Ok(outcome)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多通道课程目录采集模式");
    info!("📊 通道数量: {}", config.lane_count);
    info!("🌐 目标地址: {}", config.target_url);
    info!("{}", "=".repeat(60));
}

fn log_outcome(outcome: &HarvestOutcome) {
    for failure in &outcome.failures {
        error!("❌ 通道 {} 失败: {}", failure.lane, failure.reason);
    }
    if !outcome.is_complete() {
        warn!(
            "⚠️ {} 个通道失败，返回其余通道的部分数据",
            outcome.failures.len()
        );
    }
}

fn print_final_stats(outcome: &HarvestOutcome, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 采集完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 课程总数: {}", outcome.courses.len());
    info!(
        "通道: 成功 {}/{}",
        config.lane_count - outcome.failures.len(),
        config.lane_count
    );
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", config.output_file);
}
