//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责通道的并发调度与结果合并，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `harvester` - 采集协调器
//! - 管理应用生命周期（初始化、运行、落盘）
//! - 为每个通道 spawn 独立任务（一通道一浏览器）
//! - join 后按通道序合并私有结果序列
//! - 隔离失败通道并输出部分失败报告
//!
//! ### `lane_worker` - 单通道采集器
//! - 独立完成检索设置并判定"无结果"终态
//! - 按交错分片推进：就位 lane_index 页，之后每页一个步长
//! - 每页执行"展开 → 快照 → 纯解析"协议
//! - 翻页超时视为到达末页，带着已采数据正常收尾
//!
//! ## 层次关系
//!
//! ```text
//! harvester (N 个通道的调度与合并)
//!     ↓
//! lane_worker (单个通道的页面分片)
//!     ↓
//! services (能力层：search / extractor / pagination / sink)
//!     ↓
//! infrastructure (基础设施：BrowserSession)
//! ```

pub mod harvester;
pub mod lane_worker;

// 重新导出主要类型
pub use harvester::{harvest_with, App, HarvestOutcome, LaneFailure};
pub use lane_worker::{harvest_lane, process_lane, CatalogLane, LaneSession};
