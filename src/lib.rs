//! # TTB Harvest
//!
//! 一个用于并发采集多伦多大学课程目录的 Rust 应用程序。
//! 目录页面由 JavaScript 渲染且没有公开 API，数据只能通过驱动
//! 真实浏览器、展开折叠面板、解析渲染后的 DOM 获得。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `BrowserSession` - 唯一的 page owner，提供 eval / wait / html 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面或单批数据
//! - `extractor` - 面板展开（幂等）+ 快照纯解析能力
//! - `pagination` - 下一页探测与前进能力
//! - `search` - 检索设置与终态判定能力
//! - `sink` - JSON 落盘能力
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/lane_worker` - 单通道采集器，按交错分片走完页面
//! - `orchestrator/harvester` - 采集协调器，管理并发通道与结果合并
//!
//! ## 通道划分
//!
//! N 个通道按页码交错分片覆盖未知长度的分页结果集：
//! 第 p 页属于通道 `(p-1) mod N`，各通道只靠本地的
//! "有没有下一页"判断收尾，不需要共享总页数

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use browser::launch_headless_browser;
pub use config::Config;
pub use error::{AppError, AppResult, PaginationError, TransientUiError};
pub use infrastructure::BrowserSession;
pub use models::{Course, Section, NOT_AVAILABLE};
pub use orchestrator::{harvest_lane, App, HarvestOutcome, LaneSession};
pub use services::{extract_page, JsonSink};
