use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;

/// 进程级浏览器启动锁
///
/// 启动本地浏览器进程是唯一被多个通道共享的外部资源获取步骤，
/// 并发启动不安全；启动完成后浏览器由获取它的通道独占使用
static LAUNCH_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// 启动无头浏览器并导航到指定 URL
///
/// 每个采集通道调用一次，获得自己独占的浏览器实例
pub async fn launch_headless_browser(config: &Config, url: &str) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}", url);

    // 配置无头浏览器
    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",             // 无头模式下禁用 GPU
        "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
        "--disable-dev-shm-usage",   // 防止共享内存不足
        "--window-size=1920,1080",   // 固定视口，保证分页控件可见
        "--remote-debugging-port=0", // 让浏览器自动选择端口
    ]);
    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(path));
    }
    let browser_config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        anyhow::anyhow!("配置无头浏览器失败: {}", e)
    })?;

    // 启动浏览器（串行化启动步骤，锁在启动完成后立即释放）
    let (browser, mut handler) = {
        let _guard = LAUNCH_LOCK.lock().await;
        Browser::launch(browser_config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            anyhow::anyhow!("启动无头浏览器失败: {}", e)
        })?
    };
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 创建新页面并导航
    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面失败: {}", e);
        anyhow::anyhow!("创建页面失败: {}", e)
    })?;

    info!("✅ 无头浏览器已导航到: {}", url);

    Ok((browser, page))
}
