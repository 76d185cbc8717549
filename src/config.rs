/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 并发采集通道数量（每个通道独占一个无头浏览器）
    pub lane_count: usize,
    /// 课程目录页面 URL
    pub target_url: String,
    /// 采集结果输出文件
    pub output_file: String,
    /// Chrome/Chromium 可执行文件路径（不设置时由 chromiumoxide 自动探测）
    pub chrome_executable: Option<String>,
    /// 翻页后等待新页面出现的超时（毫秒）
    pub page_confirm_timeout_ms: u64,
    /// 搜索后等待结果（或无结果提示）出现的超时（毫秒）
    pub search_result_timeout_ms: u64,
    /// 搜索后优先探测"无结果提示"的超时（毫秒）
    pub no_results_probe_ms: u64,
    /// 页面交互的统一重试次数上限
    pub max_interaction_retries: usize,
    /// 两次交互之间的间隔（毫秒），避免触发页面动画竞态
    pub interaction_pause_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lane_count: 5,
            target_url: "https://ttb.utoronto.ca/".to_string(),
            output_file: "course_data.json".to_string(),
            chrome_executable: None,
            page_confirm_timeout_ms: 10_000,
            search_result_timeout_ms: 20_000,
            no_results_probe_ms: 5_000,
            max_interaction_retries: 3,
            interaction_pause_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            lane_count: std::env::var("LANE_COUNT").ok().and_then(|v| v.parse().ok()).filter(|&n| n > 0).unwrap_or(default.lane_count),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            page_confirm_timeout_ms: std::env::var("PAGE_CONFIRM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_confirm_timeout_ms),
            search_result_timeout_ms: std::env::var("SEARCH_RESULT_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.search_result_timeout_ms),
            no_results_probe_ms: std::env::var("NO_RESULTS_PROBE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.no_results_probe_ms),
            max_interaction_retries: std::env::var("MAX_INTERACTION_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_interaction_retries),
            interaction_pause_ms: std::env::var("INTERACTION_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.interaction_pause_ms),
        }
    }
}
