/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时进行的详情请求数量
    pub max_concurrent_requests: usize,
    /// 题目目录接口
    pub catalog_url: String,
    /// 按 external_id 查询详情的接口
    pub external_id_detail_url: String,
    /// 按 ibn 查询详情的前缀（后接 `/{ibn}.json`）
    pub ibn_detail_base_url: String,
    /// 调试模式：每个部分只抓取前 `debug_limit` 道题
    pub debug_mode: bool,
    pub debug_limit: usize,
    /// 合并后的题目数据输出文件
    pub output_dataset_file: String,
    /// 组卷结果输出文件
    pub output_modules_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 组卷配额覆盖文件（TOML，可选）
    pub quota_file: Option<String>,
    // --- 组卷抽样 ---
    pub sampling_seed: Option<u64>,
    pub sampling_max_attempts: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 20,
            catalog_url: "https://qbank-api.collegeboard.org/msreportingquestionbank-prod/questionbank/digital/get-questions".to_string(),
            external_id_detail_url: "https://qbank-api.collegeboard.org/msreportingquestionbank-prod/questionbank/digital/get-question".to_string(),
            ibn_detail_base_url: "https://saic.collegeboard.org/disclosed".to_string(),
            debug_mode: false,
            debug_limit: 100,
            output_dataset_file: "questions.json".to_string(),
            output_modules_file: "modules.json".to_string(),
            output_log_file: "output.txt".to_string(),
            quota_file: None,
            sampling_seed: None,
            sampling_max_attempts: 64,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_requests),
            catalog_url: std::env::var("CATALOG_URL").unwrap_or(default.catalog_url),
            external_id_detail_url: std::env::var("EXTERNAL_ID_DETAIL_URL").unwrap_or(default.external_id_detail_url),
            ibn_detail_base_url: std::env::var("IBN_DETAIL_BASE_URL").unwrap_or(default.ibn_detail_base_url),
            debug_mode: std::env::var("DEBUG_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.debug_mode),
            debug_limit: std::env::var("DEBUG_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.debug_limit),
            output_dataset_file: std::env::var("OUTPUT_DATASET_FILE").unwrap_or(default.output_dataset_file),
            output_modules_file: std::env::var("OUTPUT_MODULES_FILE").unwrap_or(default.output_modules_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            quota_file: std::env::var("QUOTA_FILE").ok().or(default.quota_file),
            sampling_seed: std::env::var("SAMPLING_SEED").ok().and_then(|v| v.parse().ok()).or(default.sampling_seed),
            sampling_max_attempts: std::env::var("SAMPLING_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.sampling_max_attempts),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 生成 HTTP 客户端所需的连接配置
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            catalog_url: self.catalog_url.clone(),
            external_id_detail_url: self.external_id_detail_url.clone(),
            ibn_detail_base_url: self.ibn_detail_base_url.clone(),
        }
    }
}

/// 题库客户端配置
///
/// 显式传入客户端，不使用全局会话状态
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub catalog_url: String,
    pub external_id_detail_url: String,
    pub ibn_detail_base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Config::default().client_settings()
    }
}
