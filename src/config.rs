use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// API 基础地址
    pub api_base_url: String,
    /// 访问令牌（可选，作为 Bearer 发送）
    pub api_token: Option<String>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 组卷计划 TOML 文件存放目录
    pub plan_folder: String,
    /// 同时处理的组卷计划数量
    pub max_concurrent_plans: usize,
    /// 是否显示详细日志（打印完整预览）
    pub verbose_logging: bool,
    /// 只组卷和预览，不提交
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api/v1".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            plan_folder: "plans".to_string(),
            max_concurrent_plans: 4,
            verbose_logging: false,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            api_token: std::env::var("API_TOKEN").ok().filter(|v| !v.is_empty()).or(default.api_token),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            plan_folder: std::env::var("PLAN_FOLDER").unwrap_or(default.plan_folder),
            max_concurrent_plans: std::env::var("MAX_CONCURRENT_PLANS").ok().and_then(|v| v.parse().ok()).filter(|n: &usize| *n > 0).unwrap_or(default.max_concurrent_plans),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            dry_run: std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dry_run),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                var_name: "API_BASE_URL".to_string(),
                value: self.api_base_url.clone(),
                expected: "http(s) URL".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 拼接接口完整地址
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
