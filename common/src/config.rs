//! 运行配置快照
//!
//! 配置在调用时显式传入，字幕源内部不持有任何全局配置。

use crate::get_env_var;

pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;
pub const DEFAULT_PREFERRED_FORMAT: &str = "srt";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 搜索结果数量上限（去重之后生效）
    pub max_search_results: usize,
    /// 从压缩包中优先提取的字幕扩展名
    pub preferred_format: String,
    pub enable_debug_logging: bool,
    /// 仅用于构建 HTTP 客户端
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            preferred_format: DEFAULT_PREFERRED_FORMAT.to_string(),
            enable_debug_logging: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，缺失或无法解析时使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_search_results: parse_env("SUBGRAB_MAX_RESULTS")
                .unwrap_or(default.max_search_results),
            preferred_format: get_env_var("SUBGRAB_PREFERRED_FORMAT")
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or(default.preferred_format),
            enable_debug_logging: get_env_var("SUBGRAB_DEBUG")
                .map(|v| parse_bool(&v))
                .unwrap_or(default.enable_debug_logging),
            request_timeout_secs: parse_env("SUBGRAB_TIMEOUT_SECS")
                .unwrap_or(default.request_timeout_secs),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = get_env_var(name)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Ignoring invalid value for {}: {}", name, value);
            None
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
