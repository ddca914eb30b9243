//! 共用工具函数库
//!
//! 这个模块包含了整个workspace中字幕源与命令行共用的类型、trait 和工具函数。
use anyhow::Result;
use human_bytes::human_bytes;
use tokio_util::sync::CancellationToken;
use url::Url;

pub mod config;
pub mod error;
pub mod http;
pub mod models;

pub use config::Config;
pub use error::{SubtitleError, SubtitleResult};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use models::*;

pub const GENERAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 统一的字幕源 trait
///
/// `search` 不向调用方抛出普通错误，最坏结果是空列表；唯一可能的错误是
/// [`SubtitleError::Cancelled`]。`retrieve` 则把失败以具体错误返回。
#[async_trait::async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// 获取字幕源名称
    fn name(&self) -> &'static str;

    /// 支持的媒体类型
    fn supported_kinds(&self) -> &'static [ContentKind];

    async fn search(
        &self,
        media: &MediaDescriptor,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<Vec<SearchResult>>;

    async fn retrieve(
        &self,
        id: &str,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<SubtitleContent>;
}

/// 获取环境变量的值
pub fn get_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 使用url库安全地拼接URL，避免斜杠重复
pub fn join_url(base: &str, path: &str) -> Result<String> {
    let base_url = Url::parse(base)?;
    let joined = base_url.join(path)?;
    Ok(joined.to_string())
}

/// 将字节数转换为人类可读的格式
pub fn convert_bytes<T: Into<f64>>(bytes: T) -> String {
    human_bytes(bytes.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_var() {
        // 测试获取一个存在的环境变量
        unsafe {
            std::env::set_var("TEST_VAR", "test_value");
        }
        let value = get_env_var("TEST_VAR");
        assert_eq!(value, Some("test_value".to_string()));

        // 测试获取一个不存在的环境变量
        let missing_value = get_env_var("MISSING_VAR");
        assert_eq!(missing_value, None);
    }

    #[test]
    fn test_url_joining() {
        let test_cases = vec![
            (
                "https://www.opensubtitles.org",
                "/en/subtitles/123456",
                "https://www.opensubtitles.org/en/subtitles/123456",
            ),
            (
                "https://www.opensubtitles.org/",
                "en/subtitles/123456",
                "https://www.opensubtitles.org/en/subtitles/123456",
            ),
            (
                "https://www.opensubtitles.org/en/subtitles/1",
                "/en/download/sub/1",
                "https://www.opensubtitles.org/en/download/sub/1",
            ),
            (
                "https://www.opensubtitles.org/",
                "https://dl.opensubtitles.org/en/download/sub/1",
                "https://dl.opensubtitles.org/en/download/sub/1",
            ),
        ];

        for (base, path, expected) in test_cases {
            let result = join_url(base, path).unwrap();
            assert_eq!(result, expected);
            println!("✓ Base: {} + Path: {} = {}", base, path, result);
        }
    }

    #[test]
    fn test_convert_bytes() {
        let text = convert_bytes(2048u32);
        assert!(text.starts_with('2'));
        assert!(text.ends_with('B'));
    }
}
