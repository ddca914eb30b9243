//! HTTP 能力抽象
//!
//! 字幕源只通过 [`HttpClient`] 发起请求，便于测试时替换为内存实现。

use std::time::Duration;

use crate::config::Config;
use crate::error::SubtitleResult;

/// 一次 GET 请求的完整响应
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// 响应头，名称统一为小写
    pub headers: Vec<(String, String)>,
    pub bytes: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            bytes: bytes.into(),
        }
    }

    /// 追加响应头
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// 按名称（忽略大小写）获取响应头
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP GET 能力
///
/// 实现方负责超时；超时与其他网络错误一样返回 `SubtitleError::Transport`。
/// 实现方不应自动跟随重定向。
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> SubtitleResult<HttpResponse>;
}

/// 基于 reqwest 的默认实现
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none()) // 禁用自动重定向
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> SubtitleResult<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let bytes = response.bytes().await?.to_vec();

        log::trace!("GET {} -> {} ({} bytes)", url, status, bytes.len());

        Ok(HttpResponse {
            status,
            headers,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_helpers() {
        let response = HttpResponse::new(302, Vec::new())
            .with_header("Location", "/en/subtitles/123")
            .with_header("Content-Type", "text/html; charset=UTF-8");

        assert!(response.is_redirection());
        assert!(!response.is_success());
        assert_eq!(response.header("location"), Some("/en/subtitles/123"));
        assert_eq!(response.header("LOCATION"), Some("/en/subtitles/123"));
        assert_eq!(response.content_type(), Some("text/html; charset=UTF-8"));
        assert_eq!(response.header("referer"), None);
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new(&Config::default()).is_ok());
    }
}
