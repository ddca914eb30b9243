//! OpenSubtitles 页面与字幕抓取器

use common::{HttpClient, HttpResponse, SubtitleError, SubtitleResult, convert_bytes};
use tokio_util::sync::CancellationToken;

use crate::archive::is_archive;
use crate::page::{extract_download_link, extract_filename};
use crate::utils::{CATALOG_REFERER, OPENSUBTITLES_UA, absolutize, cancellable, detail_url};

/// 详情页最多跟随一次重定向
const DETAIL_REDIRECT_HOPS: usize = 1;
/// 下载链接的重定向上限
const DOWNLOAD_REDIRECT_HOPS: usize = 5;
/// HTML 中间页最多再跳转一次，避免循环
const INTERSTITIAL_HOPS: usize = 1;

/// 下载得到的原始内容
#[derive(Debug, Clone)]
pub struct DownloadedPayload {
    pub bytes: Vec<u8>,
    pub declared_content_type: Option<String>,
    /// 最终请求的地址
    pub url: String,
}

impl DownloadedPayload {
    fn from_response(url: &str, response: HttpResponse) -> Self {
        Self {
            declared_content_type: response.content_type().map(str::to_string),
            bytes: response.bytes,
            url: url.to_string(),
        }
    }

    /// 内容是否为 HTML 页面（而不是字幕或压缩包）
    pub fn is_html(&self) -> bool {
        if is_archive(&self.bytes) {
            return false;
        }

        if self
            .declared_content_type
            .as_deref()
            .is_some_and(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
        {
            return true;
        }

        if looks_like_html_url(&self.url) {
            return true;
        }

        let head = String::from_utf8_lossy(&self.bytes[..self.bytes.len().min(256)]);
        let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
        head.starts_with("<!doctype html") || head.starts_with("<html")
    }
}

fn looks_like_html_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    path.ends_with(".html") || path.ends_with(".htm") || path.contains("/subtitles/")
}

/// OpenSubtitles 页面抓取器
pub struct OpenSubtitlesFetcher<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> OpenSubtitlesFetcher<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> SubtitleResult<HttpResponse> {
        log::debug!("GET {}", url);
        cancellable(cancel, self.http.get(url, headers)).await
    }

    /// 请求并最多跟随 `max_hops` 次重定向，返回最终地址与响应
    ///
    /// 相对的 `Location` 以当前请求地址为基准；无法解析时返回 [`SubtitleError::Parse`]。
    async fn get_following(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        max_hops: usize,
        cancel: &CancellationToken,
    ) -> SubtitleResult<(String, HttpResponse)> {
        let mut url = url.to_string();
        let mut response = self.get(&url, headers, cancel).await?;

        for _ in 0..max_hops {
            if !response.is_redirection() {
                break;
            }
            let Some(location) = response.header("location") else {
                break;
            };
            let location = absolutize(&url, location)?;
            log::debug!("Following redirect {} -> {}", url, location);
            url = location;
            response = self.get(&url, headers, cancel).await?;
        }

        Ok((url, response))
    }

    /// 获取搜索列表页 HTML
    pub async fn fetch_listing(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> SubtitleResult<String> {
        let headers = [("User-Agent", OPENSUBTITLES_UA)];
        let (_, response) = self
            .get_following(url, &headers, DETAIL_REDIRECT_HOPS, cancel)
            .await?;

        if !response.is_success() {
            return Err(SubtitleError::Transport(format!(
                "搜索页返回状态码 {}",
                response.status
            )));
        }

        Ok(response.text())
    }

    /// 请求详情页并提取可读文件名
    ///
    /// 任何失败都只返回 `None`，不影响其他候选；只有取消会向上传递。
    pub async fn resolve_filename(
        &self,
        catalog_id: &str,
        cancel: &CancellationToken,
    ) -> SubtitleResult<Option<String>> {
        let url = detail_url(catalog_id);
        let headers = [("User-Agent", OPENSUBTITLES_UA)];

        let response = match self
            .get_following(&url, &headers, DETAIL_REDIRECT_HOPS, cancel)
            .await
        {
            Ok((_, response)) => response,
            Err(SubtitleError::Cancelled) => return Err(SubtitleError::Cancelled),
            Err(e) => {
                log::warn!("Failed to fetch detail page for {}: {}", catalog_id, e);
                return Ok(None);
            }
        };

        if !response.is_success() {
            log::warn!(
                "Detail page for {} returned status {}, dropping candidate",
                catalog_id,
                response.status
            );
            return Ok(None);
        }

        let filename = extract_filename(&response.text());
        match &filename {
            Some(name) => log::debug!("Resolved {} -> {}", catalog_id, name),
            None => log::warn!("No filename found on detail page for {}", catalog_id),
        }
        Ok(filename)
    }

    /// 下载字幕内容
    ///
    /// 返回 HTML 中间页时尝试从中找到真实下载链接；找不到时原样返回该页面。
    pub async fn fetch_content(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> SubtitleResult<DownloadedPayload> {
        let headers = [("User-Agent", OPENSUBTITLES_UA), ("Referer", CATALOG_REFERER)];
        let mut url = url.to_string();
        let mut hops_left = INTERSTITIAL_HOPS;

        loop {
            let (final_url, response) = self
                .get_following(&url, &headers, DOWNLOAD_REDIRECT_HOPS, cancel)
                .await?;

            if !response.is_success() {
                log::warn!("Download {} failed with status {}", final_url, response.status);
                return Err(SubtitleError::DownloadFailed {
                    status: response.status,
                });
            }

            let payload = DownloadedPayload::from_response(&final_url, response);
            log::debug!(
                "Downloaded {} ({}, content-type: {})",
                payload.url,
                convert_bytes(payload.bytes.len() as f64),
                payload.declared_content_type.as_deref().unwrap_or("unknown")
            );

            if !payload.is_html() {
                return Ok(payload);
            }

            if hops_left == 0 {
                log::warn!(
                    "Interstitial hop limit reached at {}, returning page as-is",
                    payload.url
                );
                return Ok(payload);
            }

            let html = String::from_utf8_lossy(&payload.bytes).into_owned();
            let link = extract_download_link(&html, &payload.url);
            match link {
                Some(link) if link != payload.url => {
                    log::debug!("Interstitial page {} links to {}", payload.url, link);
                    hops_left -= 1;
                    url = link;
                }
                _ => {
                    log::warn!(
                        "No download link found in HTML page {}, returning page as-is",
                        payload.url
                    );
                    return Ok(payload);
                }
            }
        }
    }
}
