//! OpenSubtitles 字幕源
//!
//! 抓取 opensubtitles.org 的 HTML 页面完成搜索，并按字幕 ID 下载字幕内容。
//!
//! # 模块结构
//!
//! - [`language`] - 语言代码映射
//! - [`query`] - 搜索关键词构建
//! - [`page`] - 列表页、详情页与中间页解析
//! - [`id`] - 字幕 ID 编解码
//! - [`fetcher`] - 页面与字幕抓取器
//! - [`archive`] - ZIP 解压
//! - [`format`] - 字幕格式识别
//! - [`assembler`] - 搜索结果组装

use futures::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use common::{
    Config, ContentKind, HttpClient, MediaDescriptor, ReqwestClient, SearchResult, SubtitleContent,
    SubtitleError, SubtitleProvider, SubtitleResult, convert_bytes,
};

pub mod archive;
pub mod assembler;
pub mod fetcher;
pub mod format;
pub mod id;
pub mod language;
pub mod page;
pub mod query;
mod utils;

pub use fetcher::{DownloadedPayload, OpenSubtitlesFetcher};
pub use query::SearchQuery;

/// 字幕源名称
pub const PROVIDER_NAME: &str = "OpenSubtitles Grabber";

/// 同时请求的详情页数量
pub const DETAIL_CONCURRENCY: usize = 4;

const SUPPORTED_KINDS: &[ContentKind] = &[ContentKind::Episode, ContentKind::Movie];

// ============================================================================
// 字幕源
// ============================================================================

/// OpenSubtitles 字幕源
pub struct OpenSubtitlesProvider {
    http: Arc<dyn HttpClient>,
}

impl OpenSubtitlesProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// 使用默认的 reqwest 客户端
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(ReqwestClient::new(config)?)))
    }

    fn fetcher(&self) -> OpenSubtitlesFetcher<'_> {
        OpenSubtitlesFetcher::new(self.http.as_ref())
    }

    async fn search_inner(
        &self,
        query: &SearchQuery,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<Vec<SearchResult>> {
        let fetcher = self.fetcher();

        let url = query.listing_url();
        log::debug!("Searching '{}' via {}", query.text, url);
        let html = fetcher.fetch_listing(&url, cancel).await?;

        let candidates = page::parse_listing(&html, config.max_search_results);
        log::debug!("Found {} candidates for '{}'", candidates.len(), query.text);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let fetcher = &fetcher;
        let resolved: Vec<assembler::ResolvedCandidate> =
            stream::iter(candidates.into_iter().enumerate())
                .map(|(index, candidate)| async move {
                    let filename = fetcher
                        .resolve_filename(&candidate.catalog_id, cancel)
                        .await?;
                    Ok::<_, SubtitleError>((index, candidate, filename))
                })
                .buffer_unordered(DETAIL_CONCURRENCY)
                .try_collect()
                .await?;

        Ok(assembler::assemble(query, resolved, config.max_search_results))
    }

    async fn retrieve_inner(
        &self,
        id: &str,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<SubtitleContent> {
        let decoded = id::decode(id)?;
        log::debug!("Retrieving {} from {}", id, decoded.download_url);

        let payload = self.fetcher().fetch_content(&decoded.download_url, cancel).await?;

        let bytes = if archive::is_archive(&payload.bytes) {
            log::debug!(
                "Payload for {} is a zip archive ({})",
                id,
                convert_bytes(payload.bytes.len() as f64)
            );
            let extensions = archive::extension_priority(&config.preferred_format);
            archive::extract_subtitle(&payload.bytes, &extensions).ok_or_else(|| {
                SubtitleError::ExtractionFailed(format!("压缩包中没有可识别的字幕文件: {}", id))
            })?
        } else {
            payload.bytes
        };

        if bytes.is_empty() {
            return Err(SubtitleError::UnsupportedPayload(format!("下载内容为空: {}", id)));
        }

        let format = format::detect(&bytes);
        log::info!(
            "Retrieved {} as {} ({})",
            id,
            format,
            convert_bytes(bytes.len() as f64)
        );

        Ok(SubtitleContent {
            language_hint: decoded.language_hint,
            bytes,
            format,
        })
    }
}

#[async_trait::async_trait]
impl SubtitleProvider for OpenSubtitlesProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supported_kinds(&self) -> &'static [ContentKind] {
        SUPPORTED_KINDS
    }

    async fn search(
        &self,
        media: &MediaDescriptor,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<Vec<SearchResult>> {
        let query = SearchQuery::from_media(media);
        if query.is_empty() {
            log::debug!("No usable query for {:?}, skipping search", media);
            return Ok(Vec::new());
        }

        match self.search_inner(&query, config, cancel).await {
            Ok(results) => {
                log::info!("Found {} subtitles for '{}'", results.len(), query.text);
                Ok(results)
            }
            Err(SubtitleError::Cancelled) => Err(SubtitleError::Cancelled),
            Err(e) => {
                log::warn!("Search for '{}' failed: {}", query.text, e);
                Ok(Vec::new())
            }
        }
    }

    async fn retrieve(
        &self,
        id: &str,
        config: &Config,
        cancel: &CancellationToken,
    ) -> SubtitleResult<SubtitleContent> {
        self.retrieve_inner(id, config, cancel).await.inspect_err(|e| {
            log::error!("Failed to retrieve subtitle {}: {}", id, e);
        })
    }
}
