use common::{SubtitleError, SubtitleResult, join_url};
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub use common::GENERAL_UA as OPENSUBTITLES_UA;

pub const CATALOG_ORIGIN: &str = "https://www.opensubtitles.org";
pub const CATALOG_REFERER: &str = "https://www.opensubtitles.org/";
pub const DOWNLOAD_ORIGIN: &str = "https://dl.opensubtitles.org";

// ==== URL ====

/// 搜索列表页
pub fn listing_url(catalog_language: &str, encoded_query: &str) -> String {
    format!(
        "{}/en/search/sublanguageid-{}/moviename-{}",
        CATALOG_ORIGIN, catalog_language, encoded_query
    )
}

/// 字幕详情页
pub fn detail_url(catalog_id: &str) -> String {
    format!("{}/en/subtitles/{}", CATALOG_ORIGIN, catalog_id)
}

/// 直接下载链接
pub fn download_url(catalog_id: &str) -> String {
    format!("{}/en/download/sub/{}", DOWNLOAD_ORIGIN, catalog_id)
}

/// 以 `base`（返回该链接的页面地址）为基准补全链接
///
/// 已经是绝对地址的保持不变，`//host/path` 沿用 `base` 的协议。
pub fn absolutize(base: &str, link: &str) -> anyhow::Result<String> {
    let link = link.trim();
    anyhow::ensure!(!link.is_empty(), "空链接");
    join_url(base, link)
}

// ==== 取消 ====

/// 在取消信号到来时立即放弃 `future`
pub async fn cancellable<F, T>(cancel: &CancellationToken, future: F) -> SubtitleResult<T>
where
    F: Future<Output = SubtitleResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SubtitleError::Cancelled),
        result = future => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_templates() {
        assert_eq!(
            listing_url("eng", "Show+S01E02"),
            "https://www.opensubtitles.org/en/search/sublanguageid-eng/moviename-Show+S01E02"
        );
        assert_eq!(
            detail_url("111"),
            "https://www.opensubtitles.org/en/subtitles/111"
        );
        assert_eq!(
            download_url("111"),
            "https://dl.opensubtitles.org/en/download/sub/111"
        );
    }

    #[test]
    fn test_absolutize() {
        let detail = "https://www.opensubtitles.org/en/subtitles/42";
        let download = "https://dl.opensubtitles.org/en/download/sub/42";

        assert_eq!(
            absolutize(detail, "/en/subtitles/42/show").unwrap(),
            "https://www.opensubtitles.org/en/subtitles/42/show"
        );
        assert_eq!(absolutize(detail, download).unwrap(), download);
        assert_eq!(
            absolutize(detail, "//dl.opensubtitles.org/en/download/sub/42").unwrap(),
            download
        );
        assert!(absolutize(detail, "   ").is_err());
        assert!(absolutize(detail, "http://[::1").is_err());
    }

    #[test]
    fn test_absolutize_keeps_host_of_base() {
        // 相对地址跟随返回它的主机，而不是固定的站点根
        let download = "https://dl.opensubtitles.org/en/download/sub/111";
        assert_eq!(
            absolutize(download, "/en/download/file/111.zip").unwrap(),
            "https://dl.opensubtitles.org/en/download/file/111.zip"
        );
        assert_eq!(
            absolutize(download, "file/111.zip").unwrap(),
            "https://dl.opensubtitles.org/en/download/sub/file/111.zip"
        );
    }

    #[tokio::test]
    async fn test_cancellable() {
        let cancel = CancellationToken::new();
        let ok = cancellable(&cancel, async { Ok::<_, SubtitleError>(1) }).await;
        assert_eq!(ok.unwrap(), 1);

        cancel.cancel();
        let cancelled = cancellable(&cancel, std::future::pending::<SubtitleResult<u8>>()).await;
        assert!(matches!(cancelled, Err(SubtitleError::Cancelled)));
    }
}
