//! 搜索关键词构建

use common::{ContentKind, MediaDescriptor};
use regex::Regex;
use std::sync::LazyLock;

use crate::id::normalize_language;
use crate::language::to_catalog_code;
use crate::utils::listing_url;

// 从第一个画质/编码/片源标记开始的所有内容
static RELEASE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[._\s-](?:2160p|1080p|720p|480p|4k|uhd|x264|x265|h\.?264|h\.?265|hevc|xvid|bluray|blu-ray|brrip|bdrip|web-?dl|webrip|hdtv|dvdrip|hdrip|remux|proper|repack)\b.*",
    )
    .unwrap()
});
static BRACKET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").unwrap());
static SPACES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// 搜索关键词与目标语言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// 用于生成字幕 ID 的语言代码（已规范化）
    pub language: String,
    /// 站点使用的三位语言代码
    pub catalog_language: String,
}

impl SearchQuery {
    pub fn from_media(media: &MediaDescriptor) -> Self {
        Self {
            text: query_text(media),
            language: normalize_language(&media.requested_language),
            catalog_language: to_catalog_code(&media.requested_language),
        }
    }

    /// 关键词为空时无需搜索
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 搜索列表页地址（关键词按表单规则编码，空格为 `+`）
    pub fn listing_url(&self) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(self.text.as_bytes()).collect();
        listing_url(&self.catalog_language, &encoded)
    }
}

/// 根据媒体信息生成关键词
///
/// 剧集使用 `剧名 SxxExx`，否则从文件名推断，都没有时返回空字符串。
pub fn query_text(media: &MediaDescriptor) -> String {
    if media.content_kind == ContentKind::Episode {
        if let Some(series) = media
            .series_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let season = media.season_number.unwrap_or(1);
            let episode = media.episode_number.unwrap_or(1);
            return format!("{} S{:02}E{:02}", series, season, episode);
        }
    }

    media
        .file_path
        .as_deref()
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .map(clean_file_stem)
        .unwrap_or_default()
}

/// 清理文件名：去掉发布标记与括号注释，分隔符替换为空格
pub fn clean_file_stem(stem: &str) -> String {
    let stripped = RELEASE_TAG_REGEX.replace(stem, "");
    let stripped = BRACKET_REGEX.replace_all(&stripped, "");
    let spaced = stripped.replace(['.', '_'], " ");
    SPACES_REGEX.replace_all(&spaced, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_query() {
        let media = MediaDescriptor::episode("Show", Some(1), Some(2), "en");
        assert_eq!(query_text(&media), "Show S01E02");

        let media = MediaDescriptor::episode("Show", None, None, "en");
        assert_eq!(query_text(&media), "Show S01E01");

        let media = MediaDescriptor::episode("The Long Show", Some(12), Some(104), "en");
        assert_eq!(query_text(&media), "The Long Show S12E104");
    }

    #[test]
    fn test_episode_without_series_uses_file_name() {
        let mut media = MediaDescriptor::episode("  ", Some(1), Some(2), "en")
            .with_file_path("/tv/Some.Show.S01E02.720p.HDTV.x264-GROUP.mkv");
        assert_eq!(query_text(&media), "Some Show S01E02");

        media.series_name = None;
        assert_eq!(query_text(&media), "Some Show S01E02");
    }

    #[test]
    fn test_movie_query() {
        let cases = vec![
            ("/movies/The.Movie.2020.1080p.BluRay.x264-GRP.mkv", "The Movie 2020"),
            ("/movies/[Group] Another_Movie_2019.mp4", "Another Movie 2019"),
            ("C:/films/Film.Name.WEB-DL.mkv", "Film Name"),
            ("/movies/Plain Title.avi", "Plain Title"),
            ("/movies/Title (2001).mkv", "Title"),
        ];

        for (path, expected) in cases {
            let media = MediaDescriptor::movie(path, "en");
            assert_eq!(query_text(&media), expected, "path: {}", path);
        }
    }

    #[test]
    fn test_no_file_path_is_empty() {
        let mut media = MediaDescriptor::movie("x.mkv", "en");
        media.file_path = None;
        let query = SearchQuery::from_media(&media);
        assert!(query.is_empty());
    }

    #[test]
    fn test_search_query_url() {
        let media = MediaDescriptor::episode("Show & Tell", Some(1), Some(2), "fr");
        let query = SearchQuery::from_media(&media);
        assert_eq!(query.language, "fr");
        assert_eq!(query.catalog_language, "fre");
        assert_eq!(
            query.listing_url(),
            "https://www.opensubtitles.org/en/search/sublanguageid-fre/moviename-Show+%26+Tell+S01E02"
        );
    }

    #[test]
    fn test_empty_language_defaults_to_english() {
        let media = MediaDescriptor::episode("Show", Some(1), Some(2), "  ");
        let query = SearchQuery::from_media(&media);
        assert_eq!(query.language, "en");
        assert_eq!(query.catalog_language, "eng");
    }

    #[test]
    fn test_query_language_is_normalized() {
        for (requested, expected) in [("pt-BR", "pt"), ("EN", "en"), ("en1", "en"), ("日本", "en")] {
            let media = MediaDescriptor::episode("Show", Some(1), Some(2), requested);
            assert_eq!(SearchQuery::from_media(&media).language, expected);
        }
    }
}
