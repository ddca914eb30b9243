//! 页面解析
//!
//! 站点页面没有稳定的语义标记，所有提取都写成按优先级依次尝试的策略列表，
//! 每个策略都是 `markup -> Option<T>` 的纯函数，任何一个失败都不会中断解析。

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::language::from_display_name;
use crate::utils::{DOWNLOAD_ORIGIN, absolutize};

/// 详情页文件名最短长度（不含）
pub const MIN_FILENAME_LEN: usize = 5;

static SUBTITLE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/subtitles/(\d+)").unwrap());
static SIZE_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\s*[\d.,]+\s*(?:[kmg]i?)?b(?:ytes?)?\s*\)\s*$").unwrap()
});
static FORMAT_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:srt|ass|ssa|sub|vtt|txt|smi|zip)$").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DIRECT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://dl\.opensubtitles\.org/[^\s"'<>]+"#).unwrap()
});

// ==== 搜索列表页 ====

/// 列表页中的候选字幕，只有站点 ID，文件名需要再请求详情页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialCandidate {
    pub catalog_id: String,
    /// 行内语言标记解析出的三位代码
    pub language: Option<String>,
}

// 依次尝试的行选择器，第一个产生候选的选择器生效
const ROW_SELECTORS: &[&str] = &[
    "table#search_results tr[onclick]",
    "tr[onclick]",
    "table#search_results tr",
    "tr",
];

/// 解析搜索列表页，最多返回 `limit` 个候选
pub fn parse_listing(html: &str, limit: usize) -> Vec<PartialCandidate> {
    if limit == 0 {
        return Vec::new();
    }

    let document = Html::parse_document(html);

    for row_selector in ROW_SELECTORS {
        let Ok(selector) = Selector::parse(row_selector) else {
            continue;
        };

        let candidates: Vec<PartialCandidate> = document
            .select(&selector)
            .filter_map(|row| {
                let candidate = parse_row(row);
                if candidate.is_none() {
                    log::trace!("Skipping row without subtitle link ({})", row_selector);
                }
                candidate
            })
            .take(limit)
            .collect();

        if !candidates.is_empty() {
            log::debug!(
                "Parsed {} candidates with row selector '{}'",
                candidates.len(),
                row_selector
            );
            return candidates;
        }
    }

    log::debug!("No subtitle rows found in listing page");
    Vec::new()
}

/// 解析单行，没有详情页链接或无法提取 ID 时跳过
fn parse_row(row: ElementRef<'_>) -> Option<PartialCandidate> {
    let link_selector = Selector::parse("a[href*='/subtitles/']").ok()?;

    let catalog_id = row
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .find_map(extract_catalog_id)?;

    Some(PartialCandidate {
        catalog_id,
        language: extract_row_language(row),
    })
}

/// 从详情页路径中提取站点 ID，例如 `/en/subtitles/123456/show-s01e02-en`
pub fn extract_catalog_id(href: &str) -> Option<String> {
    SUBTITLE_ID_REGEX
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

type RowLanguageStrategy = for<'a> fn(ElementRef<'a>) -> Option<String>;

const ROW_LANGUAGE_STRATEGIES: &[RowLanguageStrategy] = &[language_from_link, language_from_flag];

fn extract_row_language(row: ElementRef<'_>) -> Option<String> {
    ROW_LANGUAGE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(row))
}

// <a href="/en/search/sublanguageid-fre/idmovie-1" title="French">
fn language_from_link(row: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("a[href*='sublanguageid-'][title]").ok()?;
    row.select(&selector)
        .filter_map(|link| link.value().attr("title"))
        .find_map(from_display_name)
        .map(str::to_string)
}

// <div class="flag fr" title="French">
fn language_from_flag(row: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("[class~='flag'][title]").ok()?;
    row.select(&selector)
        .filter_map(|flag| flag.value().attr("title"))
        .find_map(from_display_name)
        .map(str::to_string)
}

// ==== 详情页 ====

// 依次尝试的下载链接选择器
const FILENAME_LINK_SELECTORS: &[&str] = &[
    "a[href*='/download/sub/']",
    "a[href*='/download/']",
    "a[href*='/subtitleserve/']",
];

/// 从详情页提取可读文件名
pub fn extract_filename(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    FILENAME_LINK_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .map(|link| link.text().collect::<String>())
            .find_map(|text| clean_filename(&text))
    })
}

/// 清理下载链接文字：去掉结尾的文件大小与扩展名
///
/// 结果不超过 [`MIN_FILENAME_LEN`] 个字符时视为失败。
pub fn clean_filename(text: &str) -> Option<String> {
    let text = WHITESPACE_REGEX.replace_all(text, " ");
    let text = SIZE_SUFFIX_REGEX.replace(text.trim(), "");
    let text = FORMAT_SUFFIX_REGEX.replace(text.trim(), "");
    let name = text.trim();

    if name.chars().count() > MIN_FILENAME_LEN {
        Some(name.to_string())
    } else {
        None
    }
}

// ==== 中间页 ====

type DownloadLinkStrategy = fn(&Html, &str) -> Option<String>;

// 中间页真实下载链接的提取策略，按优先级排列
const DOWNLOAD_LINK_STRATEGIES: &[(&str, DownloadLinkStrategy)] = &[
    ("download button", link_from_download_button),
    ("download/sub anchor", link_from_download_anchor),
    ("subtitleserve anchor", link_from_subtitleserve_anchor),
    ("meta refresh", link_from_meta_refresh),
    ("direct link in markup", link_from_raw_markup),
];

/// 从 HTML 中间页提取真实下载链接
///
/// 策略只返回页面上的原始链接，相对地址以中间页自身的地址 `page_url` 补全。
pub fn extract_download_link(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    DOWNLOAD_LINK_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let raw = strategy(&document, html)?;
            let link = absolutize(page_url, &raw)
                .inspect_err(|e| log::debug!("Ignoring link {} via {}: {}", raw, name, e))
                .ok()?;
            log::debug!("Found download link via {}: {}", name, link);
            Some(link)
        })
}

fn first_href(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

fn link_from_download_button(document: &Html, _: &str) -> Option<String> {
    first_href(document, "a#bt-dwl-bt[href]")
}

fn link_from_download_anchor(document: &Html, _: &str) -> Option<String> {
    first_href(document, "a[href*='/download/sub/']")
}

fn link_from_subtitleserve_anchor(document: &Html, _: &str) -> Option<String> {
    first_href(document, "a[href*='/subtitleserve/']")
}

// <meta http-equiv="refresh" content="0; url=/en/download/sub/1">
fn link_from_meta_refresh(document: &Html, _: &str) -> Option<String> {
    let selector = Selector::parse("meta[http-equiv][content]").ok()?;
    document
        .select(&selector)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .find_map(|content| {
            let lower = content.to_ascii_lowercase();
            let start = lower.find("url=")? + "url=".len();
            let target = content[start..].trim().trim_matches(|c| c == '\'' || c == '"');
            (!target.is_empty()).then(|| target.to_string())
        })
}

fn link_from_raw_markup(_: &Html, raw: &str) -> Option<String> {
    DIRECT_LINK_REGEX
        .find(raw)
        .map(|m| m.as_str().replace("&amp;", "&"))
        .filter(|link| link.len() > DOWNLOAD_ORIGIN.len() + 1)
}
