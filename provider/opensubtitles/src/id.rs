//! 字幕 ID 编解码
//!
//! 搜索结果的 ID 形如 `srt-en-123456`，下载时不需要任何外部状态即可还原出下载地址。
//! 旧版本直接使用完整下载链接作为 ID，这里仍然兼容。

use common::{SubtitleError, SubtitleResult};

use crate::utils::download_url;

const ID_PREFIX: &str = "srt";

/// 完整链接形式的 ID 没有语言信息，使用默认语言
pub const DEFAULT_LANGUAGE_HINT: &str = "en";

/// 解码后的字幕 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIdentifier {
    pub download_url: String,
    pub language_hint: String,
}

/// 生成字幕 ID
///
/// 语言部分经过 [`normalize_language`]，保证生成的 ID 总能被 [`decode`] 接受。
pub fn encode(language: &str, catalog_id: &str) -> String {
    format!("{}-{}-{}", ID_PREFIX, normalize_language(language), catalog_id)
}

/// 规范化 ID 中的语言段
///
/// 去掉地区后缀（`pt-BR` 中的 `BR`）并转为小写；剩下的不是纯 ASCII 字母时
/// 退回 [`DEFAULT_LANGUAGE_HINT`]。
pub fn normalize_language(language: &str) -> String {
    let language = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !language.is_empty() && language.chars().all(|c| c.is_ascii_alphabetic()) {
        language
    } else {
        DEFAULT_LANGUAGE_HINT.to_string()
    }
}

/// 解析字幕 ID，无法识别时返回 [`SubtitleError::InvalidIdentifier`]
pub fn decode(id: &str) -> SubtitleResult<DecodedIdentifier> {
    let id = id.trim();

    if id.starts_with("http://") || id.starts_with("https://") {
        url::Url::parse(id).map_err(|_| SubtitleError::InvalidIdentifier(id.to_string()))?;
        return Ok(DecodedIdentifier {
            download_url: id.to_string(),
            language_hint: DEFAULT_LANGUAGE_HINT.to_string(),
        });
    }

    let parts: Vec<&str> = id.split('-').collect();
    if parts.len() < 3 || parts[0] != ID_PREFIX {
        return Err(SubtitleError::InvalidIdentifier(id.to_string()));
    }

    let (language, catalog_id) = (parts[1], parts[2]);
    let valid_language = !language.is_empty() && language.chars().all(|c| c.is_ascii_alphabetic());
    let valid_catalog_id = !catalog_id.is_empty() && catalog_id.chars().all(|c| c.is_ascii_digit());
    if !valid_language || !valid_catalog_id {
        return Err(SubtitleError::InvalidIdentifier(id.to_string()));
    }

    Ok(DecodedIdentifier {
        download_url: download_url(catalog_id),
        language_hint: language.to_string(),
    })
}
