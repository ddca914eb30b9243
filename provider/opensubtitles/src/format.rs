//! 字幕格式识别

use common::SubtitleFormat;
use regex::Regex;
use std::sync::LazyLock;

/// 只检查开头的字节数
pub const SNIFF_LEN: usize = 1000;

static FRAME_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\d+\}").unwrap());
static TIMESTAMP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap());

/// 根据内容判断字幕格式，无法识别时默认为 srt
///
/// 先检查特征明确的文件头，再检查可能偶然出现的模式（例如 `{123}`）。
pub fn detect(bytes: &[u8]) -> SubtitleFormat {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);

    if text.contains("WEBVTT") {
        SubtitleFormat::Vtt
    } else if text.contains("[Script Info]") || text.contains("Dialogue:") {
        SubtitleFormat::Ass
    } else if FRAME_MARKER_REGEX.is_match(&text) {
        SubtitleFormat::Sub
    } else if text.contains("-->") && TIMESTAMP_REGEX.is_match(&text) {
        SubtitleFormat::Srt
    } else {
        log::debug!("No subtitle signature matched, defaulting to srt");
        SubtitleFormat::Srt
    }
}
