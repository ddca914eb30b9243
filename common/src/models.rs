use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Episode,
}

/// 搜索输入：描述需要字幕的媒体
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    pub content_kind: ContentKind,
    pub series_name: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub file_path: Option<PathBuf>,
    /// 两位或三位语言代码，例如 `en` / `eng`
    pub requested_language: String,
}

impl MediaDescriptor {
    /// 剧集
    pub fn episode(
        series_name: impl Into<String>,
        season_number: Option<u32>,
        episode_number: Option<u32>,
        requested_language: impl Into<String>,
    ) -> Self {
        Self {
            content_kind: ContentKind::Episode,
            series_name: Some(series_name.into()),
            season_number,
            episode_number,
            file_path: None,
            requested_language: requested_language.into(),
        }
    }

    /// 电影（只能从文件名推断标题）
    pub fn movie(file_path: impl Into<PathBuf>, requested_language: impl Into<String>) -> Self {
        Self {
            content_kind: ContentKind::Movie,
            series_name: None,
            season_number: None,
            episode_number: None,
            file_path: Some(file_path.into()),
            requested_language: requested_language.into(),
        }
    }

    /// 设置媒体文件路径 (可选)
    pub fn with_file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }
}

/// 字幕格式
///
/// 只支持纯文本字幕，不处理图形字幕。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Ass,
    Sub,
    Vtt,
}

impl SubtitleFormat {
    /// 文件扩展名（不含点）
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Sub => "sub",
            Self::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            "sub" => Ok(Self::Sub),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            other => Err(format!("不支持的字幕格式: {}", other)),
        }
    }
}

/// 搜索结果
///
/// 只有 `id` 需要回传给 `retrieve`，其余字段仅用于展示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub display_name: String,
    pub provider_name: String,
    /// 三位语言代码
    pub language_code: String,
    pub format: SubtitleFormat,
    pub is_hash_match: bool,
}

/// 下载并解码后的字幕内容，所有权完全交给调用方
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleContent {
    pub language_hint: String,
    pub bytes: Vec<u8>,
    pub format: SubtitleFormat,
}

impl SubtitleContent {
    /// 以 UTF-8 （有损）解码字幕文本
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
