//! 字幕源统一错误类型

/// 字幕搜索与下载的错误类型
#[derive(Debug)]
pub enum SubtitleError {
    /// 网络请求错误（含超时）
    Transport(String),
    /// 页面结构与预期不符
    Parse(String),
    /// 无法识别的字幕 ID
    InvalidIdentifier(String),
    /// 下载时服务器返回非成功状态码
    DownloadFailed { status: u16 },
    /// 压缩包中没有可识别的字幕文件
    ExtractionFailed(String),
    /// 无法处理的下载内容
    UnsupportedPayload(String),
    /// 调用方取消
    Cancelled,
}

impl std::fmt::Display for SubtitleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "网络请求失败: {}", msg),
            Self::Parse(msg) => write!(f, "解析页面失败: {}", msg),
            Self::InvalidIdentifier(id) => write!(f, "无效的字幕 ID: {}", id),
            Self::DownloadFailed { status } => write!(f, "下载字幕失败，HTTP 状态码: {}", status),
            Self::ExtractionFailed(msg) => write!(f, "解压字幕失败: {}", msg),
            Self::UnsupportedPayload(msg) => write!(f, "不支持的内容: {}", msg),
            Self::Cancelled => write!(f, "请求已取消"),
        }
    }
}

impl std::error::Error for SubtitleError {}

impl From<reqwest::Error> for SubtitleError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<anyhow::Error> for SubtitleError {
    fn from(error: anyhow::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

pub type SubtitleResult<T> = std::result::Result<T, SubtitleError>;
