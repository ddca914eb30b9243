use anyhow::{Context, bail};
use common::{
    Config, MediaDescriptor, SearchResult, SubtitleContent, SubtitleError, SubtitleFormat,
    SubtitleProvider,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::{Table, settings::Style};
use tokio_util::sync::CancellationToken;

use provider_opensubtitles::id;

use crate::{GetArgs, SearchArgs};

/// 输出到标准输出的文件名
const STDOUT_PATH: &str = "-";

/// 根据命令行参数构建媒体描述
pub fn media_from_args(args: &SearchArgs) -> anyhow::Result<MediaDescriptor> {
    let series = args
        .series
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let media = match (series, &args.file) {
        (Some(series), file) => {
            let media = MediaDescriptor::episode(series, args.season, args.episode, &args.lang);
            match file {
                Some(file) => media.with_file_path(file),
                None => media,
            }
        }
        (None, Some(file)) => MediaDescriptor::movie(file, &args.lang),
        (None, None) => bail!("需要指定 --series 或 --file"),
    };

    Ok(media)
}

pub async fn search(
    providers: &[Box<dyn SubtitleProvider>],
    args: &SearchArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let media = media_from_args(args)?;
    let mut results = Vec::new();

    for provider in providers {
        if !provider.supported_kinds().contains(&media.content_kind) {
            log::debug!(
                "{} does not support {:?}, skipping",
                provider.name(),
                media.content_kind
            );
            continue;
        }

        log::info!("Searching with {}", provider.name());
        results.extend(provider.search(&media, config, cancel).await?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("未找到字幕");
    } else {
        println!("{}", render_table(&results));
    }

    Ok(())
}

/// 搜索结果表格
pub fn render_table(results: &[SearchResult]) -> String {
    let header = ["ID", "Name", "Language", "Format", "Provider"].map(str::to_string);
    let rows = std::iter::once(header.to_vec()).chain(results.iter().map(|r| {
        vec![
            r.id.clone(),
            r.display_name.clone(),
            r.language_code.clone(),
            r.format.to_string(),
            r.provider_name.clone(),
        ]
    }));

    let mut table = Table::from_iter(rows);
    table.with(Style::sharp());
    table.to_string()
}

pub async fn get(
    providers: &[Box<dyn SubtitleProvider>],
    args: &GetArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let content = retrieve_from_any(providers, &args.id, config, cancel).await?;

    match &args.output {
        Some(path) if path.as_os_str() == STDOUT_PATH => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&content.bytes)?;
            stdout.flush()?;
        }
        output => {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_output_name(&args.id, content.format)));
            write_subtitle(&path, &content)?;
            println!("已保存到 {}", path.display());
        }
    }

    Ok(())
}

/// 依次交给各个字幕源，跳过不认识该 ID 的字幕源
async fn retrieve_from_any(
    providers: &[Box<dyn SubtitleProvider>],
    id: &str,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<SubtitleContent> {
    let mut last_error = None;

    for provider in providers {
        match provider.retrieve(id, config, cancel).await {
            Ok(content) => return Ok(content),
            Err(e @ SubtitleError::InvalidIdentifier(_)) => {
                log::debug!("{} rejected id {}", provider.name(), id);
                last_error = Some(e);
            }
            Err(e) => return Err(e).with_context(|| format!("{} 下载失败", provider.name())),
        }
    }

    match last_error {
        Some(e) => Err(e.into()),
        None => bail!("没有可用的字幕源"),
    }
}

fn write_subtitle(path: &Path, content: &SubtitleContent) -> anyhow::Result<()> {
    std::fs::write(path, &content.bytes)
        .with_context(|| format!("写入文件失败: {}", path.display()))?;
    log::info!(
        "Saved {} subtitle ({} bytes) to {}",
        content.format,
        content.bytes.len(),
        path.display()
    );
    Ok(())
}

/// 默认文件名：`<站点 ID>.<格式>`
pub fn default_output_name(subtitle_id: &str, format: SubtitleFormat) -> String {
    let stem = id::decode(subtitle_id)
        .ok()
        .and_then(|decoded| {
            decoded
                .download_url
                .split(['?', '#'])
                .next()
                .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
                .map(str::to_string)
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "subtitle".to_string());

    format!("{}.{}", stem, format.extension())
}
