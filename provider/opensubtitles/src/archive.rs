//! ZIP 压缩包处理

use std::io::{Cursor, Read};
use zip::ZipArchive;

/// 可识别的字幕扩展名，按优先级排列
pub const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".ass", ".ssa", ".sub", ".vtt", ".txt"];

/// 根据文件头判断是否为 ZIP
///
/// 只检查 `PK` 两个字节容易误判，这里要求完整的四字节签名
/// （本地文件头、中央目录结束记录或分卷标记）。
pub fn is_archive(bytes: &[u8]) -> bool {
    matches!(
        bytes,
        [0x50, 0x4B, 0x03 | 0x05 | 0x07, 0x04 | 0x06 | 0x08, ..]
    )
}

/// 扩展名优先级，偏好格式（如果可识别）排在最前
pub fn extension_priority(preferred_format: &str) -> Vec<&'static str> {
    let preferred = format!(".{}", preferred_format.trim().trim_start_matches('.').to_lowercase());
    let mut extensions = SUBTITLE_EXTENSIONS.to_vec();
    if let Some(pos) = extensions.iter().position(|ext| *ext == preferred) {
        let ext = extensions.remove(pos);
        extensions.insert(0, ext);
    }
    extensions
}

/// 从压缩包中提取第一个字幕文件
///
/// 没有匹配的文件或压缩包损坏时返回 `None`。
pub fn extract_subtitle(bytes: &[u8], extensions: &[&str]) -> Option<Vec<u8>> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            log::warn!("Failed to open zip archive: {}", e);
            return None;
        }
    };

    log::debug!("Zip contains {} entries", archive.len());

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        match archive.by_index_raw(i) {
            Ok(entry) if !entry.is_dir() => {
                log::debug!("Zip entry: {} ({} bytes)", entry.name(), entry.size());
                names.push((i, entry.name().to_lowercase()));
            }
            Ok(_) => {}
            Err(e) => log::warn!("Failed to read zip entry {}: {}", i, e),
        }
    }

    // 跳过 macOS 打包时附带的资源文件
    names.retain(|(_, name)| !name.starts_with("__macosx/"));

    let index = extensions
        .iter()
        .find_map(|ext| names.iter().find(|(_, name)| name.ends_with(ext)))
        .map(|(i, _)| *i)?;

    let mut entry = match archive.by_index(index) {
        Ok(entry) => entry,
        Err(e) => {
            log::warn!("Failed to open zip entry {}: {}", index, e);
            return None;
        }
    };

    let mut content = Vec::new();
    if let Err(e) = entry.read_to_end(&mut content) {
        log::warn!("Failed to extract {}: {}", entry.name(), e);
        return None;
    }

    log::debug!("Extracted {} bytes from {}", content.len(), entry.name());
    Some(content)
}

/// 测试用：在内存中构建 ZIP
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
