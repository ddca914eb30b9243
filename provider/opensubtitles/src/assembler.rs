//! 搜索结果组装

use common::{SearchResult, SubtitleFormat};
use std::collections::HashSet;

use crate::PROVIDER_NAME;
use crate::id;
use crate::page::PartialCandidate;
use crate::query::SearchQuery;

/// 已解析详情页的候选：列表页中的序号、候选本身和文件名
pub type ResolvedCandidate = (usize, PartialCandidate, Option<String>);

/// 按列表页顺序组装搜索结果
///
/// 没有文件名的候选被丢弃，重复 ID 只保留第一次出现的，最后截断到 `max_results`。
/// 行上标注的语言与请求语言不同时，ID 与 `language_code` 都使用行上的语言。
pub fn assemble(
    query: &SearchQuery,
    mut resolved: Vec<ResolvedCandidate>,
    max_results: usize,
) -> Vec<SearchResult> {
    resolved.sort_by_key(|(index, _, _)| *index);

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(resolved.len().min(max_results));

    for (_, candidate, filename) in resolved {
        let Some(display_name) = filename else {
            continue;
        };

        let (id_language, language_code) = match candidate.language {
            Some(row) if row != query.catalog_language => {
                log::debug!(
                    "Row {} is flagged {} instead of {}, using row language",
                    candidate.catalog_id,
                    row,
                    query.catalog_language
                );
                (row.clone(), row)
            }
            _ => (query.language.clone(), query.catalog_language.clone()),
        };

        let id = id::encode(&id_language, &candidate.catalog_id);
        if !seen.insert(id.clone()) {
            log::debug!("Skipping duplicate result {}", id);
            continue;
        }

        results.push(SearchResult {
            id,
            display_name,
            provider_name: PROVIDER_NAME.to_string(),
            language_code,
            format: SubtitleFormat::Srt,
            is_hash_match: false,
        });
    }

    results.truncate(max_results);
    results
}
