//! Occurrence counting and snippet extraction / 出现次数统计与片段提取
//!
//! All positions are character positions. Case folding maps every character
//! to exactly one character, so a folded string lines up with its original
//! position-for-position and snippets can be cut from the original text.

use super::schema::{TextMatch, TextRow, UNKNOWN};

const ELLIPSIS: &str = "...";

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Lower-case text one character at a time / 逐字符转小写
pub fn fold_case(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Count non-overlapping occurrences scanning left to right / 统计不重叠出现次数
pub fn count_occurrences(folded_content: &str, folded_term: &str) -> u64 {
    if folded_term.is_empty() {
        return 0;
    }
    folded_content.matches(folded_term).count() as u64
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

/// Collapse whitespace runs into single spaces / 合并连续空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut up to `max_snippets` context windows around successive matches.
///
/// Each window spans `context_chars` characters either side of the match in
/// the original-case content. Windows that do not reach the start or end of
/// the content are marked with `...` on that side.
pub fn extract_snippets(
    content: &str,
    folded_term: &str,
    max_snippets: usize,
    context_chars: usize,
) -> Vec<String> {
    let original: Vec<char> = content.chars().collect();
    let folded: Vec<char> = original.iter().map(|&c| fold_char(c)).collect();
    let needle: Vec<char> = folded_term.chars().collect();

    let mut snippets = Vec::new();
    if needle.is_empty() || needle.len() > folded.len() {
        return snippets;
    }

    let mut from = 0;
    while snippets.len() < max_snippets {
        let Some(pos) = find_from(&folded, &needle, from) else {
            break;
        };
        let start = pos.saturating_sub(context_chars);
        let end = (pos + needle.len() + context_chars).min(original.len());

        let window: String = original[start..end].iter().collect();
        let mut snippet = collapse_whitespace(&window);
        if start > 0 {
            snippet.insert_str(0, ELLIPSIS);
        }
        if end < original.len() {
            snippet.push_str(ELLIPSIS);
        }
        snippets.push(snippet);

        from = pos + needle.len();
    }
    snippets
}

/// Turn a candidate row into a match, or `None` if the term does not occur.
pub fn build_match(
    row: TextRow,
    folded_term: &str,
    max_snippets: usize,
    context_chars: usize,
) -> Option<TextMatch> {
    let content = row.content.unwrap_or_default();
    let count = count_occurrences(&fold_case(&content), folded_term);
    if count == 0 {
        return None;
    }

    let or_unknown = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| UNKNOWN.to_string());
    Some(TextMatch {
        display_name: row.display_name,
        tradition: or_unknown(row.tradition),
        author: or_unknown(row.author),
        period: or_unknown(row.period),
        count,
        snippets: extract_snippets(&content, folded_term, max_snippets, context_chars),
    })
}
