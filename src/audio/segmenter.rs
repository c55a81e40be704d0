//! Splits text into byte-budget-bound chunks on rune (char) boundaries,
//! preferring to break at the end of a sentence or clause near the end of
//! each chunk rather than mid-sentence.

use crate::config::constants::MAX_CHUNK_BYTES;

/// One chunk of the original text plus the rune (char) offset at which it
/// started in the source text. The offset is carried forward so per-chunk
/// SSML mark positions can be re-based into the original text's coordinate
/// space after synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub char_offset: usize,
}

const TERMINATORS: &[char] = &['\n', '。', '.', '!', '?', '！', '？'];

/// Split `text` into chunks no larger than `max_bytes` UTF-8 bytes each.
///
/// Within the last 20% of a chunk's byte budget, the split point backs up
/// to the nearest terminator so chunks tend to end on a sentence boundary;
/// otherwise it splits exactly at the byte budget.
pub fn split(text: &str, max_bytes: usize) -> Vec<TextChunk> {
    if text.len() <= max_bytes {
        return vec![TextChunk {
            text: text.to_string(),
            char_offset: 0,
        }];
    }

    let runes: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < runes.len() {
        let mut byte_count = 0usize;
        let mut end = start;

        while end < runes.len() {
            let rune_len = runes[end].len_utf8();
            if byte_count + rune_len > max_bytes {
                break;
            }
            byte_count += rune_len;
            end += 1;
        }

        if end == start {
            end = (start + 1).min(runes.len());
        }

        let min_boundary = start + (end - start) * 4 / 5;
        let mut split_at = end;
        let mut found = false;

        let mut i = end;
        while i > min_boundary {
            i -= 1;
            if TERMINATORS.contains(&runes[i]) {
                split_at = i + 1;
                found = true;
                break;
            }
        }

        if !found {
            split_at = end;
        }

        if split_at <= start {
            split_at = end.max(start + 1);
        }

        chunks.push(TextChunk {
            text: runes[start..split_at].iter().collect(),
            char_offset: start,
        });
        start = split_at;
    }

    chunks
}

/// Split using the default chunk budget the synthesis pipeline operates
/// under.
pub fn split_default(text: &str) -> Vec<TextChunk> {
    split(text, MAX_CHUNK_BYTES)
}
