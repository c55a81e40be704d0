//! Builds SSML with one `<mark>` per word so the upstream synthesizer can
//! report word-level timepoints, and tracks each word's rune-offset span so
//! those timepoints can be resolved back to positions in the source text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// A word's position in the chunk text, in both byte and rune (char)
/// coordinates. Rune coordinates are what a mark name like `"3:10:14"`
/// encodes; byte coordinates are only needed to slice the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_rune: usize,
    pub end_rune: usize,
}

/// Build `<speak>...</speak>` SSML for `text`, wrapping every run of
/// letters/digits in a numbered `<mark name="i"/>`, and return the rune-span
/// of each word in source order (mark index `i` corresponds to
/// `words[i]`).
pub fn build_with_marks(text: &str) -> (String, Vec<WordSpan>) {
    let mut ssml = String::from("<speak>");
    let mut words = Vec::new();

    let mut last_byte = 0usize;
    let mut rune_at_byte = byte_to_rune_index(text);

    for (i, m) in WORD_RE.find_iter(text).enumerate() {
        if m.start() > last_byte {
            ssml.push_str(&escape_xml(&text[last_byte..m.start()]));
        }

        ssml.push_str(&format!(r#"<mark name="{}"/>"#, i));
        ssml.push_str(&escape_xml(m.as_str()));

        words.push(WordSpan {
            start_byte: m.start(),
            end_byte: m.end(),
            start_rune: rune_at_byte(m.start()),
            end_rune: rune_at_byte(m.end()),
        });

        last_byte = m.end();
    }

    if last_byte < text.len() {
        ssml.push_str(&escape_xml(&text[last_byte..]));
    }

    ssml.push_str("</speak>");
    (ssml, words)
}

/// Escape the five XML-significant characters, in the order `& < > ' "`.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

/// Return a closure mapping a byte offset into `text` to the corresponding
/// rune (char) index, for offsets that land on a char boundary.
fn byte_to_rune_index(text: &str) -> impl Fn(usize) -> usize + '_ {
    move |byte_offset: usize| text[..byte_offset].chars().count()
}
