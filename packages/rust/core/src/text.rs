//! Term normalization and chunking shared by the scorer and the refiner.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Small English stopword list. Kept short on purpose: domain words such as
/// "guide" or "plan" must still count.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "do", "does", "each", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "may", "me", "more",
    "most", "my", "no", "not", "of", "on", "one", "or", "other", "our", "out", "over", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "to", "up", "us", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "will", "with", "would", "you", "your",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Bullet glyphs that start a new chunk when they begin a line.
const BULLETS: &[char] = &['•', '●', '▪', '◦', '‣', '-', '*', '–'];

/// Case-fold, strip punctuation, and drop stopwords and one-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    static WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid regex"));

    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 1 && !STOPWORD_SET.contains(word))
        .map(str::to_string)
        .collect()
}

/// Split a section body into sentence-sized chunks, in document order.
///
/// Paragraphs (blank-line separated) and bulleted lines never share a chunk.
/// Inside a paragraph, line breaks are joined and the text is cut after
/// `.`, `!` or `?` followed by whitespace.
pub fn split_chunks(body: &str) -> Vec<String> {
    let mut chunks = Vec::new();

    for block in split_blocks(body) {
        let joined = block.split_whitespace().collect::<Vec<_>>().join(" ");
        chunks.extend(split_sentences(&joined));
    }

    chunks
}

/// Paragraph and bullet blocks, each as raw text.
fn split_blocks(body: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in body.lines() {
        let trimmed = line.trim();
        let starts_bullet = trimmed.starts_with(BULLETS);

        if trimmed.is_empty() || starts_bullet {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.clear();
            if trimmed.is_empty() {
                continue;
            }
        }

        let content = if starts_bullet {
            trimmed.trim_start_matches(BULLETS).trim_start()
        } else {
            trimmed
        };
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(content);
    }

    if !current.trim().is_empty() {
        blocks.push(current);
    }

    blocks
}

fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    push_trimmed(&mut sentences, &paragraph[start..idx + c.len_utf8()]);
                    start = next_idx;
                }
            }
        }
    }
    push_trimmed(&mut sentences, &paragraph[start..]);

    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

/// Cut `text` to at most `max_chars` characters, preferring a word boundary.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let next_is_break = text
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);

    if next_is_break {
        return cut.trim_end().to_string();
    }

    match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => cut[..pos].trim_end().to_string(),
        _ => cut,
    }
}
