//! Page text normalization and PDF string decoding.

use std::sync::LazyLock;

use regex::Regex;

/// Normalize raw extracted page text.
///
/// Invisible and non-breaking spaces become plain spaces, runs of spaces are
/// collapsed, lines are trimmed, and blank-line runs shrink to one blank line.
pub fn clean_page_text(raw: &str) -> String {
    static MULTI_SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let mapped: String = raw
        .chars()
        .map(|c| match c {
            '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
            '\r' => '\n',
            c if c.is_control() && c != '\n' => ' ',
            c => c,
        })
        .collect();

    let lines: Vec<String> = mapped
        .lines()
        .map(|line| MULTI_SPACE_RE.replace_all(line, " ").trim().to_string())
        .collect();

    MULTI_BLANK_RE
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise single-byte).
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // PDFDocEncoding agrees with Latin-1 for the printable range.
    bytes.iter().map(|&b| b as char).collect()
}

/// Collapse internal whitespace of a single-line label (heading, title).
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
