//! Shared utility functions

use regex::{Captures, Regex};
use std::sync::OnceLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Safely truncate a string to at most `max_bytes` while respecting UTF-8 boundaries.
///
/// If the string is already shorter than `max_bytes`, returns it unchanged.
/// Otherwise, finds the last valid UTF-8 character boundary at or before `max_bytes`
/// and returns a slice up to that point.
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Fit `s` into `max_width` terminal columns, marking the cut with "..."
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    const ELLIPSIS: &str = "...";
    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(truncate_utf8_safe(ELLIPSIS, max_width));
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML to plain text
// ─────────────────────────────────────────────────────────────────────────────

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

fn line_break() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"(?i)<br\s*/?>")
}

fn block_end() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"(?i)</(p|div|h[1-6]|blockquote|pre|ul|ol|table|tr)\s*>")
}

fn list_item() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"(?i)<li[^>]*>")
}

fn any_tag() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"(?s)<[^>]*>")
}

fn entity() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);")
}

fn blank_runs() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r"\n{3,}")
}

fn decode_entity(caps: &Captures) -> String {
    let name = &caps[1];
    let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match name {
            "nbsp" => Some(' '),
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "hellip" => Some('…'),
            "mdash" => Some('—'),
            "ndash" => Some('–'),
            "rsquo" => Some('’'),
            "lsquo" => Some('‘'),
            "rdquo" => Some('”'),
            "ldquo" => Some('“'),
            "eacute" => Some('é'),
            _ => None,
        }
    };
    decoded.map_or_else(|| caps[0].to_string(), String::from)
}

/// Convert a message body from HTML into readable plain text
///
/// Block ends and `<br>` become line breaks, list items become bullets,
/// remaining tags are dropped and character references decoded.
pub fn html_to_text(html: &str) -> String {
    let text = line_break().replace_all(html, "\n");
    let text = block_end().replace_all(&text, "\n\n");
    let text = list_item().replace_all(&text, "\n• ");
    let text = any_tag().replace_all(&text, "");
    let text = entity().replace_all(&text, decode_entity);

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    blank_runs().replace_all(&joined, "\n\n").trim().to_string()
}
