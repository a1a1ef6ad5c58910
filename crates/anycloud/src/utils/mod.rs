//! Shared helpers: secret redaction, the HTTP wire log, and small
//! formatting utilities.

pub mod http_log;
mod redact;

pub use redact::{REDACTED_HEADER, REDACTED_VALUE, redact_headers, redact_value};

/// Clip `text` to `limit` characters, appending a marker with the number of
/// characters dropped.
pub fn truncate_text(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    let clipped: String = text.chars().take(limit).collect();
    format!("{clipped}...[truncated {} chars]", count - limit)
}

/// Human-readable byte count, `1536` -> `"1.50KB"`.
pub fn format_bytes(num: u64) -> String {
    const STEP: f64 = 1024.0;
    let mut size = num as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < STEP {
            return format!("{size:.2}{unit}");
        }
        size /= STEP;
    }
    format!("{size:.2}PB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 4), "abcd...[truncated 2 chars]");
    }

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        let text = "héllo wörld";
        assert_eq!(truncate_text(text, 11), text);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512.00B");
        assert_eq!(format_bytes(1536), "1.50KB");
        assert_eq!(format_bytes(128 * 1024 * 1024), "128.00MB");
    }
}
