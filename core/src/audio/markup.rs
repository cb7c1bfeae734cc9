//! Markdown cleanup so generated notices read naturally when spoken.

/// Paired delimiters removed in order. `**` must run before `*`.
const PAIRED_DELIMITERS: [&str; 5] = ["**", "*", "_", "~~", "`"];

/// Strip bold/italic/strikethrough/code-span delimiters and heading markers,
/// collapse whitespace runs to single spaces, and trim.
pub fn clean_text_for_speech(text: &str) -> String {
    let mut out = text.to_string();
    for delim in PAIRED_DELIMITERS {
        out = strip_paired(&out, delim);
    }
    out = strip_headings(&out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace `<delim>inner<delim>` with `inner`. Pairs never span a line break;
/// an unmatched delimiter is kept as-is.
fn strip_paired(text: &str, delim: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after_open) = rest.strip_prefix(delim) {
            let line_end = after_open.find('\n').unwrap_or(after_open.len());
            if let Some(close) = after_open[..line_end].find(delim) {
                out.push_str(&after_open[..close]);
                rest = &after_open[close + delim.len()..];
                continue;
            }
        }
        // Advance one char; delimiters are ASCII so byte slicing stays on boundaries.
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Drop leading `#`-runs that are followed by whitespace at the start of a line
fn strip_headings(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let hashes = line.len() - line.trim_start_matches('#').len();
            if hashes == 0 {
                return line;
            }
            let after = &line[hashes..];
            match after.chars().next() {
                Some(c) if c.is_whitespace() => &after[c.len_utf8()..],
                _ => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
