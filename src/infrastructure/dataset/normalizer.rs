// ============================================================
// THOUSANDS-SEPARATOR NORMALIZER
// ============================================================
// Tell a comma inside a number apart from a comma between fields

use crate::domain::dataset::Delimiter;

/// Text ready for the tabular parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize raw text for the given delimiter.
///
/// - comma: digit-group commas (`1,234,567`) are removed from data lines
/// - space: runs of spaces collapse to one and lines are trimmed
/// - semicolon/tab: unchanged, the two symbols never collide
///
/// Digit groups are never stripped from the header (first non-empty line).
pub fn normalize(text: &str, delimiter: Delimiter) -> NormalizedText {
    if matches!(delimiter, Delimiter::Semicolon | Delimiter::Tab) {
        return NormalizedText(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut seen_header = false;

    for segment in text.split_inclusive('\n') {
        let (line, ending) = split_line_ending(segment);
        let is_header = !seen_header && !line.trim().is_empty();
        seen_header |= is_header;

        match delimiter {
            Delimiter::Comma if !is_header => out.push_str(&strip_thousands_separators(line)),
            Delimiter::Space => out.push_str(&collapse_spaces(line)),
            _ => out.push_str(line),
        }
        out.push_str(ending);
    }

    NormalizedText(out)
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}

/// Remove commas used as digit-group separators.
///
/// A comma is dropped when it follows a group head of 1-3 digits (not
/// itself preceded by a digit or a decimal point) or a previously dropped
/// group, and is followed by exactly three digits and then a non-digit or
/// the end of the line.
pub fn strip_thousands_separators(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut last_dropped: Option<usize> = None;

    for (i, &c) in chars.iter().enumerate() {
        if c == ',' && is_group_separator(&chars, i, last_dropped) {
            last_dropped = Some(i);
            continue;
        }
        out.push(c);
    }

    out
}

fn is_group_separator(chars: &[char], i: usize, last_dropped: Option<usize>) -> bool {
    // Digits immediately before the comma
    let run = chars[..i]
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if run == 0 || run > 3 {
        return false;
    }

    let before = i.checked_sub(run + 1).map(|idx| (idx, chars[idx]));
    let head_ok = match before {
        None => true,
        Some((idx, ',')) if last_dropped == Some(idx) => run == 3,
        Some((_, c)) => c != '.' && !c.is_ascii_digit(),
    };
    if !head_ok {
        return false;
    }

    let after = &chars[i + 1..];
    after.len() >= 3
        && after[..3].iter().all(|c| c.is_ascii_digit())
        && after.get(3).map_or(true, |c| !c.is_ascii_digit())
}

fn collapse_spaces(line: &str) -> String {
    line.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
