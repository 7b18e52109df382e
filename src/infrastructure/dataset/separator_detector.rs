// ============================================================
// SEPARATOR DETECTOR
// ============================================================
// Infer the column delimiter from a sample of lines

use crate::domain::dataset::Delimiter;

#[derive(Debug, Clone, Copy, Default)]
struct CandidateStats {
    total: usize,
    lines_present: usize,
}

/// Counts candidate delimiters over the first N non-empty lines
#[derive(Debug, Clone)]
pub struct SeparatorDetector {
    sample_lines: usize,
}

impl Default for SeparatorDetector {
    fn default() -> Self {
        Self { sample_lines: 5 }
    }
}

impl SeparatorDetector {
    pub fn new(sample_lines: usize) -> Self {
        Self {
            sample_lines: sample_lines.max(1),
        }
    }

    /// Detect the delimiter. Never fails: comma is the fallback.
    ///
    /// Textual candidates present on every sampled line win over the rest,
    /// the higher total count wins among equals, and ties resolve in the
    /// order comma, semicolon, tab. Space is only considered when no textual
    /// candidate occurs anywhere, and only if it occurs on most sampled lines
    /// (a title or malformed line may lack it).
    pub fn detect(&self, text: &str) -> Delimiter {
        let sample: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(self.sample_lines)
            .collect();

        if sample.is_empty() {
            return Delimiter::Comma;
        }

        let stats: Vec<(Delimiter, CandidateStats)> = Delimiter::TEXTUAL
            .iter()
            .map(|&d| (d, collect_stats(&sample, d.as_char())))
            .collect();

        let consistent = best_by_total(
            stats
                .iter()
                .filter(|(_, s)| s.total > 0 && s.lines_present == sample.len()),
        );
        if let Some(delimiter) = consistent {
            return delimiter;
        }

        if let Some(delimiter) = best_by_total(stats.iter().filter(|(_, s)| s.total > 0)) {
            return delimiter;
        }

        let space = collect_stats(&sample, ' ');
        if space.lines_present * 2 > sample.len() {
            return Delimiter::Space;
        }

        Delimiter::Comma
    }
}

/// Highest total wins; on a tie the earlier candidate is kept
fn best_by_total<'a>(
    candidates: impl Iterator<Item = &'a (Delimiter, CandidateStats)>,
) -> Option<Delimiter> {
    let mut best: Option<&(Delimiter, CandidateStats)> = None;
    for candidate in candidates {
        if best.map_or(true, |b| candidate.1.total > b.1.total) {
            best = Some(candidate);
        }
    }
    best.map(|(d, _)| *d)
}

fn collect_stats(lines: &[&str], needle: char) -> CandidateStats {
    let mut stats = CandidateStats::default();
    for line in lines {
        let count = count_outside_quotes(line.trim(), needle);
        stats.total += count;
        if count > 0 {
            stats.lines_present += 1;
        }
    }
    stats
}

fn count_outside_quotes(line: &str, needle: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == needle && !in_quotes {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_candidate() {
        let detector = SeparatorDetector::default();
        assert_eq!(detector.detect("a,b,c\n1,2,3\n4,5,6"), Delimiter::Comma);
        assert_eq!(detector.detect("a;b;c\n1;2;3\n4;5;6"), Delimiter::Semicolon);
        assert_eq!(detector.detect("a\tb\tc\n1\t2\t3"), Delimiter::Tab);
        assert_eq!(detector.detect("a b c\n1 2 3\n4 5 6"), Delimiter::Space);
    }

    #[test]
    fn test_empty_and_single_column_default_to_comma() {
        let detector = SeparatorDetector::default();
        assert_eq!(detector.detect(""), Delimiter::Comma);
        assert_eq!(detector.detect("\n  \n"), Delimiter::Comma);
        assert_eq!(detector.detect("value\n1\n2"), Delimiter::Comma);
    }

    #[test]
    fn test_textual_beats_space() {
        let detector = SeparatorDetector::default();
        let text = "city,note\nRome,big old city\nTurin,north west";
        assert_eq!(detector.detect(text), Delimiter::Comma);
    }

    #[test]
    fn test_free_text_with_spaces_stays_single_column() {
        let detector = SeparatorDetector::default();
        assert_eq!(detector.detect("name\nJohn Smith\nAnna\nMarco"), Delimiter::Comma);
        assert_eq!(detector.detect("name\nJohn Smith\nAnna"), Delimiter::Comma);
    }

    #[test]
    fn test_space_on_most_lines_wins() {
        let detector = SeparatorDetector::default();
        assert_eq!(detector.detect("readings\n1 2 3\n4 5 6\n7 8 9"), Delimiter::Space);
        assert_eq!(detector.detect("x y\n1 2\n3 4"), Delimiter::Space);
    }

    #[test]
    fn test_semicolon_with_decimal_commas() {
        // Commas outnumber semicolons but only semicolons appear on every line
        let detector = SeparatorDetector::default();
        let text = "a;b\n1,5;2,5\n3,5;4,5\n5,5;6,5";
        assert_eq!(detector.detect(text), Delimiter::Semicolon);
    }

    #[test]
    fn test_ignores_quoted_delimiters() {
        let detector = SeparatorDetector::default();
        let text = "name;comment\n\"Rossi\";\"a, b, c, d\"\n\"Bianchi\";\"e, f\"";
        assert_eq!(detector.detect(text), Delimiter::Semicolon);
    }

    #[test]
    fn test_malformed_header_does_not_decide() {
        let detector = SeparatorDetector::new(5);
        let text = "report exported 2024\na;b;c\n1;2;3\n4;5;6\n7;8;9";
        assert_eq!(detector.detect(text), Delimiter::Semicolon);
    }

    #[test]
    fn test_tie_prefers_comma() {
        let detector = SeparatorDetector::default();
        assert_eq!(detector.detect("a,b;c\n1,2;3"), Delimiter::Comma);
    }
}
