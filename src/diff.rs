//! Line-level diff computation between prompt versions
//!
//! This module computes a minimal line-by-line edit script between two texts
//! using a dynamic programming approach to find the Longest Common
//! Subsequence (LCS), then coalesces the resulting operations into
//! contiguous segments.
//!
//! ## Overview
//!
//! Lines keep their trailing terminator characters, so concatenating segment
//! texts reconstructs the inputs byte-for-byte: the `added` + `unchanged`
//! segments rebuild the new text, and `removed` + `unchanged` rebuild the
//! old one. This makes the output directly renderable as an inline diff.
//!
//! Complexity is O(m·n) in time and space over line counts, which is fine
//! for interactive, human-scale prompt text.
//!
//! ## Examples
//!
//! ```rust
//! use promptvault::diff::{diff_lines, SegmentKind};
//!
//! let segments = diff_lines("a\nb\nc", "a\nc\nd");
//! let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         SegmentKind::Unchanged,
//!         SegmentKind::Removed,
//!         SegmentKind::Unchanged,
//!         SegmentKind::Added,
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Classification of one diff segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Present only in the new text
    Added,
    /// Present only in the old text
    Removed,
    /// Common to both texts
    Unchanged,
}

/// One or more contiguous lines sharing a classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    /// Segment classification
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    /// Concatenated line text, terminators included
    pub text: String,
}

/// Compute a line-level diff between two texts
///
/// Returns segments in document order. Identical inputs produce a single
/// unchanged segment (or nothing when both are empty); an empty old text
/// against a non-empty new text yields a single added segment, and
/// symmetrically for removal.
pub fn diff_lines(old_text: &str, new_text: &str) -> Vec<DiffSegment> {
    // Identical texts short-circuit the table entirely
    if old_text == new_text {
        if old_text.is_empty() {
            return Vec::new();
        }
        return vec![DiffSegment {
            kind: SegmentKind::Unchanged,
            text: old_text.to_string(),
        }];
    }

    let old_lines = split_lines(old_text);
    let new_lines = split_lines(new_text);

    let m = old_lines.len();
    let n = new_lines.len();

    // dp[i][j] = LCS length of old_lines[..i] and new_lines[..j]
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if old_lines[i - 1] == new_lines[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    // Backtrack from the corner; ties between an addition and a removal
    // resolve toward the addition (consume from the new sequence first)
    let mut ops: Vec<(SegmentKind, &str)> = Vec::with_capacity(m + n);
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            ops.push((SegmentKind::Unchanged, old_lines[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            ops.push((SegmentKind::Added, new_lines[j - 1]));
            j -= 1;
        } else {
            ops.push((SegmentKind::Removed, old_lines[i - 1]));
            i -= 1;
        }
    }
    ops.reverse();

    // Coalesce consecutive operations of the same kind into segments
    let mut segments: Vec<DiffSegment> = Vec::new();
    for (kind, line) in ops {
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(line),
            _ => segments.push(DiffSegment {
                kind,
                text: line.to_string(),
            }),
        }
    }

    segments
}

/// Split text into lines, keeping the terminator on each line
///
/// `"a\nb\n"` => `["a\n", "b\n"]`, `"a\nb"` => `["a\n", "b"]`, `""` => `[]`.
/// The final line carries no terminator when the input lacks one, which is
/// what makes concatenation-based reconstruction exact.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(&text[start..=idx]);
            start = idx + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(segments: &[DiffSegment], keep: SegmentKind) -> String {
        segments
            .iter()
            .filter(|s| s.kind == keep || s.kind == SegmentKind::Unchanged)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert_eq!(split_lines(""), Vec::<&str>::new());
        assert_eq!(split_lines("\n"), vec!["\n"]);
    }

    #[test]
    fn test_identical_texts() {
        let segments = diff_lines("a\nb\nc", "a\nb\nc");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Unchanged);
        assert_eq!(segments[0].text, "a\nb\nc");
    }

    #[test]
    fn test_both_empty() {
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn test_old_empty() {
        let segments = diff_lines("", "new\ncontent");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Added);
        assert_eq!(segments[0].text, "new\ncontent");
    }

    #[test]
    fn test_new_empty() {
        let segments = diff_lines("old\ncontent", "");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Removed);
        assert_eq!(segments[0].text, "old\ncontent");
    }

    #[test]
    fn test_mixed_edit() {
        let segments = diff_lines("a\nb\nc", "a\nc\nd");
        assert_eq!(
            segments,
            vec![
                DiffSegment {
                    kind: SegmentKind::Unchanged,
                    text: "a\n".to_string()
                },
                DiffSegment {
                    kind: SegmentKind::Removed,
                    text: "b\n".to_string()
                },
                DiffSegment {
                    kind: SegmentKind::Unchanged,
                    text: "c\n".to_string()
                },
                DiffSegment {
                    kind: SegmentKind::Added,
                    text: "d".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_reconstruction() {
        let old = "alpha\nbeta\ngamma\ndelta";
        let new = "alpha\ngamma\ndelta\nepsilon\n";
        let segments = diff_lines(old, new);
        assert_eq!(reconstruct(&segments, SegmentKind::Removed), old);
        assert_eq!(reconstruct(&segments, SegmentKind::Added), new);
    }

    #[test]
    fn test_trailing_newline_change() {
        // Only the terminator on the last line differs
        let segments = diff_lines("a\nb", "a\nb\n");
        assert_eq!(reconstruct(&segments, SegmentKind::Removed), "a\nb");
        assert_eq!(reconstruct(&segments, SegmentKind::Added), "a\nb\n");
    }

    #[test]
    fn test_segment_wire_format() {
        let json = serde_json::to_value(DiffSegment {
            kind: SegmentKind::Unchanged,
            text: "a\n".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "unchanged");
        assert_eq!(json["text"], "a\n");
    }
}
