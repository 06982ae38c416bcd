// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Lenient unified-diff parsing.
//!
//! Extracts added lines with file path and target line number. Malformed
//! input degrades instead of failing: a hunk header that does not parse
//! resets line tracking (subsequent additions carry line 0, "unknown"), and
//! additions outside any file header are dropped.

use crate::domain::change::ChangeRecord;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn hunk_header() -> &'static Regex {
    static HUNK: OnceLock<Regex> = OnceLock::new();
    // @@ -old_start[,old_count] +new_start[,new_count] @@
    HUNK.get_or_init(|| Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("valid hunk regex"))
}

/// Parse a unified diff into the added/changed lines consumers review.
pub fn parse_diff(diff_text: &str) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();
    let mut current_file: Option<String> = None;
    let mut target_line: Option<u32> = None;

    for line in diff_text.lines() {
        if let Some(rest) = line.strip_prefix("+++ ") {
            current_file = parse_file_path(rest);
            target_line = None;
            continue;
        }
        if line.starts_with("--- ") || line.starts_with("diff --git") || line.starts_with("index ") {
            continue;
        }
        if line.starts_with("@@") {
            target_line = match hunk_header().captures(line) {
                Some(caps) => caps[1].parse().ok(),
                None => {
                    debug!(header = %line, "unparseable hunk header, line numbers unknown");
                    None
                }
            };
            continue;
        }
        if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        match line.as_bytes().first() {
            Some(b'+') => {
                if let Some(file_path) = &current_file {
                    changes.push(ChangeRecord::new(
                        file_path.clone(),
                        target_line.unwrap_or(0),
                        &line[1..],
                    ));
                }
                target_line = target_line.map(|n| n + 1);
            }
            Some(b'-') => {}
            // Context lines advance the target side too
            _ => target_line = target_line.map(|n| n + 1),
        }
    }

    changes
}

/// Strip the conventional `a/`/`b/` prefix; `/dev/null` means "no file".
fn parse_file_path(raw: &str) -> Option<String> {
    let raw = raw.split('\t').next().unwrap_or(raw).trim();
    if raw == "/dev/null" {
        return None;
    }
    let path = raw.strip_prefix("b/").or_else(|| raw.strip_prefix("a/")).unwrap_or(raw);
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_DIFF: &str = "\
diff --git a/app/main.py b/app/main.py
index 83db48f..bf269f4 100644
--- a/app/main.py
+++ b/app/main.py
@@ -10,3 +10,5 @@ def handler():
 context line
-removed line
+added_one = 1
 another context
+added_two = 2
";

    #[test]
    fn test_added_lines_with_target_numbers() {
        let changes = parse_diff(SIMPLE_DIFF);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], ChangeRecord::new("app/main.py", 11, "added_one = 1"));
        assert_eq!(changes[1], ChangeRecord::new("app/main.py", 13, "added_two = 2"));
    }

    #[test]
    fn test_multiple_files_and_hunks() {
        let diff = "\
--- a/a.py
+++ b/a.py
@@ -1,2 +1,3 @@
 keep
+first
@@ -20,0 +21,1 @@
+second
--- a/b.py
+++ b/b.py
@@ -5 +5 @@
-old
+third
";
        let changes = parse_diff(diff);

        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], ChangeRecord::new("a.py", 2, "first"));
        assert_eq!(changes[1], ChangeRecord::new("a.py", 21, "second"));
        assert_eq!(changes[2], ChangeRecord::new("b.py", 5, "third"));
    }

    #[test]
    fn test_new_file_against_dev_null() {
        let diff = "\
--- /dev/null
+++ b/new.py
@@ -0,0 +1,2 @@
+line one
+line two
";
        let changes = parse_diff(diff);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].file_path, "new.py");
        assert_eq!(changes[0].line_number, 1);
        assert_eq!(changes[1].line_number, 2);
    }

    #[test]
    fn test_deleted_file_yields_nothing() {
        let diff = "\
--- a/gone.py
+++ /dev/null
@@ -1,2 +0,0 @@
-bye
-bye again
";
        assert!(parse_diff(diff).is_empty());
    }

    #[test]
    fn test_malformed_hunk_header_degrades_to_line_zero() {
        let diff = "\
+++ b/odd.py
@@ mangled header @@
+orphan line
";
        let changes = parse_diff(diff);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].line_number, 0);
        assert_eq!(changes[0].content, "orphan line");
    }

    #[test]
    fn test_garbage_input_is_not_fatal() {
        assert!(parse_diff("this is not a diff at all\njust prose\n").is_empty());
        assert!(parse_diff("").is_empty());
    }

    #[test]
    fn test_no_newline_marker_is_ignored() {
        let diff = "\
+++ b/f.py
@@ -1 +1 @@
-old
+new
\\ No newline at end of file
";
        let changes = parse_diff(diff);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].content, "new");
    }
}
