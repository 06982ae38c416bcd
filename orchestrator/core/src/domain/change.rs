// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

// Change records are the shared unit of work for a review batch. They are
// produced once by the diff parser and handed to every agent as a read-only
// view; nothing downstream mutates them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One added or changed line extracted from a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Path of the file on the new side of the diff
    pub file_path: String,

    /// Target line number; 0 means the parser could not resolve it
    pub line_number: u32,

    /// Raw text of the line, without the leading `+`
    pub content: String,
}

impl ChangeRecord {
    pub fn new(file_path: impl Into<String>, line_number: u32, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
            content: content.into(),
        }
    }
}

/// Group changes by file path, preserving per-file line order.
pub fn group_by_file(changes: &[ChangeRecord]) -> BTreeMap<&str, Vec<&ChangeRecord>> {
    let mut grouped: BTreeMap<&str, Vec<&ChangeRecord>> = BTreeMap::new();
    for change in changes {
        grouped.entry(change.file_path.as_str()).or_default().push(change);
    }
    grouped
}

/// Detect the programming language from a file extension.
pub fn detect_language(file_path: &str) -> &'static str {
    match Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("py") => "python",
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("java") => "java",
        Some("go") => "go",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("c") => "c",
        Some("cpp") | Some("cc") | Some("cxx") => "cpp",
        Some("cs") => "csharp",
        Some("rs") => "rust",
        Some("swift") => "swift",
        Some("kt") => "kotlin",
        _ => "unknown",
    }
}

const SKIP_PATTERNS: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "Pipfile.lock",
    "poetry.lock",
    "Cargo.lock",
    ".min.js",
    ".min.css",
    "dist/",
    "build/",
    "__pycache__/",
    ".pyc",
];

/// Lockfiles and generated artifacts are not worth an agent's attention.
pub fn should_skip_file(file_path: &str) -> bool {
    SKIP_PATTERNS.iter().any(|pattern| file_path.contains(pattern))
}
