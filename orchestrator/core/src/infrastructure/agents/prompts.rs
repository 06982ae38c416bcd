// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Prompt templates for the built-in review agents.
//!
//! Every prompt demands the same strict JSON shape so one parser handles all
//! agent kinds.

use crate::application::registry::AgentKind;
use crate::domain::change::ChangeRecord;
use std::fmt::Write as _;

pub const SYSTEM_PROMPT: &str = r#"You are an expert code reviewer with deep knowledge of software engineering best practices, security, and performance optimization.

Your task is to analyze code changes and identify potential issues. Be thorough but practical - focus on real problems, not nitpicks.

You MUST respond with valid JSON in this exact format:
{
  "issues": [
    {
      "line": <line_number>,
      "severity": "critical|major|minor|info",
      "issue": "Brief description of the problem",
      "suggestion": "How to fix it"
    }
  ]
}

If no issues are found, return: {"issues": []}

Do not include any markdown formatting, explanations, or text outside the JSON structure."#;

/// Numbered code block the model can reference lines from.
pub fn code_block(changes: &[&ChangeRecord]) -> String {
    let mut block = String::new();
    for change in changes {
        let _ = writeln!(block, "Line {}: {}", change.line_number, change.content);
    }
    block
}

/// Build the analysis prompt for one agent kind over one file's changes.
pub fn analysis_prompt(kind: AgentKind, file_path: &str, language: &str, code_block: &str) -> String {
    let (focus, checklist) = match kind {
        AgentKind::Logic => (
            "LOGIC BUGS and POTENTIAL ERRORS",
            "\
- Null pointer/undefined access
- Off-by-one errors in loops and array indexing
- Incorrect conditionals (== vs ===, = vs ==)
- Missing edge case handling (empty arrays, null values, boundary conditions)
- Logic inversions (wrong boolean logic, negation errors)
- Unreachable code
- Incorrect loop termination conditions
- Type mismatches
- Unhandled exceptions",
        ),
        AgentKind::Security => (
            "SECURITY VULNERABILITIES",
            "\
- SQL injection vulnerabilities (string concatenation in queries)
- Cross-Site Scripting (XSS) risks
- Hardcoded secrets, API keys, passwords, tokens
- Unsafe deserialization
- Command injection
- Path traversal vulnerabilities
- Insecure authentication/authorization
- Cryptographic weaknesses
- Missing input validation
- Insecure random number generation
- Information disclosure",
        ),
        AgentKind::Performance => (
            "PERFORMANCE ISSUES",
            "\
- N+1 query problems (loops with database calls)
- Inefficient algorithms (O(n^2) when O(n log n) possible)
- Unnecessary nested loops
- Memory leaks (unclosed resources, circular references)
- Excessive object creation in loops
- Missing pagination for large datasets
- Blocking I/O in hot paths
- Inefficient data structures
- Redundant computations
- Missing caching opportunities",
        ),
        AgentKind::Readability => (
            "READABILITY and CODE QUALITY",
            "\
- Poor variable/function naming (too generic like 'tmp', 'data', 'var', 'x')
- High complexity (deeply nested conditions, long functions)
- Missing or misleading comments
- Magic numbers without explanation
- Poor error messages
- Confusing logic flow
- Abbreviations that reduce clarity
- Functions that do too many things",
        ),
        AgentKind::CodeQuality => (
            "CODE QUALITY and BEST PRACTICES",
            "\
- Lines exceeding 120 characters
- Debug statements (print, console.log, debugger)
- Commented-out code that should be removed
- TODO/FIXME comments without context
- Missing error handling (bare try-except, no catch)
- Duplicate code
- Violations of DRY principle
- Inconsistent formatting
- Missing documentation for complex logic",
        ),
    };

    format!(
        r#"Analyze this code change for {focus}:

File: {file_path}
Language: {language}

Code Changes:
```
{code_block}
```

Look for:
{checklist}

Return valid JSON only:
{{
  "issues": [
    {{
      "line": <line_number>,
      "severity": "critical|major|minor|info",
      "issue": "Brief description of the problem",
      "suggestion": "How to fix it"
    }}
  ]
}}

If no issues, return: {{"issues": []}}"#
    )
}
