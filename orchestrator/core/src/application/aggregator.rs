// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! # Aggregator
//!
//! Pure fold of collected agent results into one [`Report`]:
//!
//! 1. flatten findings from completed results, in collection order
//! 2. deduplicate on `(file, line, comment)` — first occurrence wins
//! 3. drop findings below the severity floor
//! 4. build summary statistics
//! 5. group by file, then severity, merging same `(agent, comment)` entries
//!    across lines and capping each bucket
//!
//! No I/O happens here. Given the same results list the output is identical;
//! arrival order only decides first-occurrence tie-breaks in step 2.

use crate::domain::config::ReviewConfig;
use crate::domain::finding::{Finding, Severity};
use crate::domain::result::{AgentResult, MergedFinding, Report, ReviewSummary};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::warn;

/// Fold agent results into the final report.
pub fn aggregate(results: &[AgentResult], config: &ReviewConfig, elapsed: Duration) -> Report {
    let successful = results.iter().filter(|r| r.succeeded()).count();

    // Findings are taken from completed results only; a failed or timed-out
    // agent contributes nothing (discard-on-failure policy).
    let flattened: Vec<&Finding> = results
        .iter()
        .filter(|r| r.succeeded())
        .flat_map(|r| r.findings.iter())
        .collect();

    let mut seen = HashSet::new();
    let mut unique: Vec<&Finding> = Vec::with_capacity(flattened.len());
    for finding in flattened {
        if seen.insert(finding.dedup_key()) {
            unique.push(finding);
        }
    }

    if config.min_severity != Severity::Info {
        unique.retain(|f| f.severity.at_least(config.min_severity));
    }

    let (files, truncated) = structure(&unique, config.max_comments_per_file);

    Report {
        summary: build_summary(&unique, successful, results.len(), elapsed, truncated),
        files,
        agents: results.iter().map(Into::into).collect(),
    }
}

fn build_summary(
    findings: &[&Finding],
    successful_agents: usize,
    total_agents: usize,
    elapsed: Duration,
    truncated: usize,
) -> ReviewSummary {
    let count = |severity| findings.iter().filter(|f| f.severity == severity).count();
    let critical = count(Severity::Critical);
    let major = count(Severity::Major);
    let minor = count(Severity::Minor);
    let info = count(Severity::Info);
    let total = findings.len();

    let message = if total == 0 {
        "No issues detected by automated review agents.".to_string()
    } else {
        format!(
            "Found {total} potential issue(s) in {:.1}s ({successful_agents}/{total_agents} agents): \
             {critical} critical, {major} major, {minor} minor, {info} informational.",
            elapsed.as_secs_f64(),
        )
    };

    ReviewSummary {
        total_comments: total,
        critical,
        major,
        minor,
        info,
        message,
        elapsed_seconds: elapsed.as_secs_f64(),
        successful_agents,
        total_agents,
        truncated,
    }
}

type FileBuckets = BTreeMap<String, BTreeMap<Severity, Vec<MergedFinding>>>;

/// Group findings by file then severity, merging entries that share
/// `(agent, comment)` into one [`MergedFinding`] with accumulated lines.
/// First-seen order is preserved within each bucket; the per-bucket cap drops
/// the latest-produced entries and reports how many were cut.
fn structure(findings: &[&Finding], max_per_bucket: usize) -> (FileBuckets, usize) {
    let mut files: FileBuckets = BTreeMap::new();

    for finding in findings {
        let bucket = files
            .entry(finding.file_path.clone())
            .or_default()
            .entry(finding.severity)
            .or_default();

        match bucket
            .iter_mut()
            .find(|m| m.agent == finding.agent && m.comment == finding.comment)
        {
            Some(merged) => {
                if !merged.lines.contains(&finding.line_number) {
                    merged.lines.push(finding.line_number);
                }
            }
            None => bucket.push(MergedFinding {
                agent: finding.agent.clone(),
                comment: finding.comment.clone(),
                suggestion: finding.suggestion.clone(),
                lines: vec![finding.line_number],
            }),
        }
    }

    let mut truncated = 0;
    for (file_path, by_severity) in &mut files {
        for (severity, bucket) in by_severity.iter_mut() {
            if bucket.len() > max_per_bucket {
                warn!(
                    file = %file_path,
                    severity = %severity,
                    comments = bucket.len(),
                    cap = max_per_bucket,
                    "truncating file bucket"
                );
                truncated += bucket.len() - max_per_bucket;
                bucket.truncate(max_per_bucket);
            }
        }
    }

    (files, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::AgentOutcome;

    fn finding(agent: &str, file: &str, line: u32, severity: Severity, comment: &str) -> Finding {
        Finding {
            file_path: file.to_string(),
            line_number: line,
            severity,
            agent: agent.to_string(),
            comment: comment.to_string(),
            suggestion: Some("fix it".to_string()),
        }
    }

    fn completed(agent: &str, findings: Vec<Finding>) -> AgentResult {
        AgentResult::completed(agent, findings, Duration::from_millis(120))
    }

    #[test]
    fn test_exact_duplicates_collapse_to_one() {
        // Two agents agree on ("auth.py", 12, "hardcoded secret").
        let results = vec![
            completed(
                "security_agent",
                vec![finding("security_agent", "auth.py", 12, Severity::Critical, "hardcoded secret")],
            ),
            completed(
                "code_quality_agent",
                vec![finding("code_quality_agent", "auth.py", 12, Severity::Critical, "hardcoded secret")],
            ),
        ];

        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(1));

        assert_eq!(report.summary.total_comments, 1);
        assert_eq!(report.summary.critical, 1);
        let bucket = &report.files["auth.py"][&Severity::Critical];
        assert_eq!(bucket.len(), 1);
        // First occurrence wins, including attribution
        assert_eq!(bucket[0].agent, "security_agent");
    }

    #[test]
    fn test_timed_out_agent_contributes_nothing() {
        // One agent times out, the other completes with 2 findings.
        let results = vec![
            AgentResult::timed_out("agent_x", Duration::from_secs(60)),
            completed(
                "agent_y",
                vec![
                    finding("agent_y", "api.py", 3, Severity::Major, "unchecked input"),
                    finding("agent_y", "api.py", 8, Severity::Minor, "magic number"),
                ],
            ),
        ];

        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(2));

        assert_eq!(report.summary.successful_agents, 1);
        assert_eq!(report.summary.total_agents, 2);
        assert_eq!(report.summary.total_comments, 2);
        let all_agents: Vec<_> = report
            .files
            .values()
            .flat_map(|s| s.values())
            .flatten()
            .map(|m| m.agent.as_str())
            .collect();
        assert!(all_agents.iter().all(|&a| a == "agent_y"));
    }

    #[test]
    fn test_bucket_cap_truncates_and_signals() {
        // 25 distinct findings under the default cap of 20.
        let findings: Vec<Finding> = (0..25)
            .map(|i| finding("agent", "big.py", i + 1, Severity::Minor, &format!("issue {i}")))
            .collect();
        let results = vec![completed("agent", findings)];

        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(1));

        let bucket = &report.files["big.py"][&Severity::Minor];
        assert_eq!(bucket.len(), 20);
        assert_eq!(report.summary.truncated, 5);
        // The earliest-produced entries survive
        assert_eq!(bucket[0].comment, "issue 0");
        assert_eq!(bucket[19].comment, "issue 19");
    }

    #[test]
    fn test_merge_accumulates_lines_in_order() {
        // Same (agent, comment) on lines 5 and 9 merges to lines = [5, 9].
        let results = vec![completed(
            "logic_agent",
            vec![
                finding("logic_agent", "calc.py", 5, Severity::Major, "off-by-one in loop bound"),
                finding("logic_agent", "calc.py", 9, Severity::Major, "off-by-one in loop bound"),
            ],
        )];

        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(1));

        let bucket = &report.files["calc.py"][&Severity::Major];
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].lines, vec![5, 9]);
        // Merged entries still count per line in the totals
        assert_eq!(report.summary.total_comments, 2);
    }

    #[test]
    fn test_severity_floor_drops_only_below() {
        // A major floor removes minor/info but leaves grouping of the
        // retained findings untouched.
        let results = vec![completed(
            "agent",
            vec![
                finding("agent", "a.py", 1, Severity::Critical, "rce"),
                finding("agent", "a.py", 2, Severity::Major, "injection"),
                finding("agent", "a.py", 3, Severity::Minor, "long line"),
                finding("agent", "b.py", 4, Severity::Info, "naming"),
            ],
        )];

        let mut config = ReviewConfig::default();
        config.min_severity = Severity::Major;
        let report = aggregate(&results, &config, Duration::from_secs(1));

        assert_eq!(report.summary.total_comments, 2);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.major, 1);
        assert_eq!(report.summary.minor, 0);
        assert_eq!(report.summary.info, 0);
        assert!(report.files.contains_key("a.py"));
        assert!(!report.files.contains_key("b.py"));
        assert!(!report.files["a.py"].contains_key(&Severity::Minor));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        // Same input, same report.
        let results = vec![
            completed(
                "security_agent",
                vec![
                    finding("security_agent", "auth.py", 12, Severity::Critical, "hardcoded secret"),
                    finding("security_agent", "db.py", 30, Severity::Major, "sql injection"),
                ],
            ),
            AgentResult::failed("logic_agent", "boom", Duration::from_millis(10)),
        ];

        let first = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(3));
        let second = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(3));

        assert_eq!(first, second);
    }

    #[test]
    fn test_no_findings_message() {
        let results = vec![completed("agent", vec![])];
        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(1));

        assert_eq!(report.summary.total_comments, 0);
        assert_eq!(report.summary.message, "No issues detected by automated review agents.");
    }

    #[test]
    fn test_summary_message_encodes_ratio_and_counts() {
        let results = vec![
            completed(
                "agent",
                vec![finding("agent", "a.py", 1, Severity::Critical, "rce")],
            ),
            AgentResult::failed("other", "boom", Duration::from_millis(5)),
        ];

        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_millis(2500));

        assert!(report.summary.message.contains("Found 1 potential issue(s) in 2.5s"));
        assert!(report.summary.message.contains("(1/2 agents)"));
        assert!(report.summary.message.contains("1 critical"));
    }

    #[test]
    fn test_failed_agent_metadata_is_kept() {
        let results = vec![AgentResult::failed("logic_agent", "boom", Duration::from_millis(10))];
        let report = aggregate(&results, &ReviewConfig::default(), Duration::from_secs(1));

        assert_eq!(report.agents.len(), 1);
        assert_eq!(report.agents[0].name, "logic_agent");
        assert_eq!(report.agents[0].outcome, AgentOutcome::Failed);
        assert_eq!(report.agents[0].error.as_deref(), Some("boom"));
    }
}
