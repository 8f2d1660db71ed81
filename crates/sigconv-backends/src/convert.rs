//! Conversion driver: feed a batch of parsed rules through one backend
//! and collect a per-rule report.

use sigconv_ast::ParsedRule;

use crate::backend::{Backend, MatchClass, RuleOutput};
use crate::error::{BackendError, Result};
use crate::output::OutputSink;

/// What happened to a single rule during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    /// A query was produced (written immediately or deferred to
    /// `finalize`).
    Converted,
    /// Only a broader-than-intended query could be produced.
    Partial(String),
    /// No query at all could be produced for this rule.
    Impossible,
    /// The backend rejected the rule; conversion continued with the
    /// next one.
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct RuleReport {
    pub title: String,
    pub status: RuleStatus,
}

/// Convert `rules` through `backend`, writing produced queries to
/// `sink` as they appear and deferred output in a final `finalize`
/// pass.
///
/// Per-rule backend rejections are recorded as [`RuleStatus::Skipped`]
/// and conversion continues; malformed trees and I/O failures abort the
/// whole run.
pub fn convert_rules(
    backend: &mut dyn Backend,
    rules: &[ParsedRule],
    sink: &mut dyn OutputSink,
) -> Result<Vec<RuleReport>> {
    let mut reports = Vec::with_capacity(rules.len());

    for rule in rules {
        let status = match backend.generate(rule) {
            Ok(RuleOutput::Query(query)) => {
                sink.write_line(&query)?;
                RuleStatus::Converted
            }
            Ok(RuleOutput::Deferred) => RuleStatus::Converted,
            Ok(RuleOutput::Classified(MatchClass::Partial(query))) => {
                RuleStatus::Partial(query)
            }
            Ok(RuleOutput::Classified(MatchClass::Impossible)) => RuleStatus::Impossible,
            Err(err @ BackendError::MalformedTree(_)) => return Err(err),
            Err(err @ BackendError::Io(_)) => return Err(err),
            Err(err) => RuleStatus::Skipped(err.to_string()),
        };
        reports.push(RuleReport {
            title: rule.context.title.clone(),
            status,
        });
    }

    backend.finalize(sink)?;
    sink.close()?;
    Ok(reports)
}
