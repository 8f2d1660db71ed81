//! The backend contract: per-rule generation and run finalization.

use sigconv_ast::ParsedRule;

use crate::error::Result;
use crate::output::OutputSink;

/// Classification of a query whose field conditions were filtered
/// against an allow-list. These are user-visible outcomes, not bugs; the
/// caller reports them per rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchClass {
    /// At least one condition was silently downgraded to a free-text
    /// match; the query matches more broadly than the rule intends.
    Partial(String),
    /// No condition could be rendered at all.
    Impossible,
}

/// Result of generating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutput {
    /// One finished query; the driver writes it to the sink immediately.
    Query(String),
    /// A query downgraded by allow-list filtering.
    Classified(MatchClass),
    /// The result was buffered backend-side and will be emitted by
    /// `finalize`.
    Deferred,
}

/// One target-language generator, identified by a unique string in the
/// registry.
///
/// A backend instance is constructed once per conversion run, processes
/// rules strictly in arrival order (one `generate` call per rule), and is
/// torn down after one `finalize` call. Backend-local buffers are owned
/// exclusively by the instance and never shared across runs.
pub trait Backend {
    /// Generate output for one rule.
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput>;

    /// Called exactly once after the last rule. The only place a
    /// multi-rule backend may write its combined artifact.
    fn finalize(&mut self, sink: &mut dyn OutputSink) -> Result<()> {
        let _ = sink;
        Ok(())
    }
}
