//! Per-rule metadata and aggregation clauses supplied by the upstream
//! parser alongside the condition tree.

use std::fmt;

use serde::Serialize;

use crate::ast::ConditionNode;

/// Severity level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "informational" => Some(Level::Informational),
            "low" => Some(Level::Low),
            "medium" => Some(Level::Medium),
            "high" => Some(Level::High),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Informational => "informational",
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation function applied over matched events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Count,
    Min,
    Max,
    Avg,
    Sum,
    /// Recognized by the grammar but not translatable by any current
    /// backend; generation must signal not-implemented, never drop it.
    Near,
}

impl AggFunc {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "count" => Some(AggFunc::Count),
            "min" => Some(AggFunc::Min),
            "max" => Some(AggFunc::Max),
            "avg" => Some(AggFunc::Avg),
            "sum" => Some(AggFunc::Sum),
            "near" => Some(AggFunc::Near),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Count => "count",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Avg => "avg",
            AggFunc::Sum => "sum",
            AggFunc::Near => "near",
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operator in an aggregation condition. An absent operator
/// means "not equal to zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An aggregation clause attached to a rule's top-level condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub func: AggFunc,
    /// Field the function is applied over.
    pub field: String,
    /// Optional group-by field.
    pub group_field: Option<String>,
    /// Comparison against the threshold; `None` means not-equal-zero.
    pub compare: Option<CompareOp>,
    pub threshold: i64,
}

impl Aggregation {
    pub fn count(field: impl Into<String>, compare: Option<CompareOp>, threshold: i64) -> Self {
        Aggregation {
            func: AggFunc::Count,
            field: field.into(),
            group_field: None,
            compare,
            threshold,
        }
    }
}

/// One parsed query: the boolean condition tree plus an optional
/// aggregation clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    pub search: ConditionNode,
    pub aggregation: Option<Aggregation>,
}

impl ParsedQuery {
    pub fn new(search: ConditionNode) -> Self {
        ParsedQuery {
            search,
            aggregation: None,
        }
    }

    pub fn with_aggregation(search: ConditionNode, aggregation: Aggregation) -> Self {
        ParsedQuery {
            search,
            aggregation: Some(aggregation),
        }
    }
}

/// Declared metadata of a rule, owned by the upstream parser and
/// read-only to the backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleContext {
    pub title: String,
    pub description: String,
    pub level: Option<Level>,
    pub false_positives: Vec<String>,
    /// Target log-source index identifiers; possibly empty, possibly
    /// multiple.
    pub indices: Vec<String>,
    /// Logical field names requested for display columns.
    pub fields: Vec<String>,
    /// Detection timeframe, used as the schedule interval by alerting
    /// backends.
    pub timeframe: Option<String>,
}

impl RuleContext {
    pub fn new(title: impl Into<String>) -> Self {
        RuleContext {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A complete rule as handed to a backend: metadata plus one parsed
/// query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRule {
    pub context: RuleContext,
    pub query: ParsedQuery,
}

impl ParsedRule {
    pub fn new(context: RuleContext, query: ParsedQuery) -> Self {
        ParsedRule { context, query }
    }
}
