//! Condition-tree types shared by every query backend.
//!
//! The tree is produced by the upstream rule parser and is read-only to
//! the backends. Construction happens once per rule; generation is a
//! bounded-depth walk over an already-finite tree.

use std::fmt;

use serde::Serialize;

/// A scalar value appearing in a condition: a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
}

impl ScalarValue {
    pub fn str(s: impl Into<String>) -> Self {
        ScalarValue::Str(s.into())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Str(s) => write!(f, "{s}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Str(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Str(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

/// The value side of a field/value condition.
///
/// A list may only contain scalars; a nested list is rejected by every
/// backend with an unsupported-value-type error. The nesting is kept
/// representable here so the check stays a generation-time contract with
/// the upstream parser rather than silent coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValueNode {
    Scalar(ScalarValue),
    List(Vec<ValueNode>),
}

impl ValueNode {
    pub fn str(s: impl Into<String>) -> Self {
        ValueNode::Scalar(ScalarValue::Str(s.into()))
    }

    pub fn int(i: i64) -> Self {
        ValueNode::Scalar(ScalarValue::Int(i))
    }

    /// Build a list node from scalar values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        ValueNode::List(items.into_iter().map(|v| ValueNode::Scalar(v.into())).collect())
    }

    /// Short descriptive name of this value shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ValueNode::Scalar(ScalarValue::Str(_)) => "string",
            ValueNode::Scalar(ScalarValue::Int(_)) => "integer",
            ValueNode::List(_) => "list",
        }
    }
}

/// A node of the parsed boolean condition tree.
///
/// The variants form a closed set; dispatch over them is exhaustive at
/// compile time. `And`/`Or` with an empty child sequence are invalid and
/// rejected during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConditionNode {
    /// Conjunction of sub-conditions.
    And(Vec<ConditionNode>),
    /// Disjunction of sub-conditions.
    Or(Vec<ConditionNode>),
    /// Negation of exactly one sub-condition.
    Not(Box<ConditionNode>),
    /// Explicit grouping boundary, independent of AND/OR precedence.
    /// Grouping is the parser's responsibility; generators add no
    /// parentheses of their own.
    Subexpression(Box<ConditionNode>),
    /// A field/value equality test. `field` is the logical (pre-mapping)
    /// field name.
    MapItem { field: String, value: ValueNode },
    /// A bare list of scalar alternatives.
    List(Vec<ValueNode>),
    /// A bare scalar value (keyword match).
    Value(ScalarValue),
    /// Field-absence test.
    Null { field: String },
    /// Field-presence test.
    NotNull { field: String },
}

impl ConditionNode {
    /// Convenience constructor for a field/value condition.
    pub fn map_item(field: impl Into<String>, value: ValueNode) -> Self {
        ConditionNode::MapItem {
            field: field.into(),
            value,
        }
    }

    /// Short descriptive name of this node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionNode::And(_) => "AND",
            ConditionNode::Or(_) => "OR",
            ConditionNode::Not(_) => "NOT",
            ConditionNode::Subexpression(_) => "subexpression",
            ConditionNode::MapItem { .. } => "map item",
            ConditionNode::List(_) => "list",
            ConditionNode::Value(_) => "value",
            ConditionNode::Null { .. } => "null test",
            ConditionNode::NotNull { .. } => "not-null test",
        }
    }
}
