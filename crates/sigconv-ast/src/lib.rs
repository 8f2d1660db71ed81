//! # sigconv-ast
//!
//! The condition-tree model and per-rule metadata consumed by the sigconv
//! query backends.
//!
//! A detection rule arrives here already parsed: a [`ConditionNode`] tree
//! of field/value tests combined with AND/OR/NOT and explicit grouping,
//! an optional [`Aggregation`] clause, and the rule's declared metadata
//! ([`RuleContext`]). The types are immutable once constructed and free
//! of cycles; backends only walk them.
//!
//! ## Example
//!
//! ```rust
//! use sigconv_ast::{ConditionNode, ParsedQuery, ParsedRule, RuleContext, ValueNode};
//!
//! let tree = ConditionNode::And(vec![
//!     ConditionNode::map_item("EventID", ValueNode::int(4688)),
//!     ConditionNode::map_item("CommandLine", ValueNode::str("whoami")),
//! ]);
//! let rule = ParsedRule::new(RuleContext::new("Detect Whoami"), ParsedQuery::new(tree));
//! assert_eq!(rule.context.title, "Detect Whoami");
//! ```

pub mod ast;
pub mod rule;

pub use ast::{ConditionNode, ScalarValue, ValueNode};
pub use rule::{
    AggFunc, Aggregation, CompareOp, Level, ParsedQuery, ParsedRule, RuleContext,
};
