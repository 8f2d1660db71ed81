//! Generic node dispatch and declarative text rendering.
//!
//! [`QueryRender::render_node`] is the single recursive entry point that
//! routes a condition node to the right generation step by its variant.
//! The default method bodies implement the steps declaratively from the
//! backend's [`QuerySyntax`] descriptor; backends with target-specific
//! quirks override individual steps and recursion still dispatches
//! through the overriding implementation.

use sigconv_ast::{Aggregation, ConditionNode, ParsedQuery, ScalarValue, ValueNode};

use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::syntax::{fill, require, QuerySyntax};

/// One text-query generator: a syntax descriptor, a value cleaner, and
/// the eight generation steps.
pub trait QueryRender {
    /// The dialect's syntax descriptor.
    fn syntax(&self) -> &QuerySyntax;

    /// The dialect's escaping/stripping rules.
    fn cleaning(&self) -> &ValueCleaner;

    /// Clean one raw value string before templating.
    fn clean_value(&self, value: &str) -> String {
        self.cleaning().clean(value)
    }

    /// Render a full query: the boolean condition, followed by the
    /// aggregation rendering when one is attached.
    fn render_query(&self, query: &ParsedQuery) -> Result<String> {
        let mut text = self.render_node(&query.search)?;
        if let Some(agg) = &query.aggregation {
            text.push_str(&self.render_aggregation(agg)?);
        }
        Ok(text)
    }

    /// Dispatch a node to the generation step for its variant.
    fn render_node(&self, node: &ConditionNode) -> Result<String> {
        match node {
            ConditionNode::And(children) => {
                if children.is_empty() {
                    return Err(BackendError::MalformedTree(
                        "AND node with no children".to_string(),
                    ));
                }
                self.render_and(children)
            }
            ConditionNode::Or(children) => {
                if children.is_empty() {
                    return Err(BackendError::MalformedTree(
                        "OR node with no children".to_string(),
                    ));
                }
                self.render_or(children)
            }
            ConditionNode::Not(operand) => self.render_not(operand),
            ConditionNode::Subexpression(inner) => self.render_subexpression(inner),
            ConditionNode::MapItem { field, value } => self.render_map_item(field, value),
            ConditionNode::List(items) => self.render_list(items),
            ConditionNode::Value(value) => self.render_value(value),
            ConditionNode::Null { field } => self.render_null(field),
            ConditionNode::NotNull { field } => self.render_not_null(field),
        }
    }

    fn render_and(&self, children: &[ConditionNode]) -> Result<String> {
        let token = require(self.syntax().and_token, "AND")?;
        let parts: Vec<String> = children
            .iter()
            .map(|c| self.render_node(c))
            .collect::<Result<_>>()?;
        Ok(parts.join(token))
    }

    fn render_or(&self, children: &[ConditionNode]) -> Result<String> {
        let token = require(self.syntax().or_token, "OR")?;
        let parts: Vec<String> = children
            .iter()
            .map(|c| self.render_node(c))
            .collect::<Result<_>>()?;
        Ok(parts.join(token))
    }

    fn render_not(&self, operand: &ConditionNode) -> Result<String> {
        let token = require(self.syntax().not_token, "NOT")?;
        Ok(format!("{token}{}", self.render_node(operand)?))
    }

    fn render_subexpression(&self, inner: &ConditionNode) -> Result<String> {
        let tpl = require(self.syntax().subexpression, "subexpression")?;
        Ok(fill(tpl, &[&self.render_node(inner)?]))
    }

    fn render_list(&self, items: &[ValueNode]) -> Result<String> {
        let tpl = require(self.syntax().list_expression, "list")?;
        let sep = require(self.syntax().list_separator, "list")?;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(value) => parts.push(self.render_value(value)?),
                other => {
                    return Err(BackendError::UnsupportedValueType(format!(
                        "list items must be strings or integers, got {}",
                        other.kind()
                    )))
                }
            }
        }
        Ok(fill(tpl, &[&parts.join(sep)]))
    }

    fn render_map_item(&self, field: &str, value: &ValueNode) -> Result<String> {
        let special = self.syntax().map_lists_special;
        match value {
            ValueNode::Scalar(scalar) => {
                let tpl = require(self.syntax().map_expression, "field/value")?;
                Ok(fill(tpl, &[field, &self.render_value(scalar)?]))
            }
            ValueNode::List(items) if !special => {
                let tpl = require(self.syntax().map_expression, "field/value")?;
                Ok(fill(tpl, &[field, &self.render_list(items)?]))
            }
            ValueNode::List(items) => self.render_map_list(field, items),
        }
    }

    /// Field/list condition when the dialect gives list-valued map items
    /// dedicated syntax (`map_lists_special`).
    fn render_map_list(&self, field: &str, items: &[ValueNode]) -> Result<String> {
        let tpl = require(self.syntax().map_list_expression, "field/list")?;
        Ok(fill(tpl, &[field, &self.render_list(items)?]))
    }

    fn render_value(&self, value: &ScalarValue) -> Result<String> {
        let tpl = require(self.syntax().value_expression, "value")?;
        Ok(fill(tpl, &[&self.clean_value(&value.to_string())]))
    }

    fn render_null(&self, field: &str) -> Result<String> {
        let tpl = require(self.syntax().null_expression, "null test")?;
        Ok(fill(tpl, &[field]))
    }

    fn render_not_null(&self, field: &str) -> Result<String> {
        let tpl = require(self.syntax().not_null_expression, "not-null test")?;
        Ok(fill(tpl, &[field]))
    }

    fn render_aggregation(&self, agg: &Aggregation) -> Result<String> {
        let _ = agg;
        Err(BackendError::NotImplemented(
            "aggregations are not supported by this backend".to_string(),
        ))
    }
}

/// Reject the `near` aggregation function, which no current backend can
/// translate.
pub(crate) fn reject_near(agg: &Aggregation) -> Result<()> {
    if agg.func == sigconv_ast::AggFunc::Near {
        return Err(BackendError::NotImplemented(
            "the 'near' aggregation operator".to_string(),
        ));
    }
    Ok(())
}

/// Threshold comparison text: the operator applied to the threshold, or
/// a not-equal-zero test when no operator is present.
pub(crate) fn threshold_comparison(agg: &Aggregation) -> String {
    match agg.compare {
        Some(op) => format!("{op} {}", agg.threshold),
        None => "!= 0".to_string(),
    }
}
