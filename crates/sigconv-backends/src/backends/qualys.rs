//! Qualys saved-search backend with partial/full match classification.
//!
//! Qualys can only compare against mapped fields. Conditions on other
//! fields are dropped during AND/OR generation; the result of a rule is
//! classified rather than returned as a plain query when that happens:
//!
//! - dropped from an AND -> partial match (the query is broader than the
//!   rule intends),
//! - nothing renderable left -> full match impossible.
//!
//! The AND and OR paths are deliberately asymmetric: OR drops disallowed
//! conditions without flagging, only AND marks the query partial. This
//! mirrors the established output of the target and is covered by tests.

use std::cell::Cell;
use std::collections::HashSet;

use sigconv_ast::{ConditionNode, ParsedRule, ValueNode};

use crate::backend::{Backend, MatchClass, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;
use crate::render::QueryRender;
use crate::syntax::QuerySyntax;

static QUALYS_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" and "),
    or_token: Some(" or "),
    not_token: Some("not "),
    subexpression: Some("({})"),
    list_expression: Some("{}"),
    list_separator: Some(" "),
    value_expression: Some("{}"),
    null_expression: Some("{} is null"),
    not_null_expression: Some("not ({} is null)"),
    map_expression: Some("{}:`{}`"),
    map_lists_special: true,
    map_list_expression: None,
};

pub struct QualysBackend {
    cleaner: ValueCleaner,
    allowed: HashSet<String>,
    /// Set while rendering when an AND drops a disallowed condition.
    /// Reset at the start of every rule.
    partial: Cell<bool>,
}

impl QualysBackend {
    pub fn new(ctx: &BackendContext) -> Self {
        QualysBackend {
            cleaner: ValueCleaner::none(),
            allowed: ctx.mapping.all_targets().into_iter().collect(),
            partial: Cell::new(false),
        }
    }

    fn is_disallowed_map_item(&self, node: &ConditionNode) -> bool {
        matches!(node, ConditionNode::MapItem { field, .. } if !self.allowed.contains(field))
    }

    /// A query whose conditions were all dropped renders as bare
    /// grouping characters.
    fn is_blank(query: &str) -> bool {
        query.chars().all(|c| matches!(c, '(' | ')' | ' '))
    }
}

pub(crate) fn build(ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(QualysBackend::new(ctx)))
}

impl QueryRender for QualysBackend {
    fn syntax(&self) -> &QuerySyntax {
        &QUALYS_SYNTAX
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    fn render_and(&self, children: &[ConditionNode]) -> Result<String> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            if self.is_disallowed_map_item(child) {
                self.partial.set(true);
                continue;
            }
            parts.push(self.render_node(child)?);
        }
        Ok(parts.join(" and "))
    }

    fn render_or(&self, children: &[ConditionNode]) -> Result<String> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            // Dropped silently, without the partial-match flag
            if self.is_disallowed_map_item(child) {
                continue;
            }
            parts.push(self.render_node(child)?);
        }
        Ok(parts.join(" or "))
    }

    fn render_map_item(&self, field: &str, value: &ValueNode) -> Result<String> {
        match value {
            ValueNode::Scalar(scalar) => {
                let rendered = self.render_value(scalar)?;
                if self.allowed.contains(field) {
                    Ok(format!("{field}:`{rendered}`"))
                } else {
                    Ok(rendered)
                }
            }
            ValueNode::List(items) => self.render_map_list(field, items),
        }
    }

    fn render_map_list(&self, field: &str, items: &[ValueNode]) -> Result<String> {
        let allowed = self.allowed.contains(field);
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(scalar) => {
                    let rendered = self.render_value(scalar)?;
                    if allowed {
                        parts.push(format!("{field}:`{rendered}`"));
                    } else {
                        parts.push(rendered);
                    }
                }
                other => {
                    return Err(BackendError::UnsupportedValueType(format!(
                        "list items must be strings or integers, got {}",
                        other.kind()
                    )))
                }
            }
        }
        Ok(format!("({})", parts.join(" or ")))
    }
}

impl Backend for QualysBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        self.partial.set(false);
        let query = self.render_query(&rule.query)?;

        if Self::is_blank(&query) {
            return Ok(RuleOutput::Classified(MatchClass::Impossible));
        }
        if self.partial.get() {
            return Ok(RuleOutput::Classified(MatchClass::Partial(query)));
        }
        Ok(RuleOutput::Query(query))
    }
}
