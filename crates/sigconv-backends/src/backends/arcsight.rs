//! ArcSight saved-search backend.
//!
//! ArcSight only accepts field comparisons for fields its schema knows.
//! Fields outside the allow-list are downgraded to free-text matches:
//! the value is split into token fragments on a fixed special-character
//! set, each fragment independently quoted, AND-joined for a scalar
//! value and OR-joined across list items.

use std::collections::HashSet;

use regex::Regex;
use sigconv_ast::{ConditionNode, ParsedRule, ScalarValue, ValueNode};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;
use crate::render::QueryRender;
use crate::syntax::{fill, QuerySyntax};

static ARCSIGHT_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" AND "),
    or_token: Some(" OR "),
    not_token: Some("NOT "),
    subexpression: Some("({})"),
    list_expression: Some("({})"),
    list_separator: Some(" OR "),
    value_expression: Some("\"{}\""),
    null_expression: Some("NOT _exists_:{}"),
    not_null_expression: Some("_exists_:{}"),
    map_expression: Some("{} = {}"),
    map_lists_special: true,
    map_list_expression: Some("{} = {}"),
};

/// Fields ArcSight always understands, independent of the mapping.
const ALWAYS_ALLOWED: &[&str] = &["deviceVendor", "categoryDeviceGroup", "deviceProduct"];

/// Characters a free-text value is split on before quoting.
const SPLIT_PATTERN: &str = r#"[ /\\@?#&_%*',()"]"#;

pub struct ArcSightBackend {
    cleaner: ValueCleaner,
    allowed: HashSet<String>,
    splitter: Regex,
}

impl ArcSightBackend {
    pub fn new(ctx: &BackendContext) -> Result<Self> {
        let mut allowed: HashSet<String> =
            ALWAYS_ALLOWED.iter().map(|s| s.to_string()).collect();
        allowed.extend(ctx.mapping.all_targets());

        Ok(ArcSightBackend {
            cleaner: ValueCleaner::none(),
            allowed,
            splitter: Regex::new(SPLIT_PATTERN)?,
        })
    }

    /// Split a free-text value into non-empty fragments.
    fn split_fragments(&self, value: &str) -> Vec<String> {
        self.splitter
            .split(value)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Quote each non-empty fragment of a free-text value.
    fn quoted_fragments(&self, value: &str) -> Vec<String> {
        self.split_fragments(value)
            .into_iter()
            .map(|frag| fill("\"{}\"", &[&self.clean_value(&frag)]))
            .collect()
    }

    /// Quote each fragment of a free-text value and AND-join them.
    fn freetext_scalar(&self, value: &str) -> String {
        format!("({})", self.quoted_fragments(value).join(" AND "))
    }
}

pub(crate) fn build(ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(ArcSightBackend::new(ctx)?))
}

impl QueryRender for ArcSightBackend {
    fn syntax(&self) -> &QuerySyntax {
        &ARCSIGHT_SYNTAX
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    /// ORs are always parenthesized in ArcSight output. A disjunction
    /// made entirely of bare string values is a free-text search: each
    /// value is fragment-split and quoted, multi-fragment values
    /// additionally grouped, before OR-joining.
    fn render_or(&self, children: &[ConditionNode]) -> Result<String> {
        if children
            .iter()
            .all(|c| matches!(c, ConditionNode::Value(ScalarValue::Str(_))))
        {
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                if let ConditionNode::Value(ScalarValue::Str(s)) = child {
                    let quoted = self.quoted_fragments(s);
                    if quoted.len() > 1 {
                        parts.push(format!("({})", quoted.join(" AND ")));
                    } else {
                        parts.push(quoted.join(" AND "));
                    }
                }
            }
            return Ok(format!("({})", parts.join(" OR ")));
        }

        let parts: Vec<String> = children
            .iter()
            .map(|c| self.render_node(c))
            .collect::<Result<_>>()?;
        Ok(format!("({})", parts.join(" OR ")))
    }

    fn render_map_item(&self, field: &str, value: &ValueNode) -> Result<String> {
        if self.allowed.contains(field) {
            return match value {
                ValueNode::Scalar(scalar) => {
                    let quoted = fill("\"{}\"", &[&self.clean_value(&scalar.to_string())]);
                    Ok(fill("{} = {}", &[field, &quoted]))
                }
                ValueNode::List(items) => self.render_map_list(field, items),
            };
        }

        // Field unknown to ArcSight: downgrade to a free-text match.
        match value {
            ValueNode::Scalar(ScalarValue::Str(s)) => Ok(self.freetext_scalar(s)),
            ValueNode::Scalar(scalar) => self.render_value(scalar),
            ValueNode::List(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ValueNode::Scalar(ScalarValue::Str(s)) => {
                            parts.push(self.quoted_fragments(s).join(" AND "));
                        }
                        ValueNode::Scalar(scalar) => parts.push(self.render_value(scalar)?),
                        other => {
                            return Err(BackendError::UnsupportedValueType(format!(
                                "list items must be strings or integers, got {}",
                                other.kind()
                            )))
                        }
                    }
                }
                Ok(format!("({})", parts.join(" OR ")))
            }
        }
    }

    fn render_map_list(&self, field: &str, items: &[ValueNode]) -> Result<String> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(scalar) => {
                    parts.push(format!("{field} = {}", self.render_value(scalar)?));
                }
                other => {
                    return Err(BackendError::UnsupportedValueType(format!(
                        "list items must be strings or integers, got {}",
                        other.kind()
                    )))
                }
            }
        }
        Ok(parts.join(" OR "))
    }

    fn render_value(&self, value: &ScalarValue) -> Result<String> {
        Ok(match value {
            ScalarValue::Int(i) => self.clean_value(&i.to_string()),
            ScalarValue::Str(s) if s.contains("AND") => {
                format!("({})", self.clean_value(s))
            }
            ScalarValue::Str(s) => self.clean_value(s),
        })
    }
}

impl Backend for ArcSightBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        // Every ArcSight search carries a trailer tagging matches with
        // the rule title via a rex sed expression.
        let query = self.render_query(&rule.query)?;
        Ok(RuleOutput::Query(format!(
            "{query} AND type != 2 | rex field = flexString1 mode=sed \"s//Sigma: {}/g\"",
            rule.context.title,
        )))
    }
}
