//! QRadar AQL backend.
//!
//! Mapped fields render as `"field"='value'` comparisons; everything
//! else is downgraded to a payload substring search
//! (`search_payload ilike '...'`, `*` wildcards mapped to `%`). Every
//! query carries the AQL `SELECT ... from events where` header.

use std::collections::HashSet;

use sigconv_ast::{ConditionNode, ParsedRule, ScalarValue, ValueNode};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;
use crate::render::QueryRender;
use crate::syntax::QuerySyntax;

static QRADAR_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" and "),
    or_token: Some(" or "),
    not_token: Some("not "),
    subexpression: Some("({})"),
    list_expression: Some("{}"),
    list_separator: Some(" "),
    value_expression: Some("'{}'"),
    null_expression: Some("{} is null"),
    not_null_expression: Some("not ({} is null)"),
    map_expression: Some("{}={}"),
    map_lists_special: true,
    map_list_expression: None,
};

const AQL_HEADER: &str = "SELECT UTF8(payload) as search_payload from events where ";

/// Fields QRadar always understands, independent of the mapping.
const ALWAYS_ALLOWED: &[&str] = &["deviceVendor", "categoryDeviceGroup", "deviceProduct"];

pub struct QRadarBackend {
    cleaner: ValueCleaner,
    allowed: HashSet<String>,
}

impl QRadarBackend {
    pub fn new(ctx: &BackendContext) -> Self {
        let mut allowed: HashSet<String> =
            ALWAYS_ALLOWED.iter().map(|s| s.to_string()).collect();
        allowed.extend(ctx.mapping.all_targets());
        QRadarBackend {
            cleaner: ValueCleaner::none(),
            allowed,
        }
    }

    /// `"field"='value'` comparison for an allowed field.
    fn field_comparison(&self, field: &str, value: &ScalarValue) -> String {
        format!("\"{field}\"='{}'", self.clean_value(&value.to_string()))
    }
}

pub(crate) fn build(ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(QRadarBackend::new(ctx)))
}

impl QueryRender for QRadarBackend {
    fn syntax(&self) -> &QuerySyntax {
        &QRADAR_SYNTAX
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    fn render_and(&self, children: &[ConditionNode]) -> Result<String> {
        let parts: Vec<String> = children
            .iter()
            .map(|c| self.render_node(c))
            .collect::<Result<_>>()?;
        Ok(format!("({})", parts.join(" and ")))
    }

    fn render_or(&self, children: &[ConditionNode]) -> Result<String> {
        let parts: Vec<String> = children
            .iter()
            .map(|c| self.render_node(c))
            .collect::<Result<_>>()?;
        Ok(format!("({})", parts.join(" or ")))
    }

    fn render_map_item(&self, field: &str, value: &ValueNode) -> Result<String> {
        if self.allowed.contains(field) {
            return match value {
                // The log-source discriminator is matched against the
                // payload itself, not as a field comparison.
                ValueNode::Scalar(scalar) if field == "deviceProduct" => {
                    Ok(self.clean_value(&scalar.to_string()))
                }
                ValueNode::Scalar(scalar) => Ok(self.field_comparison(field, scalar)),
                ValueNode::List(items) => self.render_map_list(field, items),
            };
        }

        match value {
            ValueNode::Scalar(scalar) => self.render_value(scalar),
            ValueNode::List(items) => self.render_map_list(field, items),
        }
    }

    fn render_map_list(&self, field: &str, items: &[ValueNode]) -> Result<String> {
        let allowed = self.allowed.contains(field);
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(scalar) => {
                    if allowed {
                        parts.push(self.field_comparison(field, scalar));
                    } else {
                        parts.push(self.render_value(scalar)?);
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

    /// Free-text values search the payload; `*` wildcards become `%`.
    fn render_value(&self, value: &ScalarValue) -> Result<String> {
        let text = value.to_string().replace('*', "%");
        Ok(format!(
            "search_payload ilike '{}'",
            self.clean_value(&text)
        ))
    }
}

impl Backend for QRadarBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        let query = self.render_query(&rule.query)?;
        Ok(RuleOutput::Query(format!("{AQL_HEADER}{query}")))
    }
}
