//! Splunk Search Processing Language (SPL) backend.

use sigconv_ast::{Aggregation, ParsedRule, ValueNode};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;
use crate::render::{reject_near, threshold_comparison, QueryRender};
use crate::syntax::QuerySyntax;

static SPLUNK_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" "),
    or_token: Some(" OR "),
    not_token: Some("NOT "),
    subexpression: Some("({})"),
    list_expression: Some("({})"),
    list_separator: Some(" "),
    value_expression: Some("\"{}\""),
    null_expression: Some("NOT {}=\"*\""),
    not_null_expression: Some("{}=\"*\""),
    map_expression: Some("{}={}"),
    map_lists_special: true,
    map_list_expression: Some("{} IN {}"),
};

/// Converts a rule into an SPL search. List-valued map items render as
/// OR-joined `field=value` pairs; aggregations translate to a `stats`
/// pipeline stage.
pub struct SplunkBackend {
    cleaner: ValueCleaner,
}

impl SplunkBackend {
    pub fn new() -> Result<Self> {
        Ok(SplunkBackend {
            cleaner: ValueCleaner::new(Some(r#"(["\\])"#), None)?,
        })
    }
}

pub(crate) fn build(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(SplunkBackend::new()?))
}

impl QueryRender for SplunkBackend {
    fn syntax(&self) -> &QuerySyntax {
        &SPLUNK_SYNTAX
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    fn render_map_list(&self, field: &str, items: &[ValueNode]) -> Result<String> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(value) => {
                    parts.push(format!("{field}={}", self.render_value(value)?));
                }
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

    fn render_aggregation(&self, agg: &Aggregation) -> Result<String> {
        reject_near(agg)?;
        let cmp = threshold_comparison(agg);
        Ok(match &agg.group_field {
            Some(group) => format!(
                " | stats {}({}) as val by {group} | search val {cmp}",
                agg.func, agg.field,
            ),
            None => format!(" | stats {}({}) as val | search val {cmp}", agg.func, agg.field),
        })
    }
}

impl Backend for SplunkBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        Ok(RuleOutput::Query(self.render_query(&rule.query)?))
    }
}
