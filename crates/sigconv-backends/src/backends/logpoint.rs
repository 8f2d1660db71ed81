//! LogPoint search-language backend.

use sigconv_ast::{Aggregation, ParsedRule};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::Result;
use crate::registry::BackendContext;
use crate::render::{reject_near, threshold_comparison, QueryRender};
use crate::syntax::QuerySyntax;

static LOGPOINT_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" "),
    or_token: Some(" OR "),
    not_token: Some(" -"),
    subexpression: Some("({})"),
    list_expression: Some("[{}]"),
    list_separator: Some(", "),
    value_expression: Some("\"{}\""),
    null_expression: Some("-{}=*"),
    not_null_expression: Some("{}=*"),
    map_expression: Some("{}={}"),
    map_lists_special: true,
    map_list_expression: Some("{} IN {}"),
};

/// Converts a rule into a LogPoint query. Aggregations translate to a
/// `chart` pipeline stage.
pub struct LogPointBackend {
    cleaner: ValueCleaner,
}

impl LogPointBackend {
    pub fn new() -> Result<Self> {
        Ok(LogPointBackend {
            cleaner: ValueCleaner::new(Some(r#"(["\\])"#), None)?,
        })
    }
}

pub(crate) fn build(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(LogPointBackend::new()?))
}

impl QueryRender for LogPointBackend {
    fn syntax(&self) -> &QuerySyntax {
        &LOGPOINT_SYNTAX
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    fn render_aggregation(&self, agg: &Aggregation) -> Result<String> {
        reject_near(agg)?;
        let cmp = threshold_comparison(agg);
        Ok(match &agg.group_field {
            Some(group) => format!(
                " | chart {}({}) as val by {group} | search val {cmp}",
                agg.func, agg.field,
            ),
            None => format!(" | chart {}({}) as val | search val {cmp}", agg.func, agg.field),
        })
    }
}

impl Backend for LogPointBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        Ok(RuleOutput::Query(self.render_query(&rule.query)?))
    }
}
