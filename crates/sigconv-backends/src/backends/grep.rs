//! Development backend emitting Perl-compatible regular expressions
//! wrapped in a `grep -P` command line.
//!
//! AND becomes concatenated lookaheads, OR an alternation, NOT a
//! negative lookahead; `*` wildcards map to `.*`. Field names are
//! dropped entirely, only values are matched.

use sigconv_ast::{ConditionNode, ParsedRule, ScalarValue, ValueNode};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;
use crate::render::QueryRender;
use crate::syntax::QuerySyntax;

pub struct GrepBackend {
    cleaner: ValueCleaner,
}

impl GrepBackend {
    pub fn new() -> Result<Self> {
        Ok(GrepBackend {
            cleaner: ValueCleaner::new(Some(r"([\\|()\[\]{}.^$+])"), None)?,
        })
    }
}

pub(crate) fn build(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(GrepBackend::new()?))
}

impl QueryRender for GrepBackend {
    fn syntax(&self) -> &QuerySyntax {
        &QuerySyntax::EMPTY
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }

    fn clean_value(&self, value: &str) -> String {
        // Escape regex metacharacters first, then turn Sigma wildcards
        // into their regex form.
        self.cleaning().clean(value).replace('*', ".*")
    }

    fn render_and(&self, children: &[ConditionNode]) -> Result<String> {
        let mut out = String::new();
        for child in children {
            out.push_str(&format!("(?=.*{})", self.render_node(child)?));
        }
        Ok(out)
    }

    fn render_or(&self, children: &[ConditionNode]) -> Result<String> {
        let parts: Vec<String> = children
            .iter()
            .map(|c| Ok(format!(".*{}", self.render_node(c)?)))
            .collect::<Result<_>>()?;
        Ok(format!("(?:{})", parts.join("|")))
    }

    fn render_not(&self, operand: &ConditionNode) -> Result<String> {
        Ok(format!("(?!.*{})", self.render_node(operand)?))
    }

    fn render_subexpression(&self, inner: &ConditionNode) -> Result<String> {
        Ok(format!("(?:.*{})", self.render_node(inner)?))
    }

    fn render_list(&self, items: &[ValueNode]) -> Result<String> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::Scalar(value) => {
                    parts.push(format!(".*{}", self.render_value(value)?));
                }
                other => {
                    return Err(BackendError::UnsupportedValueType(format!(
                        "list items must be strings or integers, got {}",
                        other.kind()
                    )))
                }
            }
        }
        Ok(format!("(?:{})", parts.join("|")))
    }

    fn render_map_item(&self, _field: &str, value: &ValueNode) -> Result<String> {
        match value {
            ValueNode::Scalar(scalar) => self.render_value(scalar),
            ValueNode::List(items) => self.render_list(items),
        }
    }

    fn render_value(&self, value: &ScalarValue) -> Result<String> {
        Ok(self.clean_value(&value.to_string()))
    }
}

impl Backend for GrepBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        let pattern = self.render_node(&rule.query.search)?;
        Ok(RuleOutput::Query(format!("grep -P '^{pattern}'")))
    }
}
