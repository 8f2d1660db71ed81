//! Development backend listing all field names referenced by a rule,
//! one per line, sorted and de-duplicated. Useful for bootstrapping a
//! field mapping configuration.

use std::collections::BTreeSet;

use sigconv_ast::{ConditionNode, ParsedRule, ValueNode};

use crate::backend::{Backend, RuleOutput};
use crate::error::{BackendError, Result};
use crate::registry::BackendContext;

#[derive(Debug, Default)]
pub struct FieldnameListBackend;

impl FieldnameListBackend {
    pub fn new() -> Self {
        FieldnameListBackend
    }

    fn collect(node: &ConditionNode, out: &mut BTreeSet<String>) -> Result<()> {
        match node {
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                for child in children {
                    Self::collect(child, out)?;
                }
            }
            ConditionNode::Not(inner) | ConditionNode::Subexpression(inner) => {
                Self::collect(inner, out)?;
            }
            ConditionNode::MapItem { field, value } => {
                if let ValueNode::List(items) = value {
                    validate_scalars(items)?;
                }
                out.insert(field.clone());
            }
            ConditionNode::List(items) => validate_scalars(items)?,
            ConditionNode::Value(_) => {}
            ConditionNode::Null { .. } | ConditionNode::NotNull { .. } => {
                return Err(BackendError::NotImplemented(
                    "null tests carry no listable field comparison".to_string(),
                ))
            }
        }
        Ok(())
    }
}

fn validate_scalars(items: &[ValueNode]) -> Result<()> {
    for item in items {
        if let ValueNode::List(_) = item {
            return Err(BackendError::UnsupportedValueType(
                "list items must be strings or integers, got list".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn build(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(FieldnameListBackend::new()))
}

impl Backend for FieldnameListBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        let mut fields = BTreeSet::new();
        Self::collect(&rule.query.search, &mut fields)?;
        let lines: Vec<String> = fields.into_iter().collect();
        Ok(RuleOutput::Query(lines.join("\n")))
    }
}
