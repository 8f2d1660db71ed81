//! Purely declarative text-query backend.
//!
//! Backends whose dialect is fully captured by a [`QuerySyntax`]
//! descriptor and a [`ValueCleaner`] are values of this type rather than
//! new types of their own.

use sigconv_ast::ParsedRule;

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::Result;
use crate::render::QueryRender;
use crate::syntax::QuerySyntax;

/// A text-query generator driven entirely by its descriptor.
pub struct TextQueryBackend {
    syntax: &'static QuerySyntax,
    cleaner: ValueCleaner,
}

impl TextQueryBackend {
    pub fn new(syntax: &'static QuerySyntax, cleaner: ValueCleaner) -> Self {
        TextQueryBackend { syntax, cleaner }
    }
}

impl QueryRender for TextQueryBackend {
    fn syntax(&self) -> &QuerySyntax {
        self.syntax
    }

    fn cleaning(&self) -> &ValueCleaner {
        &self.cleaner
    }
}

impl Backend for TextQueryBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        Ok(RuleOutput::Query(self.render_query(&rule.query)?))
    }
}
