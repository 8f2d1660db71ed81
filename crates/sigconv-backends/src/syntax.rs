//! Declarative syntax descriptors for text-query backends.
//!
//! Most backends differ only in tokens and wrapping templates; those are
//! captured here as static configuration so the generic rendering in
//! [`crate::render`] can serve them all. Templates use `{}` placeholders
//! filled left to right.

use crate::error::{BackendError, Result};

/// Static tokens and templates describing one text-query dialect.
///
/// Absent entries mean the corresponding generation step is not supported
/// by the dialect and fails with a not-implemented error.
#[derive(Debug, Clone, Copy)]
pub struct QuerySyntax {
    /// Token joining AND-linked expressions.
    pub and_token: Option<&'static str>,
    /// Token joining OR-linked expressions.
    pub or_token: Option<&'static str>,
    /// Token prefixing a negated expression.
    pub not_token: Option<&'static str>,
    /// Wrapping template for explicit subexpressions, e.g. `({})`.
    pub subexpression: Option<&'static str>,
    /// Wrapping template for lists, e.g. `({})`.
    pub list_expression: Option<&'static str>,
    /// Separator between rendered list items.
    pub list_separator: Option<&'static str>,
    /// Template for a rendered scalar value, e.g. `"{}"`.
    pub value_expression: Option<&'static str>,
    /// Template for a field-absence test; `{}` is the field name.
    pub null_expression: Option<&'static str>,
    /// Template for a field-presence test; `{}` is the field name.
    pub not_null_expression: Option<&'static str>,
    /// Template for a field/value condition; first `{}` is the field,
    /// second the rendered value.
    pub map_expression: Option<&'static str>,
    /// When true, map items with list values use `map_list_expression`
    /// instead of the generic map template, letting a dialect express
    /// `field IN (...)` differently from a bare list literal.
    pub map_lists_special: bool,
    /// Template for a field/list condition when `map_lists_special` is
    /// set.
    pub map_list_expression: Option<&'static str>,
}

impl QuerySyntax {
    /// A descriptor with nothing defined; every step is unsupported
    /// until overridden by the backend.
    pub const EMPTY: QuerySyntax = QuerySyntax {
        and_token: None,
        or_token: None,
        not_token: None,
        subexpression: None,
        list_expression: None,
        list_separator: None,
        value_expression: None,
        null_expression: None,
        not_null_expression: None,
        map_expression: None,
        map_lists_special: false,
        map_list_expression: None,
    };
}

/// Fetch a descriptor entry, failing with a step-scoped not-implemented
/// error when the dialect does not define it.
pub(crate) fn require(entry: Option<&'static str>, step: &str) -> Result<&'static str> {
    entry.ok_or_else(|| BackendError::NotImplemented(format!("{step} generation")))
}

/// Fill `{}` placeholders in a template, left to right.
pub(crate) fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut rest = template;
    let mut next = args.iter();
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = next.next() {
            out.push_str(arg);
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_placeholders_left_to_right() {
        assert_eq!(fill("{}:{}", &["field", "\"v\""]), "field:\"v\"");
        assert_eq!(fill("({})", &["inner"]), "(inner)");
        assert_eq!(fill("no placeholders", &["x"]), "no placeholders");
    }

    #[test]
    fn missing_entries_are_step_scoped_not_implemented() {
        let err = require(QuerySyntax::EMPTY.and_token, "AND").unwrap_err();
        assert!(matches!(err, BackendError::NotImplemented(_)));
        assert!(err.to_string().contains("AND"));
    }
}
