//! Graylog query-string backend. Searches only, no aggregations.

use crate::backend::Backend;
use crate::cleaning::ValueCleaner;
use crate::error::Result;
use crate::registry::BackendContext;
use crate::syntax::QuerySyntax;
use crate::textquery::TextQueryBackend;

static GRAYLOG_SYNTAX: QuerySyntax = QuerySyntax {
    and_token: Some(" AND "),
    or_token: Some(" OR "),
    not_token: Some("NOT "),
    subexpression: Some("({})"),
    list_expression: Some("({})"),
    list_separator: Some(" "),
    value_expression: Some("\"{}\""),
    null_expression: Some("NOT _exists_:{}"),
    not_null_expression: Some("_exists_:{}"),
    map_expression: Some("{}:{}"),
    map_lists_special: false,
    map_list_expression: None,
};

/// `graylog`: one Graylog query string per rule.
///
/// Graylog keeps `*`/`?` wildcards and their escaping backslashes
/// meaningful: a backslash directly before a wildcard passes through
/// unchanged, every other backslash is escaped like the rest of the
/// reserved set.
pub(crate) fn build(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    let cleaner = ValueCleaner::with_passthrough(
        r#"(\\[*?])|([+\-!(){}\[\]^"~:/]|\\|&&|\|\|)"#,
        None,
    )?;
    Ok(Box::new(TextQueryBackend::new(&GRAYLOG_SYNTAX, cleaner)))
}
