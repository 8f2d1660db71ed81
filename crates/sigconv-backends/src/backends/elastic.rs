//! Elastic-family backends: the Lucene query string dialect, Kibana
//! saved-search collections, and X-Pack Watcher alert definitions.
//!
//! Kibana and Watcher embed the query-string rendering as one leaf value
//! inside a larger JSON document skeleton and only write in `finalize`.

use std::sync::Arc;

use serde_json::json;
use sigconv_ast::{CompareOp, ParsedRule};

use crate::backend::{Backend, RuleOutput};
use crate::cleaning::ValueCleaner;
use crate::error::{BackendError, Result};
use crate::fieldmap::FieldMapping;
use crate::naming::RuleNameRegistry;
use crate::output::OutputSink;
use crate::registry::BackendContext;
use crate::render::QueryRender;
use crate::syntax::QuerySyntax;
use crate::textquery::TextQueryBackend;

/// Lucene query-string dialect shared by the Elastic-family backends.
pub(crate) static ES_QS_SYNTAX: QuerySyntax = QuerySyntax {
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

/// Characters with reserved meaning in the Lucene query-string syntax.
pub(crate) fn es_qs_cleaner() -> Result<ValueCleaner> {
    ValueCleaner::new(
        Some(r#"([+\-=!(){}\[\]^"~:\\/]|&&|\|\|)"#),
        Some("[<>]"),
    )
}

fn es_qs_renderer() -> Result<TextQueryBackend> {
    Ok(TextQueryBackend::new(&ES_QS_SYNTAX, es_qs_cleaner()?))
}

/// `es-qs`: one Elasticsearch query string per rule. Searches only, no
/// aggregations.
pub(crate) fn build_es_qs(_ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(es_qs_renderer()?))
}

// =============================================================================
// Kibana saved searches
// =============================================================================

/// Accumulates one Kibana saved-search document per rule and emits the
/// whole collection as pretty-printed JSON in `finalize`.
pub struct KibanaBackend {
    renderer: TextQueryBackend,
    names: RuleNameRegistry,
    searches: Vec<serde_json::Value>,
    mapping: Arc<dyn FieldMapping>,
    title_prefix: Option<String>,
}

impl KibanaBackend {
    pub fn new(ctx: &BackendContext) -> Result<Self> {
        Ok(KibanaBackend {
            renderer: es_qs_renderer()?,
            names: RuleNameRegistry::new(),
            searches: Vec::new(),
            mapping: Arc::clone(&ctx.mapping),
            title_prefix: ctx.options.get("prefix").map(String::from),
        })
    }
}

pub(crate) fn build_kibana(ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(KibanaBackend::new(ctx)?))
}

impl Backend for KibanaBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        let name = self.names.assign(&rule.context.title);

        let mut columns = Vec::new();
        for field in &rule.context.fields {
            columns.extend(self.mapping.resolve(field).into_vec());
        }

        // Fallback if the rule declares no index
        let indices = if rule.context.indices.is_empty() {
            vec!["*".to_string()]
        } else {
            rule.context.indices.clone()
        };
        if indices.len() > 1 {
            return Err(BackendError::NotSupported(
                "multiple target indices cannot be replicated into Kibana searches".to_string(),
            ));
        }

        let title = match &self.title_prefix {
            Some(prefix) => format!("{prefix}{}", rule.context.title),
            None => rule.context.title.clone(),
        };

        let query = self.renderer.render_node(&rule.query.search)?;
        let search_source = serde_json::to_string(&json!({
            "index": indices[0],
            "filter": [],
            "highlight": {
                "pre_tags": ["@kibana-highlighted-field@"],
                "post_tags": ["@/kibana-highlighted-field@"],
                "fields": { "*": {} },
                "require_field_match": false,
                "fragment_size": 2147483647
            },
            "query": {
                "query_string": {
                    "query": query,
                    "analyze_wildcard": true
                }
            }
        }))?;

        self.searches.push(json!({
            "_id": name,
            "_type": "search",
            "_source": {
                "title": title,
                "description": rule.context.description,
                "hits": 0,
                "columns": columns,
                "sort": ["@timestamp", "desc"],
                "version": 1,
                "kibanaSavedObjectMeta": {
                    "searchSourceJSON": search_source
                }
            }
        }));

        Ok(RuleOutput::Deferred)
    }

    fn finalize(&mut self, sink: &mut dyn OutputSink) -> Result<()> {
        sink.write_line(&serde_json::to_string_pretty(&self.searches)?)
    }
}

// =============================================================================
// X-Pack Watcher alerts
// =============================================================================

/// Accumulates one watch definition per rule, keyed by its unique name,
/// and emits either plain `PUT` requests or curl command lines in
/// `finalize`.
///
/// Options: `output` selects `plain` or `curl` (default `curl`); `es`
/// sets the delivery endpoint (default `localhost:9200`).
pub struct XPackWatcherBackend {
    renderer: TextQueryBackend,
    names: RuleNameRegistry,
    watches: Vec<(String, serde_json::Value)>,
    output_mode: String,
    endpoint: String,
}

impl XPackWatcherBackend {
    pub fn new(ctx: &BackendContext) -> Result<Self> {
        Ok(XPackWatcherBackend {
            renderer: es_qs_renderer()?,
            names: RuleNameRegistry::new(),
            watches: Vec::new(),
            output_mode: ctx.options.get_or("output", "curl").to_string(),
            endpoint: ctx.options.get_or("es", "localhost:9200").to_string(),
        })
    }
}

pub(crate) fn build_xpack_watcher(ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    Ok(Box::new(XPackWatcherBackend::new(ctx)?))
}

impl Backend for XPackWatcherBackend {
    fn generate(&mut self, rule: &ParsedRule) -> Result<RuleOutput> {
        let name = self.names.assign(&rule.context.title);
        let interval = rule
            .context
            .timeframe
            .clone()
            .unwrap_or_else(|| "30m".to_string());

        let level = rule
            .context
            .level
            .map(|l| l.as_str().to_string())
            .unwrap_or_default();
        let logging_text = format!(
            "Rule description: {}, false positives: {}, level: {}",
            rule.context.description,
            rule.context.false_positives.join(", "),
            level,
        );

        let alert_condition = match &rule.query.aggregation {
            Some(agg) => match agg.compare {
                Some(CompareOp::Gt) => json!({ "gt": agg.threshold }),
                Some(CompareOp::Gte) => json!({ "gte": agg.threshold }),
                Some(CompareOp::Lt) => json!({ "lt": agg.threshold }),
                Some(CompareOp::Lte) => json!({ "lte": agg.threshold }),
                None => json!({ "not_eq": 0 }),
            },
            None => json!({ "not_eq": 0 }),
        };

        let query = self.renderer.render_node(&rule.query.search)?;
        let watch = json!({
            "trigger": {
                "schedule": {
                    "interval": interval
                }
            },
            "input": {
                "search": {
                    "request": {
                        "body": {
                            "size": 0,
                            "query": {
                                "query_string": {
                                    "query": query,
                                    "analyze_wildcard": true
                                }
                            }
                        },
                        "indices": rule.context.indices
                    }
                }
            },
            "condition": {
                "compare": {
                    "ctx.payload.hits.total": alert_condition
                }
            },
            "actions": {
                "logging-action": {
                    "logging": {
                        "text": logging_text
                    }
                }
            }
        });

        self.watches.push((name, watch));
        Ok(RuleOutput::Deferred)
    }

    fn finalize(&mut self, sink: &mut dyn OutputSink) -> Result<()> {
        for (name, watch) in &self.watches {
            let body = serde_json::to_string_pretty(watch)?;
            match self.output_mode.as_str() {
                "plain" => {
                    sink.write_line(&format!("PUT _xpack/watcher/watch/{name}\n{body}\n"))?;
                }
                "curl" => {
                    sink.write_line(&format!(
                        "curl -s -XPUT --data-binary @- {}/_xpack/watcher/watch/{name} <<EOF\n{body}\nEOF",
                        self.endpoint,
                    ))?;
                }
                other => {
                    return Err(BackendError::NotImplemented(format!(
                        "watcher output mode '{other}'"
                    )))
                }
            }
        }
        Ok(())
    }
}
