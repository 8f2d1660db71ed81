use std::sync::Arc;

use sigconv_ast::{
    Aggregation, CompareOp, ConditionNode, ParsedQuery, ParsedRule, RuleContext, ValueNode,
};
use sigconv_backends::backend::RuleOutput;
use sigconv_backends::error::BackendError;
use sigconv_backends::fieldmap::TableFieldMapping;
use sigconv_backends::options::BackendOptions;
use sigconv_backends::output::MemorySink;
use sigconv_backends::registry::{self, BackendContext};

fn simple_rule(title: &str) -> ParsedRule {
    ParsedRule::new(
        RuleContext::new(title),
        ParsedQuery::new(ConditionNode::map_item(
            "EventID",
            ValueNode::int(4688),
        )),
    )
}

#[test]
fn kibana_collects_saved_searches_and_writes_one_json_array() {
    let mut context = RuleContext::new("Process Creation");
    context.description = "Detects process creation".to_string();
    context.fields = vec!["CommandLine".to_string()];
    context.indices = vec!["logstash-*".to_string()];
    let rule = ParsedRule::new(
        context,
        ParsedQuery::new(ConditionNode::map_item(
            "EventID",
            ValueNode::int(4688),
        )),
    );

    let mut mapping = TableFieldMapping::new();
    mapping.insert_many("CommandLine", ["winlog.command_line", "process.args"]);
    let ctx = BackendContext::new(Arc::new(mapping), BackendOptions::new());
    let mut backend = registry::create("kibana", &ctx).unwrap();

    assert!(matches!(
        backend.generate(&rule).unwrap(),
        RuleOutput::Deferred
    ));

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    assert_eq!(sink.lines.len(), 1);

    let docs: serde_json::Value = serde_json::from_str(&sink.lines[0]).unwrap();
    let doc = &docs.as_array().unwrap()[0];
    assert_eq!(doc["_id"], "Process-Creation");
    assert_eq!(doc["_type"], "search");
    assert_eq!(doc["_source"]["title"], "Process Creation");
    assert_eq!(
        doc["_source"]["columns"],
        serde_json::json!(["winlog.command_line", "process.args"])
    );

    // searchSourceJSON is itself a JSON document encoded as a string
    let source: serde_json::Value =
        serde_json::from_str(doc["_source"]["kibanaSavedObjectMeta"]["searchSourceJSON"].as_str().unwrap())
            .unwrap();
    assert_eq!(source["index"], "logstash-*");
    assert_eq!(source["query"]["query_string"]["query"], r#"EventID:"4688""#);
}

#[test]
fn kibana_defaults_missing_index_to_star() {
    let mut backend = registry::create("kibana", &BackendContext::default()).unwrap();
    backend.generate(&simple_rule("No Index")).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&sink.lines[0]).unwrap();
    let source: serde_json::Value = serde_json::from_str(
        docs[0]["_source"]["kibanaSavedObjectMeta"]["searchSourceJSON"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(source["index"], "*");
}

#[test]
fn kibana_rejects_multiple_indices() {
    let mut context = RuleContext::new("Two Indices");
    context.indices = vec!["a-*".to_string(), "b-*".to_string()];
    let rule = ParsedRule::new(
        context,
        ParsedQuery::new(ConditionNode::map_item("EventID", ValueNode::int(1))),
    );

    let mut backend = registry::create("kibana", &BackendContext::default()).unwrap();
    let err = backend.generate(&rule).unwrap_err();
    assert!(matches!(err, BackendError::NotSupported(_)));
}

#[test]
fn kibana_prefix_option_prepends_to_titles() {
    let ctx = BackendContext::new(
        Arc::new(TableFieldMapping::new()),
        BackendOptions::from_tokens(["prefix=SOC: "]),
    );
    let mut backend = registry::create("kibana", &ctx).unwrap();
    backend.generate(&simple_rule("Process Creation")).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&sink.lines[0]).unwrap();
    assert_eq!(docs[0]["_source"]["title"], "SOC: Process Creation");
}

#[test]
fn colliding_rule_titles_get_unique_document_ids() {
    let mut backend = registry::create("kibana", &BackendContext::default()).unwrap();
    backend.generate(&simple_rule("Same Title")).unwrap();
    backend.generate(&simple_rule("Same Title")).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&sink.lines[0]).unwrap();
    assert_eq!(docs[0]["_id"], "Same-Title");
    assert_eq!(docs[1]["_id"], "Same-Title-2");
}

#[test]
fn watcher_plain_output_emits_put_requests() {
    let mut context = RuleContext::new("Login Burst");
    context.description = "Many failed logins".to_string();
    context.indices = vec!["logstash-*".to_string()];
    context.timeframe = Some("1h".to_string());
    let rule = ParsedRule::new(
        context,
        ParsedQuery::with_aggregation(
            ConditionNode::map_item("EventID", ValueNode::int(4625)),
            Aggregation::count("EventID", Some(CompareOp::Gte), 10),
        ),
    );

    let ctx = BackendContext::new(
        Arc::new(TableFieldMapping::new()),
        BackendOptions::from_tokens(["output=plain"]),
    );
    let mut backend = registry::create("xpack-watcher", &ctx).unwrap();
    backend.generate(&rule).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    assert_eq!(sink.lines.len(), 1);
    assert!(sink.lines[0].starts_with("PUT _xpack/watcher/watch/Login-Burst\n"));

    let body: serde_json::Value =
        serde_json::from_str(sink.lines[0].splitn(2, '\n').nth(1).unwrap()).unwrap();
    assert_eq!(body["trigger"]["schedule"]["interval"], "1h");
    assert_eq!(
        body["condition"]["compare"]["ctx.payload.hits.total"]["gte"],
        10
    );
    assert_eq!(
        body["input"]["search"]["request"]["body"]["query"]["query_string"]["query"],
        r#"EventID:"4625""#
    );
}

#[test]
fn watcher_defaults_to_curl_against_localhost() {
    let mut backend = registry::create("xpack-watcher", &BackendContext::default()).unwrap();
    backend.generate(&simple_rule("Curl Watch")).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    assert!(sink.lines[0].starts_with(
        "curl -s -XPUT --data-binary @- localhost:9200/_xpack/watcher/watch/Curl-Watch <<EOF\n"
    ));
    assert!(sink.lines[0].ends_with("\nEOF"));
}

#[test]
fn watcher_without_aggregation_alerts_on_any_hit() {
    let ctx = BackendContext::new(
        Arc::new(TableFieldMapping::new()),
        BackendOptions::from_tokens(["output=plain"]),
    );
    let mut backend = registry::create("xpack-watcher", &ctx).unwrap();
    backend.generate(&simple_rule("Any Hit")).unwrap();

    let mut sink = MemorySink::new();
    backend.finalize(&mut sink).unwrap();
    let body: serde_json::Value =
        serde_json::from_str(sink.lines[0].splitn(2, '\n').nth(1).unwrap()).unwrap();
    assert_eq!(
        body["condition"]["compare"]["ctx.payload.hits.total"]["not_eq"],
        0
    );
    assert_eq!(body["trigger"]["schedule"]["interval"], "30m");
}

#[test]
fn watcher_unknown_output_mode_fails_in_finalize() {
    let ctx = BackendContext::new(
        Arc::new(TableFieldMapping::new()),
        BackendOptions::from_tokens(["output=carrier-pigeon"]),
    );
    let mut backend = registry::create("xpack-watcher", &ctx).unwrap();
    backend.generate(&simple_rule("Odd Mode")).unwrap();

    let mut sink = MemorySink::new();
    let err = backend.finalize(&mut sink).unwrap_err();
    assert!(matches!(err, BackendError::NotImplemented(_)));
}
