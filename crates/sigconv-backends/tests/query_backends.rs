use std::sync::Arc;

use sigconv_ast::{
    Aggregation, AggFunc, CompareOp, ConditionNode, ParsedQuery, ParsedRule, RuleContext,
    ValueNode,
};
use sigconv_backends::backend::{Backend, RuleOutput};
use sigconv_backends::error::BackendError;
use sigconv_backends::fieldmap::TableFieldMapping;
use sigconv_backends::options::BackendOptions;
use sigconv_backends::registry::{self, BackendContext};

fn map(field: &str, value: ValueNode) -> ConditionNode {
    ConditionNode::map_item(field, value)
}

fn rule(title: &str, search: ConditionNode) -> ParsedRule {
    ParsedRule::new(RuleContext::new(title), ParsedQuery::new(search))
}

fn query(backend: &mut dyn Backend, rule: &ParsedRule) -> String {
    match backend.generate(rule).unwrap() {
        RuleOutput::Query(q) => q,
        other => panic!("expected a query, got {other:?}"),
    }
}

fn backend(identifier: &str) -> Box<dyn Backend> {
    registry::create(identifier, &BackendContext::default()).unwrap()
}

fn backend_with_mapping(identifier: &str, mapping: TableFieldMapping) -> Box<dyn Backend> {
    let ctx = BackendContext::new(Arc::new(mapping), BackendOptions::new());
    registry::create(identifier, &ctx).unwrap()
}

// -----------------------------------------------------------------------------
// es-qs / graylog
// -----------------------------------------------------------------------------

#[test]
fn es_qs_renders_boolean_tree() {
    let mut b = backend("es-qs");
    let r = rule(
        "Whoami",
        ConditionNode::And(vec![
            map("EventID", ValueNode::int(4688)),
            map("CommandLine", ValueNode::str("whoami *")),
        ]),
    );
    assert_eq!(
        query(b.as_mut(), &r),
        r#"EventID:"4688" AND CommandLine:"whoami *""#
    );
}

#[test]
fn es_qs_escapes_lucene_reserved_characters() {
    let mut b = backend("es-qs");
    let r = rule(
        "Cmd",
        map("Image", ValueNode::str(r"C:\Windows\System32\cmd.exe")),
    );
    assert_eq!(
        query(b.as_mut(), &r),
        r#"Image:"C\:\\Windows\\System32\\cmd.exe""#
    );
}

#[test]
fn es_qs_strips_angle_brackets() {
    let mut b = backend("es-qs");
    let r = rule("Tag", map("field", ValueNode::str("<script>")));
    assert_eq!(query(b.as_mut(), &r), r#"field:"script""#);
}

#[test]
fn es_qs_list_valued_map_item_uses_generic_grouping() {
    let mut b = backend("es-qs");
    let r = rule("Ids", map("EventID", ValueNode::list([4688i64, 4689])));
    assert_eq!(query(b.as_mut(), &r), r#"EventID:("4688" "4689")"#);
}

#[test]
fn es_qs_null_tests_use_exists() {
    let mut b = backend("es-qs");
    let r = rule(
        "Orphan",
        ConditionNode::Null {
            field: "ParentImage".to_string(),
        },
    );
    assert_eq!(query(b.as_mut(), &r), "NOT _exists_:ParentImage");
}

#[test]
fn es_qs_has_no_aggregation_support() {
    let mut b = backend("es-qs");
    let r = ParsedRule::new(
        RuleContext::new("Count"),
        ParsedQuery::with_aggregation(
            map("EventID", ValueNode::int(4625)),
            Aggregation::count("EventID", Some(CompareOp::Gt), 5),
        ),
    );
    let err = b.generate(&r).unwrap_err();
    assert!(matches!(err, BackendError::NotImplemented(_)));
}

#[test]
fn graylog_escapes_backslashes_before_plain_characters() {
    let mut b = backend("graylog");
    let r = rule("Path", map("path", ValueNode::str(r"C:\tmp*")));
    assert_eq!(query(b.as_mut(), &r), r#"path:"C\:\\tmp*""#);
}

#[test]
fn graylog_keeps_backslash_escaped_wildcards_verbatim() {
    let mut b = backend("graylog");
    let r = rule("Star", map("path", ValueNode::str(r"C:\*cache\data")));
    assert_eq!(query(b.as_mut(), &r), r#"path:"C\:\*cache\\data""#);
}

// -----------------------------------------------------------------------------
// splunk / logpoint
// -----------------------------------------------------------------------------

#[test]
fn splunk_joins_and_with_whitespace() {
    let mut b = backend("splunk");
    let r = rule(
        "Proc",
        ConditionNode::And(vec![
            map("EventID", ValueNode::int(1)),
            map("Image", ValueNode::str("whoami.exe")),
        ]),
    );
    assert_eq!(query(b.as_mut(), &r), r#"EventID="1" Image="whoami.exe""#);
}

#[test]
fn splunk_expands_list_values_into_or_pairs() {
    let mut b = backend("splunk");
    let r = rule("Ids", map("EventID", ValueNode::list([4688i64, 4689])));
    assert_eq!(
        query(b.as_mut(), &r),
        r#"(EventID="4688" OR EventID="4689")"#
    );
}

#[test]
fn splunk_appends_stats_stage_for_aggregations() {
    let mut b = backend("splunk");
    let mut agg = Aggregation::count("EventID", Some(CompareOp::Gt), 5);
    agg.group_field = Some("ComputerName".to_string());
    let r = ParsedRule::new(
        RuleContext::new("Burst"),
        ParsedQuery::with_aggregation(map("EventID", ValueNode::int(4625)), agg),
    );
    assert_eq!(
        query(b.as_mut(), &r),
        r#"EventID="4625" | stats count(EventID) as val by ComputerName | search val > 5"#
    );
}

#[test]
fn splunk_missing_comparison_means_not_zero() {
    let mut b = backend("splunk");
    let r = ParsedRule::new(
        RuleContext::new("Any"),
        ParsedQuery::with_aggregation(
            map("EventID", ValueNode::int(4625)),
            Aggregation::count("EventID", None, 0),
        ),
    );
    assert!(query(b.as_mut(), &r).ends_with("| search val != 0"));
}

#[test]
fn splunk_rejects_near_aggregation() {
    let mut b = backend("splunk");
    let agg = Aggregation {
        func: AggFunc::Near,
        field: "EventID".to_string(),
        group_field: None,
        compare: None,
        threshold: 0,
    };
    let r = ParsedRule::new(
        RuleContext::new("Near"),
        ParsedQuery::with_aggregation(map("EventID", ValueNode::int(1)), agg),
    );
    let err = b.generate(&r).unwrap_err();
    assert!(matches!(err, BackendError::NotImplemented(_)));
}

#[test]
fn logpoint_uses_in_lists_and_dash_negation() {
    let mut b = backend("logpoint");
    let r = rule("Ids", map("EventID", ValueNode::list([4688i64, 4689])));
    assert_eq!(query(b.as_mut(), &r), r#"EventID IN ["4688", "4689"]"#);

    let mut b = backend("logpoint");
    let r = rule(
        "Orphan",
        ConditionNode::Null {
            field: "ParentImage".to_string(),
        },
    );
    assert_eq!(query(b.as_mut(), &r), "-ParentImage=*");
}

#[test]
fn logpoint_appends_chart_stage_for_aggregations() {
    let mut b = backend("logpoint");
    let r = ParsedRule::new(
        RuleContext::new("Burst"),
        ParsedQuery::with_aggregation(
            map("EventID", ValueNode::int(4625)),
            Aggregation::count("EventID", Some(CompareOp::Gte), 10),
        ),
    );
    assert_eq!(
        query(b.as_mut(), &r),
        r#"EventID="4625" | chart count(EventID) as val | search val >= 10"#
    );
}

// -----------------------------------------------------------------------------
// arcsight / qradar
// -----------------------------------------------------------------------------

#[test]
fn arcsight_compares_known_fields_directly() {
    let mut b = backend("as");
    let r = rule("Product", map("deviceProduct", ValueNode::str("windows")));
    let q = query(b.as_mut(), &r);
    assert!(q.starts_with(r#"deviceProduct = "windows" AND type != 2"#), "{q}");
}

#[test]
fn arcsight_downgrades_unknown_fields_to_fragment_search() {
    let mut b = backend("as");
    let r = rule("Net User", map("CommandLine", ValueNode::str("net user add")));
    let q = query(b.as_mut(), &r);
    assert!(q.starts_with(r#"("net" AND "user" AND "add")"#), "{q}");
}

#[test]
fn arcsight_appends_rex_trailer_with_rule_title() {
    let mut b = backend("as");
    let r = rule("My Rule", map("deviceVendor", ValueNode::str("Microsoft")));
    let q = query(b.as_mut(), &r);
    assert!(
        q.ends_with(r#"| rex field = flexString1 mode=sed "s//Sigma: My Rule/g""#),
        "{q}"
    );
}

#[test]
fn arcsight_or_of_keyword_values_is_fragment_quoted() {
    let mut b = backend("as");
    let r = rule(
        "Keywords",
        ConditionNode::Or(vec![
            ConditionNode::Value("net user".into()),
            ConditionNode::Value("whoami".into()),
        ]),
    );
    let q = query(b.as_mut(), &r);
    assert!(q.starts_with(r#"(("net" AND "user") OR "whoami")"#), "{q}");
}

#[test]
fn arcsight_honors_mapping_allow_list() {
    let mut mapping = TableFieldMapping::new();
    mapping.insert_one("CommandLine", "destinationServiceName");
    let mut b = backend_with_mapping("as", mapping);
    let r = rule(
        "Mapped",
        map("destinationServiceName", ValueNode::str("lsass.exe")),
    );
    let q = query(b.as_mut(), &r);
    assert!(q.starts_with(r#"destinationServiceName = "lsass.exe""#), "{q}");
}

#[test]
fn qradar_prefixes_aql_header() {
    let mut b = backend("qradar");
    let r = rule("Payload", map("CommandLine", ValueNode::str("whoami")));
    assert_eq!(
        query(b.as_mut(), &r),
        "SELECT UTF8(payload) as search_payload from events where search_payload ilike 'whoami'"
    );
}

#[test]
fn qradar_maps_wildcards_to_percent() {
    let mut b = backend("qradar");
    let r = rule("Wild", map("CommandLine", ValueNode::str("*mimikatz*")));
    assert!(query(b.as_mut(), &r).ends_with("search_payload ilike '%mimikatz%'"));
}

#[test]
fn qradar_compares_mapped_fields_quoted() {
    let mut mapping = TableFieldMapping::new();
    mapping.insert_one("EventID", "EventID");
    let mut b = backend_with_mapping("qradar", mapping);
    let r = rule("Id", map("EventID", ValueNode::int(4688)));
    assert!(query(b.as_mut(), &r).ends_with(r#""EventID"='4688'"#));
}

#[test]
fn qradar_matches_device_product_against_payload() {
    let mut b = backend("qradar");
    let r = rule("Product", map("deviceProduct", ValueNode::str("windows")));
    assert_eq!(
        query(b.as_mut(), &r),
        "SELECT UTF8(payload) as search_payload from events where windows"
    );
}

// -----------------------------------------------------------------------------
// development aids
// -----------------------------------------------------------------------------

#[test]
fn grep_builds_lookahead_pattern() {
    let mut b = backend("grep");
    let r = rule(
        "Pair",
        ConditionNode::And(vec![
            map("a", ValueNode::str("foo*")),
            map("b", ValueNode::str("bar")),
        ]),
    );
    assert_eq!(query(b.as_mut(), &r), "grep -P '^(?=.*foo.*)(?=.*bar)'");
}

#[test]
fn grep_escapes_regex_metacharacters() {
    let mut b = backend("grep");
    let r = rule("Dot", map("path", ValueNode::str("cmd.exe")));
    assert_eq!(query(b.as_mut(), &r), r"grep -P '^cmd\.exe'");
}

#[test]
fn grep_negation_uses_negative_lookahead() {
    let mut b = backend("grep");
    let r = rule(
        "NotAdmin",
        ConditionNode::Not(Box::new(map("user", ValueNode::str("admin")))),
    );
    assert_eq!(query(b.as_mut(), &r), "grep -P '^(?!.*admin)'");
}

#[test]
fn fieldlist_emits_sorted_unique_field_names() {
    let mut b = backend("fieldlist");
    let r = rule(
        "Fields",
        ConditionNode::And(vec![
            map("CommandLine", ValueNode::str("x")),
            ConditionNode::Or(vec![
                map("EventID", ValueNode::int(1)),
                map("EventID", ValueNode::int(2)),
            ]),
        ]),
    );
    assert_eq!(query(b.as_mut(), &r), "CommandLine\nEventID");
}

#[test]
fn fieldlist_rejects_null_tests() {
    let mut b = backend("fieldlist");
    let r = rule(
        "Orphan",
        ConditionNode::Null {
            field: "ParentImage".to_string(),
        },
    );
    let err = b.generate(&r).unwrap_err();
    assert!(matches!(err, BackendError::NotImplemented(_)));
}
