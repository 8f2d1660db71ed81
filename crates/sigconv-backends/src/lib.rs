//! # sigconv-backends
//!
//! Query generation backends for Sigma detection rules: turn a parsed
//! condition tree ([`sigconv_ast`]) into target-specific search queries.
//!
//! Supported targets:
//!
//! - **Elastic family**: `es-qs` query strings, `kibana` saved-search
//!   collections, `xpack-watcher` alert definitions
//! - **Query-string dialects**: `graylog`
//! - **Pipeline languages**: `splunk`, `logpoint` (with aggregations)
//! - **Allow-list targets**: `as` (ArcSight), `qradar`, `qualys` —
//!   fields outside the target schema are downgraded or dropped, with
//!   the result classified as a partial or impossible match
//! - **Development aids**: `grep` regex command lines, `fieldlist`
//!
//! ## Architecture
//!
//! - A syntax descriptor ([`syntax::QuerySyntax`]) and an escape set
//!   ([`cleaning::ValueCleaner`]) drive a shared declarative renderer
//!   ([`render::QueryRender`]); backends override only the node types
//!   their target treats specially
//! - Purely declarative targets are just a descriptor plus an escape
//!   set ([`textquery::TextQueryBackend`])
//! - [`registry`] holds the closed set of target identifiers;
//!   [`convert::convert_rules`] drives a batch of rules through one
//!   backend and reports per-rule outcomes
//!
//! ## Quick Start
//!
//! ```rust
//! use sigconv_ast::{ConditionNode, ParsedQuery, ParsedRule, RuleContext, ValueNode};
//! use sigconv_backends::convert::convert_rules;
//! use sigconv_backends::output::MemorySink;
//! use sigconv_backends::registry::{self, BackendContext};
//!
//! let rule = ParsedRule::new(
//!     RuleContext::new("Whoami Execution"),
//!     ParsedQuery::new(ConditionNode::map_item("CommandLine", ValueNode::str("whoami"))),
//! );
//!
//! let ctx = BackendContext::default();
//! let mut backend = registry::create("es-qs", &ctx).unwrap();
//! let mut sink = MemorySink::new();
//! convert_rules(backend.as_mut(), &[rule], &mut sink).unwrap();
//! assert_eq!(sink.lines, vec!["CommandLine:\"whoami\""]);
//! ```

pub mod backend;
pub mod backends;
pub mod cleaning;
pub mod convert;
pub mod error;
pub mod fieldmap;
pub mod naming;
pub mod options;
pub mod output;
pub mod registry;
pub mod render;
pub mod syntax;
pub mod textquery;

pub use backend::{Backend, MatchClass, RuleOutput};
pub use convert::{convert_rules, RuleReport, RuleStatus};
pub use error::{BackendError, Result};
pub use registry::BackendContext;
