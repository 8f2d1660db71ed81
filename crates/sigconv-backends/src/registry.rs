//! Backend registry: the closed set of supported target identifiers
//! and the construction context handed to each backend.

use std::sync::Arc;

use crate::backend::Backend;
use crate::backends;
use crate::error::{BackendError, Result};
use crate::fieldmap::{FieldMapping, TableFieldMapping};
use crate::options::BackendOptions;

/// Shared inputs every backend is constructed from: the field mapping
/// for the target and any backend-specific `key=value` options.
pub struct BackendContext {
    pub mapping: Arc<dyn FieldMapping>,
    pub options: BackendOptions,
}

impl BackendContext {
    pub fn new(mapping: Arc<dyn FieldMapping>, options: BackendOptions) -> Self {
        BackendContext { mapping, options }
    }
}

impl Default for BackendContext {
    fn default() -> Self {
        BackendContext {
            mapping: Arc::new(TableFieldMapping::new()),
            options: BackendOptions::default(),
        }
    }
}

/// One registered backend: identifier, human description, whether it is
/// selectable, and its constructor.
pub struct BackendEntry {
    pub identifier: &'static str,
    pub description: &'static str,
    pub active: bool,
    build: fn(&BackendContext) -> Result<Box<dyn Backend>>,
}

static ENTRIES: &[BackendEntry] = &[
    BackendEntry {
        identifier: "es-qs",
        description: "Elasticsearch query strings",
        active: true,
        build: backends::elastic::build_es_qs,
    },
    BackendEntry {
        identifier: "kibana",
        description: "Kibana saved searches (JSON import file)",
        active: true,
        build: backends::elastic::build_kibana,
    },
    BackendEntry {
        identifier: "xpack-watcher",
        description: "Elastic X-Pack Watcher alert definitions",
        active: true,
        build: backends::elastic::build_xpack_watcher,
    },
    BackendEntry {
        identifier: "graylog",
        description: "Graylog query strings",
        active: true,
        build: backends::graylog::build,
    },
    BackendEntry {
        identifier: "splunk",
        description: "Splunk Search Processing Language",
        active: true,
        build: backends::splunk::build,
    },
    BackendEntry {
        identifier: "logpoint",
        description: "LogPoint search queries",
        active: true,
        build: backends::logpoint::build,
    },
    BackendEntry {
        identifier: "as",
        description: "ArcSight saved searches",
        active: true,
        build: backends::arcsight::build,
    },
    BackendEntry {
        identifier: "qradar",
        description: "QRadar AQL queries",
        active: true,
        build: backends::qradar::build,
    },
    BackendEntry {
        identifier: "qualys",
        description: "Qualys saved searches",
        active: true,
        build: backends::qualys::build,
    },
    BackendEntry {
        identifier: "grep",
        description: "grep -P command lines (development aid)",
        active: true,
        build: backends::grep::build,
    },
    BackendEntry {
        identifier: "fieldlist",
        description: "List of referenced field names (development aid)",
        active: true,
        build: backends::fieldlist::build,
    },
];

/// All registered backends, including inactive ones.
pub fn builtin() -> &'static [BackendEntry] {
    ENTRIES
}

/// Look up an active backend by identifier.
pub fn lookup(identifier: &str) -> Result<&'static BackendEntry> {
    ENTRIES
        .iter()
        .find(|e| e.identifier == identifier && e.active)
        .ok_or_else(|| BackendError::UnknownBackend(identifier.to_string()))
}

/// Construct the backend registered under `identifier`.
pub fn create(identifier: &str, ctx: &BackendContext) -> Result<Box<dyn Backend>> {
    let entry = lookup(identifier)?;
    (entry.build)(ctx)
}
