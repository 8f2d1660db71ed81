//! Target-specific backend implementations.
//!
//! Purely declarative targets live in [`crate::textquery`] and only
//! contribute a syntax descriptor and escape set here; targets with
//! structural quirks carry their own types.

pub mod arcsight;
pub mod elastic;
pub mod fieldlist;
pub mod graylog;
pub mod grep;
pub mod logpoint;
pub mod qradar;
pub mod qualys;
pub mod splunk;
