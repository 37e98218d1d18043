//! Template persistence.
//!
//! Two forms: JSON for the remote-store wire, MessagePack for compact
//! local draft snapshots. There is no schema version field; fields added
//! after the first release (`format`, `underline`) are `serde(default)`
//! so templates saved by older builds load forward-compatibly.

use crate::model::Template;

/// Serialize a template for the remote-store wire.
pub fn to_json(template: &Template) -> serde_json::Result<String> {
    serde_json::to_string(template)
}

pub fn from_json(s: &str) -> serde_json::Result<Template> {
    serde_json::from_str(s)
}

/// Serialize a template as a compact local draft snapshot.
pub fn to_snapshot(template: &Template) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(template)
}

pub fn from_snapshot(bytes: &[u8]) -> Result<Template, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}
