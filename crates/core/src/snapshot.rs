//! Portable form of the completion store.
//!
//! The document is a JSON object keyed by string-encoded section index:
//!
//! ```json
//! { "0": { "completed": true, "actualDate": "Feb 20", "notes": "" } }
//! ```
//!
//! The same document is used for the persisted blob and for export files.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{Catalog, CompletionRecord, CompletionStore, SectionIndex};

/// Fixed storage name the persisted snapshot lives under.
pub const STORAGE_KEY: &str = "thesisProgress3D";

const EXPORT_PREFIX: &str = "thesis-nexus-export";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("format error: {0}")]
    Format(String),
}

impl SnapshotError {
    fn format(reason: impl Into<String>) -> Self {
        Self::Format(reason.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    completed: bool,
    #[serde(default)]
    actual_date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Document entries in payload order. Unlike a map, repeated keys survive
/// parsing so `decode` can reject them.
struct WireDocument(Vec<(String, WireRecord)>);

impl<'de> Deserialize<'de> for WireDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = WireDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of section records keyed by index")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, WireRecord>()? {
                    entries.push(entry);
                }
                Ok(WireDocument(entries))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Serialize the whole store, pretty-printed, in catalog order.
///
/// # Errors
///
/// Returns `SnapshotError::Format` if serialization fails.
pub fn encode(store: &CompletionStore) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(store).map_err(|err| SnapshotError::format(err.to_string()))
}

/// Parse a snapshot document against `catalog`.
///
/// Indices absent from the document keep their defaults. Decoding builds a
/// new store, so a failure never touches the caller's current one.
///
/// # Errors
///
/// Returns `SnapshotError::Format` if the payload is not a JSON object of
/// records, a key is not a canonical base-10 index, a key has no catalog
/// section, or two records name the same section.
pub fn decode(catalog: &Catalog, payload: &str) -> Result<CompletionStore, SnapshotError> {
    let WireDocument(entries) =
        serde_json::from_str(payload).map_err(|err| SnapshotError::format(err.to_string()))?;

    let mut store = CompletionStore::fresh(catalog);
    let mut seen = BTreeSet::new();
    for (key, wire) in entries {
        let index: SectionIndex = key
            .parse()
            .map_err(|_| SnapshotError::format(format!("key {key:?} is not a section index")))?;
        let section = catalog.get(index).ok_or_else(|| {
            SnapshotError::format(format!(
                "section {index} does not exist (catalog has {})",
                catalog.len()
            ))
        })?;
        if !seen.insert(index) {
            return Err(SnapshotError::format(format!(
                "section {index} appears more than once"
            )));
        }

        store.replace(
            index,
            CompletionRecord {
                completed: wire.completed,
                actual_date: wire
                    .actual_date
                    .unwrap_or_else(|| section.date().to_owned()),
                notes: wire.notes.unwrap_or_default(),
            },
        );
    }
    Ok(store)
}

/// Download name for an export taken on `day`.
#[must_use]
pub fn export_file_name(day: NaiveDate) -> String {
    format!("{EXPORT_PREFIX}-{}.json", day.format("%Y-%m-%d"))
}
