use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::catalog::Catalog;
use crate::model::ids::SectionIndex;
use crate::model::section::Section;
use crate::progress::ProgressError;

/// Mutable per-section progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub completed: bool,
    /// Label of the day the section was actually done; starts as the plan.
    pub actual_date: String,
    pub notes: String,
}

impl CompletionRecord {
    /// Default record for a section: not done, planned date, no notes.
    #[must_use]
    pub fn planned(section: &Section) -> Self {
        Self {
            completed: false,
            actual_date: section.date().to_owned(),
            notes: String::new(),
        }
    }
}

/// One `CompletionRecord` per catalog index, stored densely in catalog order.
///
/// The key set always equals the catalog's index set: stores are only
/// created from a catalog (fresh or decoded) and never grow or shrink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStore {
    records: Vec<CompletionRecord>,
}

impl CompletionStore {
    /// Fresh defaults for every section of `catalog`.
    #[must_use]
    pub fn fresh(catalog: &Catalog) -> Self {
        Self {
            records: catalog
                .sections()
                .iter()
                .map(CompletionRecord::planned)
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: SectionIndex) -> Option<&CompletionRecord> {
        self.records.get(index.value())
    }

    /// False for unknown indices.
    #[must_use]
    pub fn is_completed(&self, index: SectionIndex) -> bool {
        self.get(index).is_some_and(|r| r.completed)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.records.iter().filter(|r| r.completed).count()
    }

    /// Records paired with their index, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionIndex, &CompletionRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(pos, record)| (SectionIndex::new(pos), record))
    }

    /// Flip `completed` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::IndexOutOfRange` if `index` is not in the store.
    pub fn toggle(&mut self, index: SectionIndex) -> Result<bool, ProgressError> {
        let record = self.record_mut(index)?;
        record.completed = !record.completed;
        Ok(record.completed)
    }

    /// Replace the note verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::IndexOutOfRange` if `index` is not in the store.
    pub fn set_note(
        &mut self,
        index: SectionIndex,
        text: impl Into<String>,
    ) -> Result<(), ProgressError> {
        self.record_mut(index)?.notes = text.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ProgressError::IndexOutOfRange` if `index` is not in the store.
    pub fn set_actual_date(
        &mut self,
        index: SectionIndex,
        label: impl Into<String>,
    ) -> Result<(), ProgressError> {
        self.record_mut(index)?.actual_date = label.into();
        Ok(())
    }

    pub(crate) fn replace(&mut self, index: SectionIndex, record: CompletionRecord) {
        if let Some(slot) = self.records.get_mut(index.value()) {
            *slot = record;
        }
    }

    fn record_mut(&mut self, index: SectionIndex) -> Result<&mut CompletionRecord, ProgressError> {
        let len = self.records.len();
        self.records
            .get_mut(index.value())
            .ok_or(ProgressError::IndexOutOfRange { index, len })
    }
}

/// Serializes as a JSON object keyed by the string-encoded index, in
/// catalog order.
impl Serialize for CompletionStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (index, record) in self.iter() {
            map.serialize_entry(&index.to_string(), record)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_mirrors_catalog() {
        let catalog = Catalog::thesis();
        let store = CompletionStore::fresh(&catalog);
        assert_eq!(store.len(), catalog.len());
        assert_eq!(store.completed_count(), 0);

        let first = store.get(SectionIndex::new(0)).unwrap();
        assert_eq!(first.actual_date, "Feb 20");
        assert!(first.notes.is_empty());
    }

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let catalog = Catalog::thesis();
        let mut store = CompletionStore::fresh(&catalog);
        let idx = SectionIndex::new(3);

        assert!(store.toggle(idx).unwrap());
        assert!(store.is_completed(idx));
        assert!(!store.toggle(idx).unwrap());
        assert!(!store.is_completed(idx));
    }

    #[test]
    fn mutations_reject_unknown_index() {
        let catalog = Catalog::thesis();
        let mut store = CompletionStore::fresh(&catalog);
        let idx = SectionIndex::new(catalog.len());

        assert_eq!(
            store.toggle(idx),
            Err(ProgressError::IndexOutOfRange {
                index: idx,
                len: catalog.len()
            })
        );
        assert!(store.set_note(idx, "x").is_err());
        assert!(store.set_actual_date(idx, "Mar 1").is_err());
        assert!(!store.is_completed(idx));
    }

    #[test]
    fn note_is_stored_verbatim() {
        let catalog = Catalog::thesis();
        let mut store = CompletionStore::fresh(&catalog);
        let idx = SectionIndex::new(1);
        store.set_note(idx, "  <b>draft</b> done \n").unwrap();
        assert_eq!(store.get(idx).unwrap().notes, "  <b>draft</b> done \n");
    }

    #[test]
    fn serializes_in_index_order_with_camel_case_fields() {
        let catalog = Catalog::thesis();
        let store = CompletionStore::fresh(&catalog);
        let json = serde_json::to_string(&store).unwrap();

        assert!(json.starts_with(r#"{"0":{"completed":false,"actualDate":"Feb 20","notes":""}"#));
        let pos_2 = json.find(r#""2":"#).unwrap();
        let pos_10 = json.find(r#""10":"#).unwrap();
        assert!(pos_2 < pos_10);
    }
}
