use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ids::{Chapter, SectionIndex};
use crate::model::section::{Section, SectionDraft};
use crate::model::thesis;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog must contain at least one section")]
    Empty,

    #[error("chapter must be between 1 and 7, got {0}")]
    InvalidChapter(u8),

    #[error("section {index} has an empty date label")]
    EmptyDate { index: SectionIndex },

    #[error("section {index} has an empty title")]
    EmptyTitle { index: SectionIndex },

    #[error("schedule deadline {deadline} is before start {start}")]
    InvalidSchedule { start: NaiveDate, deadline: NaiveDate },
}

//
// ─── SCHEDULE ──────────────────────────────────────────────────────────────────
//

/// Planned calendar span of the schedule; drives the heatmap range and the
/// days-left counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    start: NaiveDate,
    deadline: NaiveDate,
}

impl ScheduleWindow {
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidSchedule` if `deadline < start`.
    pub fn new(start: NaiveDate, deadline: NaiveDate) -> Result<Self, CatalogError> {
        if deadline < start {
            return Err(CatalogError::InvalidSchedule { start, deadline });
        }
        Ok(Self { start, deadline })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    /// Every calendar day from start to deadline, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let deadline = self.deadline;
        self.start.iter_days().take_while(move |day| *day <= deadline)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The fixed, ordered list of planned sections.
///
/// Lookup tables (chapter → indices, date label → indices) are built once
/// here so aggregations never rescan the catalog to resolve positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sections: Vec<Section>,
    by_chapter: BTreeMap<Chapter, Vec<SectionIndex>>,
    by_date: HashMap<String, Vec<SectionIndex>>,
    schedule: ScheduleWindow,
}

impl Catalog {
    /// Build a catalog from drafts in schedule order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list, or the first
    /// validation error raised by a draft.
    pub fn new(drafts: Vec<SectionDraft>, schedule: ScheduleWindow) -> Result<Self, CatalogError> {
        if drafts.is_empty() {
            return Err(CatalogError::Empty);
        }

        let sections = drafts
            .into_iter()
            .enumerate()
            .map(|(pos, draft)| draft.validate(SectionIndex::new(pos)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_chapter: BTreeMap<Chapter, Vec<SectionIndex>> = BTreeMap::new();
        let mut by_date: HashMap<String, Vec<SectionIndex>> = HashMap::new();
        for section in &sections {
            by_chapter
                .entry(section.chapter())
                .or_default()
                .push(section.index());
            by_date
                .entry(section.date().to_owned())
                .or_default()
                .push(section.index());
        }

        Ok(Self {
            sections,
            by_chapter,
            by_date,
            schedule,
        })
    }

    /// The built-in thesis schedule (Feb 20 to Mar 30, 2025).
    ///
    /// # Panics
    ///
    /// Panics if the embedded schedule data is invalid.
    #[must_use]
    pub fn thesis() -> Self {
        let schedule = ScheduleWindow::new(thesis::start_date(), thesis::deadline())
            .expect("built-in schedule window should be valid");
        Self::new(thesis::sections(), schedule).expect("built-in catalog should be valid")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false for a constructed catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn get(&self, index: SectionIndex) -> Option<&Section> {
        self.sections.get(index.value())
    }

    #[must_use]
    pub fn schedule(&self) -> ScheduleWindow {
        self.schedule
    }

    /// Chapters that have at least one section, ascending.
    pub fn chapters(&self) -> impl Iterator<Item = Chapter> + '_ {
        self.by_chapter.keys().copied()
    }

    /// Indices of sections in `chapter`, in catalog order.
    ///
    /// Returns `None` when no section declares that chapter.
    #[must_use]
    pub fn chapter_indices(&self, chapter: Chapter) -> Option<&[SectionIndex]> {
        self.by_chapter.get(&chapter).map(Vec::as_slice)
    }

    /// Indices of every section planned under `label`, in catalog order.
    #[must_use]
    pub fn indices_on(&self, label: &str) -> &[SectionIndex] {
        self.by_date.get(label).map(Vec::as_slice).unwrap_or_default()
    }
}
