//! Progress aggregation over a catalog and a completion store.
//!
//! Every method on [`ProgressModel`] is a pure projection of its two
//! borrowed inputs; nothing is cached between calls, so results always
//! reflect the store as it is when the method runs.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Catalog, Chapter, CompletionStore, Section, SectionIndex};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("chapter {0} has no sections in the catalog")]
    InvalidChapter(u8),

    #[error("section index {index} is out of range (len {len})")]
    IndexOutOfRange { index: SectionIndex, len: usize },

    #[error("store holds {store} records but catalog has {catalog} sections")]
    StoreMismatch { catalog: usize, store: usize },
}

//
// ─── AGGREGATES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterProgress {
    pub chapter: Chapter,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterWords {
    pub chapter: Chapter,
    pub words: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationCount {
    pub key: String,
    pub count: usize,
}

/// Heatmap state of one display date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    /// No section is planned under the label.
    NoTask,
    /// At least one section under the label is still open.
    Pending,
    /// Every section sharing the label is completed.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub label: String,
    pub status: DateStatus,
}

/// Aggregates handed back after every mutation so callers can redraw
/// without a second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub overall: OverallProgress,
    pub words_written: u32,
    pub chapters: Vec<ChapterProgress>,
    pub next_incomplete: Option<SectionIndex>,
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}

/// Chart key for a citation: first word of the label plus " et al.".
///
/// Returns `None` for the "-" sentinel.
#[must_use]
pub fn citation_key(paper: &str) -> Option<String> {
    if paper == crate::model::NO_CITATION {
        return None;
    }
    paper
        .split_whitespace()
        .next()
        .map(|first| format!("{first} et al."))
}

/// Heatmap label for a calendar day, matching catalog date labels ("Mar 4").
#[must_use]
pub fn date_label(day: NaiveDate) -> String {
    day.format("%b %-d").to_string()
}

//
// ─── MODEL ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy)]
pub struct ProgressModel<'a> {
    catalog: &'a Catalog,
    store: &'a CompletionStore,
}

impl<'a> ProgressModel<'a> {
    /// # Errors
    ///
    /// Returns `ProgressError::StoreMismatch` if the store was not built for
    /// this catalog.
    pub fn new(catalog: &'a Catalog, store: &'a CompletionStore) -> Result<Self, ProgressError> {
        if catalog.len() != store.len() {
            return Err(ProgressError::StoreMismatch {
                catalog: catalog.len(),
                store: store.len(),
            });
        }
        Ok(Self { catalog, store })
    }

    fn completed_sections(&self) -> impl Iterator<Item = &'a Section> + use<'a> {
        let store = self.store;
        self.catalog
            .sections()
            .iter()
            .filter(move |s| store.is_completed(s.index()))
    }

    #[must_use]
    pub fn overall_progress(&self) -> OverallProgress {
        let completed = self.store.completed_count();
        let total = self.catalog.len();
        OverallProgress {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    /// Completion percentage of one chapter.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidChapter` if no section declares `number`.
    pub fn chapter_progress(&self, number: u8) -> Result<u8, ProgressError> {
        Ok(self.chapter_detail(number)?.percentage)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::InvalidChapter` if no section declares `number`.
    pub fn chapter_detail(&self, number: u8) -> Result<ChapterProgress, ProgressError> {
        let chapter = Chapter::new(number).map_err(|_| ProgressError::InvalidChapter(number))?;
        let indices = self
            .catalog
            .chapter_indices(chapter)
            .ok_or(ProgressError::InvalidChapter(number))?;
        Ok(self.tally(chapter, indices))
    }

    fn tally(&self, chapter: Chapter, indices: &[SectionIndex]) -> ChapterProgress {
        let completed = indices
            .iter()
            .filter(|idx| self.store.is_completed(**idx))
            .count();
        ChapterProgress {
            chapter,
            completed,
            total: indices.len(),
            percentage: percentage(completed, indices.len()),
        }
    }

    /// Progress of every chapter present in the catalog, ascending.
    #[must_use]
    pub fn chapter_overview(&self) -> Vec<ChapterProgress> {
        self.catalog
            .chapters()
            .filter_map(|ch| {
                self.catalog
                    .chapter_indices(ch)
                    .map(|indices| self.tally(ch, indices))
            })
            .collect()
    }

    /// Section count per chapter present in the catalog, ascending.
    #[must_use]
    pub fn sections_per_chapter(&self) -> Vec<(Chapter, usize)> {
        self.catalog
            .chapters()
            .map(|ch| (ch, self.catalog.chapter_indices(ch).map_or(0, <[_]>::len)))
            .collect()
    }

    /// Running count of completed sections, one value per catalog index.
    pub fn cumulative_series(&self) -> impl Iterator<Item = usize> + use<'a> {
        let store = self.store;
        store.iter().scan(0_usize, |running, (_, record)| {
            if record.completed {
                *running += 1;
            }
            Some(*running)
        })
    }

    /// Target words of completed sections; milestones add nothing.
    #[must_use]
    pub fn words_written(&self) -> u32 {
        self.completed_sections()
            .fold(0_u32, |acc, s| acc.saturating_add(s.words()))
    }

    /// Words per chapter over completed sections, in order of each chapter's
    /// first completed section. Chapters with nothing completed are absent.
    #[must_use]
    pub fn words_by_chapter(&self) -> Vec<ChapterWords> {
        let mut out: Vec<ChapterWords> = Vec::new();
        for section in self.completed_sections() {
            match out.iter_mut().find(|e| e.chapter == section.chapter()) {
                Some(entry) => entry.words = entry.words.saturating_add(section.words()),
                None => out.push(ChapterWords {
                    chapter: section.chapter(),
                    words: section.words(),
                }),
            }
        }
        out
    }

    /// Completed sections per citation key, in order of first use.
    #[must_use]
    pub fn citation_usage(&self) -> Vec<CitationCount> {
        let mut out: Vec<CitationCount> = Vec::new();
        for key in self.completed_sections().filter_map(|s| s.citation().and_then(citation_key)) {
            match out.iter_mut().find(|e| e.key == key) {
                Some(entry) => entry.count += 1,
                None => out.push(CitationCount { key, count: 1 }),
            }
        }
        out
    }

    /// First open section in catalog order; `None` once everything is done.
    #[must_use]
    pub fn next_incomplete(&self) -> Option<&'a Section> {
        let store = self.store;
        self.catalog
            .sections()
            .iter()
            .find(|s| !store.is_completed(s.index()))
    }

    /// Status of a display date across every section sharing the label.
    #[must_use]
    pub fn date_status(&self, label: &str) -> DateStatus {
        let indices = self.catalog.indices_on(label);
        if indices.is_empty() {
            DateStatus::NoTask
        } else if indices.iter().all(|idx| self.store.is_completed(*idx)) {
            DateStatus::Complete
        } else {
            DateStatus::Pending
        }
    }

    /// One cell per day of the catalog's schedule window.
    #[must_use]
    pub fn heatmap(&self) -> Vec<HeatmapCell> {
        self.cells(self.catalog.schedule().days())
    }

    /// One cell per calendar day from `start` to `end`, inclusive. Empty when
    /// `start` is after `end`.
    #[must_use]
    pub fn heatmap_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<HeatmapCell> {
        self.cells(start.iter_days().take_while(|day| *day <= end))
    }

    fn cells(&self, days: impl Iterator<Item = NaiveDate>) -> Vec<HeatmapCell> {
        days.map(|date| {
            let label = date_label(date);
            let status = self.date_status(&label);
            HeatmapCell {
                date,
                label,
                status,
            }
        })
        .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            overall: self.overall_progress(),
            words_written: self.words_written(),
            chapters: self.chapter_overview(),
            next_incomplete: self.next_incomplete().map(Section::index),
        }
    }
}
