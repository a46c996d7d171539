//! Presentation-agnostic view models.
//!
//! These are **not** UI components:
//! - no markup or colors
//! - no pre-formatted numbers
//!
//! A renderer maps tones and states to whatever styling it uses.

use thesis_core::model::{Chapter, SectionIndex};
use thesis_core::progress::{ChapterWords, CitationCount, HeatmapCell, OverallProgress};

use crate::error::TrackerError;
use crate::tracker_service::TrackerService;

/// Fill shown for a planned, not yet completed writing section.
const PLANNED_BAR_FILL: u8 = 20;

/// Visual state of a chapter ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingTone {
    Idle,
    Active,
    Done,
}

impl RingTone {
    #[must_use]
    pub fn for_percentage(percentage: u8) -> Self {
        match percentage {
            100.. => Self::Done,
            1..=99 => Self::Active,
            0 => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRing {
    pub chapter: Chapter,
    pub percentage: u8,
    pub tone: RingTone,
}

/// The single authoritative "work on this next" pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextFocus {
    pub index: SectionIndex,
    pub title: String,
    pub date: String,
    pub chapter: Chapter,
    pub chapter_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub overall: OverallProgress,
    pub words_written: u32,
    pub days_left: u32,
    pub next_focus: Option<NextFocus>,
    pub rings: Vec<ChapterRing>,
    pub heatmap: Vec<HeatmapCell>,
}

/// One table row: catalog fields joined with the section's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerRow {
    pub index: SectionIndex,
    pub date: String,
    pub chapter: Chapter,
    pub chapter_name: String,
    pub title: String,
    pub concepts: String,
    pub purpose: String,
    pub paper: String,
    pub words: u32,
    pub critical: bool,
    pub completed: bool,
    pub actual_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarState {
    Complete,
    Critical,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttBar {
    pub index: SectionIndex,
    pub title: String,
    pub date: String,
    pub fill_percent: u8,
    pub state: BarState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsView {
    pub cumulative: Vec<usize>,
    pub citations: Vec<CitationCount>,
    pub words_by_chapter: Vec<ChapterWords>,
    pub sections_per_chapter: Vec<(Chapter, usize)>,
}

impl TrackerService {
    /// Headline metrics, chapter rings and the heatmap.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` if the store and catalog disagree in size.
    pub fn dashboard(&self) -> Result<DashboardView, TrackerError> {
        let model = self.model()?;

        let next_focus = match model.next_incomplete() {
            Some(section) => Some(NextFocus {
                index: section.index(),
                title: section.title().to_owned(),
                date: section.date().to_owned(),
                chapter: section.chapter(),
                chapter_percentage: model.chapter_progress(section.chapter().number())?,
            }),
            None => None,
        };

        let rings = model
            .chapter_overview()
            .into_iter()
            .map(|ch| ChapterRing {
                chapter: ch.chapter,
                percentage: ch.percentage,
                tone: RingTone::for_percentage(ch.percentage),
            })
            .collect();

        Ok(DashboardView {
            overall: model.overall_progress(),
            words_written: model.words_written(),
            days_left: self
                .clock()
                .days_until(self.catalog().schedule().deadline()),
            next_focus,
            rings,
            heatmap: model.heatmap(),
        })
    }

    /// Every catalog row with its current record, in catalog order.
    #[must_use]
    pub fn tracker_rows(&self) -> Vec<TrackerRow> {
        self.catalog()
            .sections()
            .iter()
            .filter_map(|section| {
                let record = self.store().get(section.index())?;
                Some(TrackerRow {
                    index: section.index(),
                    date: section.date().to_owned(),
                    chapter: section.chapter(),
                    chapter_name: section.chapter_name().to_owned(),
                    title: section.title().to_owned(),
                    concepts: section.concepts().to_owned(),
                    purpose: section.purpose().to_owned(),
                    paper: section.paper().to_owned(),
                    words: section.words(),
                    critical: section.is_critical(),
                    completed: record.completed,
                    actual_date: record.actual_date.clone(),
                    notes: record.notes.clone(),
                })
            })
            .collect()
    }

    /// Timeline bars: full when done, empty for open milestones, a stub otherwise.
    #[must_use]
    pub fn gantt(&self) -> Vec<GanttBar> {
        self.catalog()
            .sections()
            .iter()
            .map(|section| {
                let state = if self.store().is_completed(section.index()) {
                    BarState::Complete
                } else if section.is_critical() {
                    BarState::Critical
                } else {
                    BarState::Planned
                };
                let fill_percent = match state {
                    BarState::Complete => 100,
                    BarState::Critical => 0,
                    BarState::Planned => PLANNED_BAR_FILL,
                };
                GanttBar {
                    index: section.index(),
                    title: section.title().to_owned(),
                    date: section.date().to_owned(),
                    fill_percent,
                    state,
                }
            })
            .collect()
    }

    /// Series for the analytics charts.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` if the store and catalog disagree in size.
    pub fn analytics(&self) -> Result<AnalyticsView, TrackerError> {
        let model = self.model()?;
        Ok(AnalyticsView {
            cumulative: model.cumulative_series().collect(),
            citations: model.citation_usage(),
            words_by_chapter: model.words_by_chapter(),
            sections_per_chapter: model.sections_per_chapter(),
        })
    }
}
