#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod tracker_service;

pub use thesis_core::Clock;

pub use dashboard::{
    AnalyticsView, BarState, ChapterRing, DashboardView, GanttBar, NextFocus, RingTone, TrackerRow,
};
pub use error::{AppServicesError, TrackerError};
pub use tracker_service::{ExportDocument, TrackerService};
