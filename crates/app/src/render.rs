//! Plain-text rendering of the tracker views for a terminal.

use std::io::{self, Write};

use services::{AnalyticsView, BarState, DashboardView, GanttBar, RingTone, TrackerRow};
use thesis_core::progress::{DateStatus, HeatmapCell, ProgressSnapshot};

const BAR_WIDTH: usize = 20;

fn bar(percentage: u8, width: usize) -> String {
    let filled = usize::from(percentage.min(100)) * width / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

fn tone_marker(tone: RingTone) -> &'static str {
    match tone {
        RingTone::Done => "done",
        RingTone::Active => "active",
        RingTone::Idle => "idle",
    }
}

fn status_glyph(status: DateStatus) -> char {
    match status {
        DateStatus::Complete => '#',
        DateStatus::Pending => 'o',
        DateStatus::NoTask => '.',
    }
}

pub fn status(out: &mut impl Write, view: &DashboardView) -> io::Result<()> {
    writeln!(
        out,
        "Overall  [{}] {:>3}%  ({}/{} sections)",
        bar(view.overall.percentage, BAR_WIDTH),
        view.overall.percentage,
        view.overall.completed,
        view.overall.total
    )?;
    writeln!(out, "Words    {}", view.words_written)?;
    writeln!(out, "Days left {}", view.days_left)?;
    writeln!(out)?;

    for ring in &view.rings {
        writeln!(
            out,
            "{:<5} [{}] {:>3}%  {}",
            ring.chapter.label(),
            bar(ring.percentage, 10),
            ring.percentage,
            tone_marker(ring.tone)
        )?;
    }
    writeln!(out)?;

    match &view.next_focus {
        Some(focus) => writeln!(
            out,
            "Next: #{} {} ({}, {} at {}%)",
            focus.index,
            focus.title,
            focus.date,
            focus.chapter.label(),
            focus.chapter_percentage
        ),
        None => writeln!(out, "Next: all sections complete"),
    }
}

/// One line per section plus an indented detail line with the chapter
/// name, the section's purpose and its concepts.
pub fn table(out: &mut impl Write, rows: &[TrackerRow]) -> io::Result<()> {
    writeln!(
        out,
        "{:>3} {:<3} {:<7} {:<5} {:<44} {:<28} {:>5}  {:<7} {}",
        "#", "", "Date", "Ch", "Section", "Paper", "Words", "Actual", "Notes"
    )?;
    for row in rows {
        let check = if row.completed { "[x]" } else { "[ ]" };
        writeln!(
            out,
            "{:>3} {} {:<7} {:<5} {:<44} {:<28} {:>5}  {:<7} {}",
            row.index,
            check,
            row.date,
            row.chapter.label(),
            row.title,
            row.paper,
            row.words,
            row.actual_date,
            row.notes
        )?;
        let badge = if row.critical { "CRITICAL  " } else { "" };
        writeln!(
            out,
            "    {badge}{} / {} / {}",
            row.chapter_name, row.purpose, row.concepts
        )?;
    }
    Ok(())
}

/// Seven cells per line, starting at the first day of the schedule.
pub fn heatmap(out: &mut impl Write, cells: &[HeatmapCell]) -> io::Result<()> {
    for week in cells.chunks(7) {
        let Some(first) = week.first() else {
            continue;
        };
        let glyphs: String = week.iter().map(|cell| status_glyph(cell.status)).collect();
        writeln!(out, "{:<7} {glyphs}", first.label)?;
    }
    writeln!(out)?;
    writeln!(out, "# complete  o pending  . no task")
}

pub fn gantt(out: &mut impl Write, bars: &[GanttBar]) -> io::Result<()> {
    for item in bars {
        let flag = if item.state == BarState::Critical { " !" } else { "" };
        writeln!(
            out,
            "{:<7} [{}] {}{flag}",
            item.date,
            bar(item.fill_percent, BAR_WIDTH),
            item.title
        )?;
    }
    Ok(())
}

pub fn analytics(out: &mut impl Write, view: &AnalyticsView) -> io::Result<()> {
    writeln!(out, "Cumulative completions")?;
    let series: Vec<String> = view.cumulative.iter().map(ToString::to_string).collect();
    writeln!(out, "  {}", series.join(" "))?;

    writeln!(out, "Citations")?;
    if view.citations.is_empty() {
        writeln!(out, "  (none yet)")?;
    }
    for citation in &view.citations {
        writeln!(out, "  {:<20} {}", citation.key, citation.count)?;
    }

    writeln!(out, "Words by chapter")?;
    if view.words_by_chapter.is_empty() {
        writeln!(out, "  (none yet)")?;
    }
    for entry in &view.words_by_chapter {
        writeln!(out, "  {:<5} {}", entry.chapter.label(), entry.words)?;
    }

    writeln!(out, "Sections per chapter")?;
    for (chapter, count) in &view.sections_per_chapter {
        writeln!(out, "  {:<5} {count}", chapter.label())?;
    }
    Ok(())
}

/// Summary printed after a mutation.
pub fn snapshot(out: &mut impl Write, snapshot: &ProgressSnapshot) -> io::Result<()> {
    writeln!(
        out,
        "{}% complete ({}/{}), {} words",
        snapshot.overall.percentage,
        snapshot.overall.completed,
        snapshot.overall.total,
        snapshot.words_written
    )?;
    let chapters: Vec<String> = snapshot
        .chapters
        .iter()
        .map(|ch| format!("{} {}%", ch.chapter.label(), ch.percentage))
        .collect();
    writeln!(out, "{}", chapters.join(" | "))?;
    match snapshot.next_incomplete {
        Some(index) => writeln!(out, "next: #{index}"),
        None => writeln!(out, "next: nothing left"),
    }
}
