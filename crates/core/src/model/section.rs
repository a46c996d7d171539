use crate::model::catalog::CatalogError;
use crate::model::ids::{Chapter, SectionIndex};

/// Citation sentinel meaning "this section cites nothing".
pub const NO_CITATION: &str = "-";

/// One planned row of the thesis schedule.
///
/// Sections are immutable once the catalog is built; the catalog assigns
/// `index` from the row position and never reassigns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    index: SectionIndex,
    date: String,
    chapter: Chapter,
    chapter_name: String,
    title: String,
    concepts: String,
    purpose: String,
    paper: String,
    words: u32,
    critical: bool,
}

/// Unvalidated section input, positioned by the catalog builder.
#[derive(Debug, Clone, Default)]
pub struct SectionDraft {
    pub date: String,
    pub chapter: u8,
    pub chapter_name: String,
    pub title: String,
    pub concepts: String,
    pub purpose: String,
    pub paper: String,
    pub words: u32,
    pub critical: bool,
}

impl SectionDraft {
    /// Validate the draft and pin it to its catalog position.
    ///
    /// Empty `paper` is normalized to the [`NO_CITATION`] sentinel.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidChapter` for chapters outside `1..=7`,
    /// `CatalogError::EmptyDate` or `CatalogError::EmptyTitle` for blank labels.
    pub fn validate(self, index: SectionIndex) -> Result<Section, CatalogError> {
        let chapter = Chapter::new(self.chapter)?;
        let date = self.date.trim().to_owned();
        if date.is_empty() {
            return Err(CatalogError::EmptyDate { index });
        }
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyTitle { index });
        }
        let paper = match self.paper.trim() {
            "" => NO_CITATION.to_owned(),
            other => other.to_owned(),
        };

        Ok(Section {
            index,
            date,
            chapter,
            chapter_name: self.chapter_name,
            title,
            concepts: self.concepts,
            purpose: self.purpose,
            paper,
            words: self.words,
            critical: self.critical,
        })
    }
}

impl Section {
    #[must_use]
    pub fn index(&self) -> SectionIndex {
        self.index
    }

    /// Display label of the planned day ("Mar 14"). Not unique across sections.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn chapter(&self) -> Chapter {
        self.chapter
    }

    #[must_use]
    pub fn chapter_name(&self) -> &str {
        &self.chapter_name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn concepts(&self) -> &str {
        &self.concepts
    }

    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    #[must_use]
    pub fn paper(&self) -> &str {
        &self.paper
    }

    /// Returns `None` for the "-" sentinel.
    #[must_use]
    pub fn citation(&self) -> Option<&str> {
        (self.paper != NO_CITATION).then_some(self.paper.as_str())
    }

    #[must_use]
    pub fn words(&self) -> u32 {
        self.words
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SectionDraft {
        SectionDraft {
            date: "Mar 14".into(),
            chapter: 4,
            chapter_name: "Methodology".into(),
            title: "4.5 Data Collection Details".into(),
            paper: "-".into(),
            words: 300,
            ..SectionDraft::default()
        }
    }

    #[test]
    fn validate_pins_index() {
        let section = draft().validate(SectionIndex::new(23)).unwrap();
        assert_eq!(section.index(), SectionIndex::new(23));
        assert_eq!(section.chapter().number(), 4);
        assert_eq!(section.citation(), None);
    }

    #[test]
    fn blank_paper_becomes_sentinel() {
        let mut d = draft();
        d.paper = "  ".into();
        let section = d.validate(SectionIndex::new(0)).unwrap();
        assert_eq!(section.paper(), NO_CITATION);
    }

    #[test]
    fn rejects_out_of_range_chapter() {
        let mut d = draft();
        d.chapter = 8;
        assert_eq!(
            d.validate(SectionIndex::new(0)),
            Err(CatalogError::InvalidChapter(8))
        );
    }

    #[test]
    fn rejects_blank_title() {
        let mut d = draft();
        d.title = " ".into();
        assert_eq!(
            d.validate(SectionIndex::new(5)),
            Err(CatalogError::EmptyTitle {
                index: SectionIndex::new(5)
            })
        );
    }
}
