mod catalog;
mod completion;
mod ids;
mod section;
mod thesis;

pub use catalog::{Catalog, CatalogError, ScheduleWindow};
pub use completion::{CompletionRecord, CompletionStore};
pub use ids::{Chapter, ParseIdError, SectionIndex};
pub use section::{NO_CITATION, Section, SectionDraft};
