pub mod client;
pub mod error;

pub use client::{SearchClient, SectionSource, DEFAULT_SEARCH_BASE};
pub use error::{Result, SearchError};
pub use obox_persist::Section;
