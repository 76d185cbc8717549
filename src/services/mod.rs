pub mod extractor;
pub mod pagination;
pub mod search;
pub mod sink;

pub use extractor::{extract_page, PanelExpander};
pub use pagination::Paginator;
pub use search::{SearchOutcome, SearchService};
pub use sink::JsonSink;
