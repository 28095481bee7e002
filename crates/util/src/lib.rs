pub mod date_handling;
pub mod document_store;
pub mod filter_parsing;
pub mod path_processing;
pub mod text_processing;

pub use date_handling::{format_wiki_date, parse_wiki_date, wiki_date_hint};
pub use document_store::{
    DocumentStore, DocumentStoreError, InMemoryDocumentStore, JsonDocumentStore, STORE_PATH_ENV, default_store_path,
};
pub use filter_parsing::{FilterOperator, FilterParseError, FilterRun, Operand, RunPrefix, parse_filter};
pub use path_processing::expand_tilde;
pub use text_processing::{first_line, last_path_segment, splice_at_char, strip_line_breaks, truncate_hint};
