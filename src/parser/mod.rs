pub mod sort_parser;

pub use sort_parser::{SortParser, DEFAULT_PROPERTY_DELIMITER};
