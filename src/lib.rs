pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod params;
pub mod parser;
pub mod resolver;
pub mod routes;

// Re-export commonly used types for easier access
pub use extractors::{SortTarget, Sorted, Unqualified};
pub use models::{Direction, Order, Sort};
pub use params::RequestParams;
pub use resolver::{SortBinding, SortDefault, SortResolver};
