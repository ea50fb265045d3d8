pub mod language;
pub mod scrape;

pub use language::*;
pub use scrape::*;
