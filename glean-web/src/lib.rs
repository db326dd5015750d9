//! Page acquisition and readable-text extraction.
//!
//! - [`page`]: the [`page::Page`] model and [`page::PageSource`] loaders
//!   (HTTP and local file)
//! - [`extract`]: the article/main/paragraph heuristic and the selection
//!   variant

pub mod extract;
pub mod page;

pub use extract::ContentExtractor;
pub use page::{FilePageSource, HttpPageSource, Page, PageSource};
