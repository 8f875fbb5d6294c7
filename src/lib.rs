//! Theme and font-size preference synchronization for static HTML tool
//! pages, plus the consistency and accessibility checks that guard those
//! pages at build time.
//!
//! # Quick start
//!
//! ```no_run
//! use themesync::catalog::FileCatalogSource;
//! use themesync::page::Page;
//! use themesync::prefs::MemoryStore;
//! use themesync::sync::{start, FixedSignal};
//!
//! # async fn example() {
//! let page = Page::parse("<html><body><main></main></body></html>");
//! let source = FileCatalogSource::new("config/themes.json");
//! let (mut sync, state) =
//!     start(&source, page, MemoryStore::new(), Box::new(FixedSignal(None))).await;
//! println!("theme: {}", state.theme);
//! sync.cycle_theme();
//! # }
//! ```

pub mod a11y;
pub mod catalog;
pub mod check;
pub mod config;
pub mod error;
pub mod page;
pub mod prefs;
pub mod sync;
#[cfg(test)]
pub mod testsupport;
