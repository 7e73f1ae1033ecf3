//! Generation history
//!
//! Every successful script generation is kept as a [`HistoryItem`] in a
//! single JSON file, newest first.

mod store;

pub use store::{HistoryError, HistoryItem, HistoryStore, HISTORY_FILE};
