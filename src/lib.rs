//! Podcast Workshop
//!
//! Turns an e-book into podcast material: the EPUB text extractor feeds a
//! script generator, a cover generator produces artwork, and the cover
//! compositor lays the podcast label and book title over it.
//!
//! # Modules
//!
//! - `epub`: container, package document and spine walk
//! - `markup`: strict XML and lenient HTML behind one query interface
//! - `cover`: text overlay layout over a generated cover
//! - `generation`: script and cover generation backends
//! - `history`: remembered scripts
//! - `workflow`: the five-step wizard
//! - `routes`: HTTP surface

pub mod config;
pub mod cover;
pub mod epub;
pub mod error;
pub mod generation;
pub mod history;
pub mod markup;
pub mod routes;
pub mod state;
pub mod workflow;
