//! Marker bundles: a flat text blob split into named virtual files.
//! One scanner implementation is shared by every endpoint; the path guard runs on
//! every marker filename before it can reach a ZIP entry or a filesystem join.

pub mod handlers;
pub mod models;
pub mod path_guard;
pub mod scanner;
pub mod validation;

pub use models::{ExtractionResult, Marker};
