//! Service order reports
//!
//! - Display formatting for report fields
//! - Photo loading and fitting
//! - Document model and rendering
//! - PDF output

pub mod document;
pub mod format;
pub mod pdf;
pub mod photo;
pub mod renderer;

pub use document::{Block, Document, Field, Photo};
pub use renderer::{ReportRenderer, NO_RECORDS, REPORT_TITLE};
