//! Storage module
//!
//! Provides the shared uploads directory for service order photos.

pub mod uploads;

pub use uploads::UploadsStore;
