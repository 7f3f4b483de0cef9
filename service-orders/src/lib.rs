//! Service orders library
//!
//! Customers, service types and service orders for a repair shop, with
//! filtered PDF reports of the orders.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod report;
pub mod services;
pub mod session;
pub mod storage;

pub use app::AppState;
pub use error::{AppError, Result};
