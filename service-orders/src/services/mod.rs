//! Services module
//!
//! Business logic services that coordinate between forms, the repository
//! and the file stores.

pub mod customers;
pub mod orders;
pub mod reports;
pub mod service_types;

pub use customers::CustomersService;
pub use orders::OrdersService;
pub use reports::ReportsService;
pub use service_types::ServiceTypesService;
