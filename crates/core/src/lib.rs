//! Domain layer for the employee roster: record types, the persistence
//! contract and the lifecycle service built on top of it.

pub mod service;
pub mod store;
pub mod types;

pub use service::{EmployeesService, ServiceError};
pub use store::{EmployeeStore, InsertOutcome};
pub use types::{Employee, EmployeeStatus, InvalidStatusKeyword, ACTIVE, INACTIVE};
