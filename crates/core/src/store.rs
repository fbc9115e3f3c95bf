use std::future::Future;

use crate::types::Employee;

/// Persistence contract for employee records keyed by `employee_id`.
///
/// Every mutating call is committed by the time its future resolves.
/// Implementations are expected to enforce key uniqueness themselves and
/// report a conflicting insert as [`InsertOutcome::Duplicate`].
pub trait EmployeeStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts a new record.
    fn insert(
        &self,
        employee: &Employee,
    ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send;

    /// Looks up a record by exact key match.
    fn fetch(
        &self,
        employee_id: &str,
    ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send;

    fn list_by_status(
        &self,
        status: bool,
    ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send;

    /// Overwrites the status of an existing record, returning it, or `None`
    /// when no record has the key.
    fn set_status(
        &self,
        employee_id: &str,
        status: bool,
    ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send;
}

/// Result of attempting to insert a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Employee),
    Duplicate,
}
