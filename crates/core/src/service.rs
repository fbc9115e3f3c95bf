use thiserror::Error;
use tracing::debug;

use crate::store::{EmployeeStore, InsertOutcome};
use crate::types::{Employee, EmployeeStatus};

/// Lifecycle operations over the employee roster.
///
/// The service keeps no state of its own; every call goes through the
/// injected [`EmployeeStore`].
#[derive(Debug, Clone)]
pub struct EmployeesService<S> {
    store: S,
}

impl<S: EmployeeStore> EmployeesService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns every employee in the roster.
    pub async fn list_all(&self) -> Result<Vec<Employee>, ServiceError<S::Error>> {
        let employees = self.store.list_all().await.map_err(ServiceError::Storage)?;
        debug!(stage = "service", count = employees.len(), "listed employees");
        Ok(employees)
    }

    /// Returns the employees matching a status keyword.
    ///
    /// Only `active` (in any case) selects active employees; every other
    /// keyword selects inactive ones.
    pub async fn list_by_status(&self, keyword: &str) -> Result<Vec<Employee>, ServiceError<S::Error>> {
        let status = EmployeeStatus::from_keyword_lenient(keyword);
        let employees = self
            .store
            .list_by_status(status.is_active())
            .await
            .map_err(ServiceError::Storage)?;
        debug!(stage = "service", %status, count = employees.len(), "listed employees by status");
        Ok(employees)
    }

    pub async fn get_by_id(&self, employee_id: &str) -> Result<Option<Employee>, ServiceError<S::Error>> {
        self.store
            .fetch(employee_id)
            .await
            .map_err(ServiceError::Storage)
    }

    /// Creates a new employee record.
    ///
    /// Fails with [`ServiceError::Duplicate`] when the id is already taken,
    /// either by the lookup done here or by the store's own key constraint.
    pub async fn add(&self, employee: Employee) -> Result<Employee, ServiceError<S::Error>> {
        if employee.employee_id.trim().is_empty() {
            return Err(ServiceError::MissingEmployeeId);
        }

        if self.get_by_id(&employee.employee_id).await?.is_some() {
            debug!(stage = "service", employee_id = %employee.employee_id, "rejecting duplicate employee");
            return Err(ServiceError::Duplicate(employee.employee_id));
        }

        match self.store.insert(&employee).await.map_err(ServiceError::Storage)? {
            InsertOutcome::Inserted(stored) => {
                debug!(stage = "service", employee_id = %stored.employee_id, "employee added");
                Ok(stored)
            }
            InsertOutcome::Duplicate => {
                debug!(stage = "service", employee_id = %employee.employee_id, "insert hit key constraint");
                Err(ServiceError::Duplicate(employee.employee_id))
            }
        }
    }

    /// Sets the status of an existing employee.
    ///
    /// Returns `Ok(None)` when the id is unknown. The keyword is collapsed the
    /// same way as in [`Self::list_by_status`]; callers validate it first.
    pub async fn update_status(
        &self,
        employee_id: &str,
        keyword: &str,
    ) -> Result<Option<Employee>, ServiceError<S::Error>> {
        if self.get_by_id(employee_id).await?.is_none() {
            return Ok(None);
        }

        let status = EmployeeStatus::from_keyword_lenient(keyword);
        let updated = self
            .store
            .set_status(employee_id, status.is_active())
            .await
            .map_err(ServiceError::Storage)?;
        debug!(stage = "service", employee_id, %status, found = updated.is_some(), "employee status updated");
        Ok(updated)
    }
}

/// Failures returned by [`EmployeesService`].
#[derive(Debug, Error)]
pub enum ServiceError<E> {
    #[error("employee '{0}' already exists")]
    Duplicate(String),
    #[error("employee id must not be empty")]
    MissingEmployeeId,
    #[error(transparent)]
    Storage(E),
}
