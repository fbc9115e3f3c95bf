use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyword used on the wire for an active employee.
pub const ACTIVE: &str = "active";
/// Keyword used on the wire for an inactive employee.
pub const INACTIVE: &str = "inactive";

/// Employee record as stored in the roster and exchanged over the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// `true` when the employee is active. Missing on input means inactive.
    #[serde(default)]
    pub status: bool,
}

impl Employee {
    /// Creates an employee with no names set.
    pub fn new(employee_id: impl Into<String>, status: bool) -> Self {
        Self {
            employee_id: employee_id.into(),
            first_name: None,
            last_name: None,
            status,
        }
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Returns the status as a typed value.
    pub fn employee_status(&self) -> EmployeeStatus {
        EmployeeStatus::from(self.status)
    }
}

/// Two-state employee status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    /// Collapses a keyword into a status: anything other than `active`
    /// (compared case-insensitively) means inactive.
    pub fn from_keyword_lenient(keyword: &str) -> Self {
        if keyword.to_lowercase() == ACTIVE {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the lowercase keyword for the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => ACTIVE,
            Self::Inactive => INACTIVE,
        }
    }
}

impl From<bool> for EmployeeStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl From<EmployeeStatus> for bool {
    fn from(value: EmployeeStatus) -> Self {
        value.is_active()
    }
}

impl FromStr for EmployeeStatus {
    type Err = InvalidStatusKeyword;

    /// Strict parse accepting only `active` or `inactive`, in any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            ACTIVE => Ok(Self::Active),
            INACTIVE => Ok(Self::Inactive),
            _ => Err(InvalidStatusKeyword(value.to_string())),
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status keyword outside of `active` / `inactive`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status must be 'active' or 'inactive' (got '{0}')")]
pub struct InvalidStatusKeyword(pub String);
