//! Employee entity as seen by the shipment scheduler.
//!
//! Employees are owned and mutated by the employee directory; this crate
//! only ever reads them. Only the month and day of the birth date matter
//! for anniversary purposes, the year of birth is ignored.

use super::DataError;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub birth_date: NaiveDate,
    pub organization_id: i32,
}

impl Employee {
    /// The date on which this employee's birthday falls in the given
    /// year, or `None` when it does not exist in that year (a 29th of
    /// February outside a leap year).
    pub fn anniversary_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.birth_date.month(), self.birth_date.day())
    }
}

/// Read-only access to the employee directory
#[async_trait]
pub trait EmployeeHandler {
    /// All employees across organizations; an empty directory yields an
    /// empty vector, not an error
    async fn get_all_employees(&self) -> Result<Vec<Employee>, DataError>;
    async fn get_employees_by_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<Employee>, DataError>;
    async fn get_employee_by_id(&self, id: i32) -> Result<Employee, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_day_anniversary_only_in_leap_years() {
        let employee = Employee {
            id: 1,
            name: "Bia".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            organization_id: 1,
        };
        assert_eq!(
            employee.anniversary_in(2024),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(employee.anniversary_in(2025), None);
    }
}
