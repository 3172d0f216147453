use super::PostgresDB;
use crate::datatypes::{DataError, Employee, EmployeeHandler};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

fn row_to_employee(row: &PgRow) -> Result<Employee, DataError> {
    Ok(Employee {
        id: row
            .try_get("id")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        birth_date: row
            .try_get("birth_date")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        organization_id: row
            .try_get("organization_id")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
    })
}

#[async_trait]
impl EmployeeHandler for PostgresDB {
    async fn get_all_employees(&self) -> Result<Vec<Employee>, DataError> {
        let rows = sqlx::query("SELECT id, name, birth_date, organization_id FROM employees")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
        rows.iter().map(row_to_employee).collect()
    }

    async fn get_employees_by_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<Employee>, DataError> {
        let rows = sqlx::query(
            "SELECT id, name, birth_date, organization_id FROM employees
             WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
        rows.iter().map(row_to_employee).collect()
    }

    async fn get_employee_by_id(&self, id: i32) -> Result<Employee, DataError> {
        let row = sqlx::query(
            "SELECT id, name, birth_date, organization_id FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DataError::DataAccessFailure(e.to_string()))?
        .ok_or_else(|| DataError::NotFound(format!("employee {}", id)))?;
        row_to_employee(&row)
    }
}
