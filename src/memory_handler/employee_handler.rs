use super::InMemoryDB;
use crate::datatypes::{DataError, Employee, EmployeeHandler};
use async_trait::async_trait;

#[async_trait]
impl EmployeeHandler for InMemoryDB {
    async fn get_all_employees(&self) -> Result<Vec<Employee>, DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        Ok(inner.employees.values().cloned().collect())
    }

    async fn get_employees_by_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<Employee>, DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        Ok(inner
            .employees
            .values()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn get_employee_by_id(&self, id: i32) -> Result<Employee, DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        inner
            .employees
            .get(&id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("employee {}", id)))
    }
}
