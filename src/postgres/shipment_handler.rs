use super::PostgresDB;
use crate::datatypes::{
    DataError, DataItem, ShipmentFilter, ShipmentHandler, ShipmentRecord, ShipmentStatus,
};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

const SHIPMENT_COLUMNS: &str =
    "s.id, s.employee_id, s.anniversary_year, s.status, s.trigger_date, s.sent_date, s.notes";

fn row_to_shipment(row: &PgRow) -> Result<ShipmentRecord, DataError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
    Ok(ShipmentRecord {
        id: Some(
            row.try_get("id")
                .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        ),
        employee_id: row
            .try_get("employee_id")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        anniversary_year: row
            .try_get("anniversary_year")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        status: status.parse::<ShipmentStatus>()?,
        trigger_date: row
            .try_get("trigger_date")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        sent_date: row
            .try_get("sent_date")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
        notes: row
            .try_get("notes")
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?,
    })
}

/// WHERE clause with numbered placeholders matching [`bind_filter`]
fn filter_conditions(filter: &ShipmentFilter) -> String {
    let mut conditions = Vec::new();
    if filter.organization_id.is_some() {
        conditions.push(format!("e.organization_id = ${}", conditions.len() + 1));
    }
    if filter.status.is_some() {
        conditions.push(format!("s.status = ${}", conditions.len() + 1));
    }
    if filter.year.is_some() {
        conditions.push(format!("s.anniversary_year = ${}", conditions.len() + 1));
    }
    if filter.employee_id.is_some() {
        conditions.push(format!("s.employee_id = ${}", conditions.len() + 1));
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn bind_filter<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    filter: &ShipmentFilter,
) -> Query<'q, Postgres, PgArguments> {
    if let Some(organization_id) = filter.organization_id {
        query = query.bind(organization_id);
    }
    if let Some(status) = filter.status {
        query = query.bind(status.to_string());
    }
    if let Some(year) = filter.year {
        query = query.bind(year);
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.bind(employee_id);
    }
    query
}

#[async_trait]
impl ShipmentHandler for PostgresDB {
    async fn create_if_absent(&self, record: &ShipmentRecord) -> Result<Option<i32>, DataError> {
        let row = sqlx::query(
            "INSERT INTO shipments
                (employee_id, anniversary_year, status, trigger_date, sent_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (employee_id, anniversary_year) DO NOTHING
             RETURNING id",
        )
        .bind(record.employee_id)
        .bind(record.anniversary_year)
        .bind(record.status.to_string())
        .bind(record.trigger_date)
        .bind(record.sent_date)
        .bind(record.notes.clone())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DataError::InsertFailed(e.to_string()))?;
        match row {
            Some(row) => {
                let id: i32 = row
                    .try_get("id")
                    .map_err(|e| DataError::InsertFailed(e.to_string()))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn get_shipment_by_id(&self, id: i32) -> Result<ShipmentRecord, DataError> {
        let sql = format!("SELECT {} FROM shipments s WHERE s.id = $1", SHIPMENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?
            .ok_or_else(|| DataError::NotFound(format!("shipment {}", id)))?;
        row_to_shipment(&row)
    }

    async fn get_by_employee_and_year(
        &self,
        employee_id: i32,
        anniversary_year: i32,
    ) -> Result<Option<ShipmentRecord>, DataError> {
        let sql = format!(
            "SELECT {} FROM shipments s WHERE s.employee_id = $1 AND s.anniversary_year = $2",
            SHIPMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(employee_id)
            .bind(anniversary_year)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
        match row {
            Some(row) => Ok(Some(row_to_shipment(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_shipment(&self, record: &ShipmentRecord) -> Result<(), DataError> {
        let id = record.get_id()?;
        // tolerate out-of-order retries: a regressing status change is
        // detected against the stored record and rejected
        let existing = self.get_shipment_by_id(id).await?;
        if !existing.status.can_transition_to(record.status) {
            return Err(DataError::UpdateFailed(format!(
                "shipment {} cannot move from {} to {}",
                id, existing.status, record.status
            )));
        }
        // the status guard makes the write optimistic: if a concurrent
        // writer advanced the record between the read above and this
        // statement, zero rows match and the stale write cannot regress it
        let result = sqlx::query(
            "UPDATE shipments
             SET status = $2, trigger_date = $3, sent_date = $4, notes = $5
             WHERE id = $1 AND status = $6",
        )
        .bind(id)
        .bind(record.status.to_string())
        .bind(record.trigger_date)
        .bind(record.sent_date)
        .bind(record.notes.clone())
        .bind(existing.status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::UpdateFailed(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(DataError::UpdateFailed(format!(
                "shipment {} was modified concurrently",
                id
            )));
        }
        Ok(())
    }

    async fn list_shipments(
        &self,
        filter: &ShipmentFilter,
    ) -> Result<(Vec<ShipmentRecord>, usize), DataError> {
        let conditions = filter_conditions(filter);
        let count_sql = format!(
            "SELECT COUNT(*) FROM shipments s JOIN employees e ON e.id = s.employee_id{}",
            conditions
        );
        let count_row = bind_filter(sqlx::query(&count_sql), filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
        let total: i64 = count_row
            .try_get(0)
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;

        let mut select_sql = format!(
            "SELECT {} FROM shipments s JOIN employees e ON e.id = s.employee_id{} ORDER BY s.id",
            SHIPMENT_COLUMNS, conditions
        );
        if let (Some(page), Some(limit)) = (filter.page, filter.limit) {
            let offset = page.saturating_sub(1) * limit;
            select_sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }
        let rows = bind_filter(sqlx::query(&select_sql), filter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataError::DataAccessFailure(e.to_string()))?;
        let items = rows
            .iter()
            .map(row_to_shipment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as usize))
    }
}
