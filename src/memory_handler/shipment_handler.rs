use super::InMemoryDB;
use crate::datatypes::{
    DataError, DataItem, ShipmentFilter, ShipmentHandler, ShipmentRecord,
};
use async_trait::async_trait;

#[async_trait]
impl ShipmentHandler for InMemoryDB {
    async fn create_if_absent(&self, record: &ShipmentRecord) -> Result<Option<i32>, DataError> {
        let mut inner = self.inner.lock().expect("in-memory store lock poisoned");
        let exists = inner.shipments.values().any(|s| {
            s.employee_id == record.employee_id && s.anniversary_year == record.anniversary_year
        });
        if exists {
            return Ok(None);
        }
        let id = inner.next_shipment_id;
        inner.next_shipment_id += 1;
        let mut stored = record.clone();
        stored.set_id(id)?;
        inner.shipments.insert(id, stored);
        Ok(Some(id))
    }

    async fn get_shipment_by_id(&self, id: i32) -> Result<ShipmentRecord, DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        inner
            .shipments
            .get(&id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("shipment {}", id)))
    }

    async fn get_by_employee_and_year(
        &self,
        employee_id: i32,
        anniversary_year: i32,
    ) -> Result<Option<ShipmentRecord>, DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        Ok(inner
            .shipments
            .values()
            .find(|s| s.employee_id == employee_id && s.anniversary_year == anniversary_year)
            .cloned())
    }

    async fn update_shipment(&self, record: &ShipmentRecord) -> Result<(), DataError> {
        let id = record.get_id()?;
        let mut inner = self.inner.lock().expect("in-memory store lock poisoned");
        let existing = inner
            .shipments
            .get(&id)
            .ok_or_else(|| DataError::NotFound(format!("shipment {}", id)))?;
        if !existing.status.can_transition_to(record.status) {
            return Err(DataError::UpdateFailed(format!(
                "shipment {} cannot move from {} to {}",
                id, existing.status, record.status
            )));
        }
        inner.shipments.insert(id, record.clone());
        Ok(())
    }

    async fn list_shipments(
        &self,
        filter: &ShipmentFilter,
    ) -> Result<(Vec<ShipmentRecord>, usize), DataError> {
        let inner = self.inner.lock().expect("in-memory store lock poisoned");
        let matches: Vec<ShipmentRecord> = inner
            .shipments
            .values()
            .filter(|s| {
                filter
                    .organization_id
                    .map_or(true, |org| inner.organization_of(s.employee_id) == Some(org))
                    && filter.status.map_or(true, |status| s.status == status)
                    && filter.year.map_or(true, |year| s.anniversary_year == year)
                    && filter
                        .employee_id
                        .map_or(true, |employee| s.employee_id == employee)
            })
            .cloned()
            .collect();
        let total = matches.len();
        let items = match (filter.page, filter.limit) {
            (Some(page), Some(limit)) => matches
                .into_iter()
                .skip(page.saturating_sub(1) * limit)
                .take(limit)
                .collect(),
            _ => matches,
        };
        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::ShipmentStatus;

    #[tokio::test]
    async fn duplicate_key_collapses_to_noop() {
        let db = InMemoryDB::new();
        let record = ShipmentRecord::pending(1, 2025);
        let first = db.create_if_absent(&record).await.unwrap();
        assert!(first.is_some());
        let second = db.create_if_absent(&record).await.unwrap();
        assert_eq!(second, None);
        let (_, total) = db.list_shipments(&ShipmentFilter::default()).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn stale_write_cannot_undo_concurrent_advance() {
        let db = InMemoryDB::new();
        let id = db
            .create_if_absent(&ShipmentRecord::ready(
                1,
                2025,
                chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
            ))
            .await
            .unwrap()
            .unwrap();
        // one writer reads the record, a second one advances it meanwhile
        let stale = db.get_shipment_by_id(id).await.unwrap();
        let mut advanced = stale.clone();
        advanced.status = ShipmentStatus::Enviado;
        advanced.sent_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 10);
        db.update_shipment(&advanced).await.unwrap();

        // writing the stale copy back would regress the status
        let mut stale_write = stale;
        stale_write.notes = Some("late note".to_string());
        assert!(db.update_shipment(&stale_write).await.is_err());
        let current = db.get_shipment_by_id(id).await.unwrap();
        assert_eq!(current.status, ShipmentStatus::Enviado);
    }

    #[tokio::test]
    async fn update_rejects_status_regression() {
        let db = InMemoryDB::new();
        let id = db
            .create_if_absent(&ShipmentRecord::ready(
                1,
                2025,
                chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
            ))
            .await
            .unwrap()
            .unwrap();
        let mut record = db.get_shipment_by_id(id).await.unwrap();
        record.status = ShipmentStatus::Pendente;
        assert!(db.update_shipment(&record).await.is_err());
    }
}
