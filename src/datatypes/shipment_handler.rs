//! Handler trait for the shipment record store.

use super::{DataError, ShipmentRecord, ShipmentStatus};
use async_trait::async_trait;

/// Filter for listing shipment records.
///
/// `organization_id` scopes results to shipments whose owning employee
/// belongs to that organization. Unset `page`/`limit` means unpaged.
#[derive(Debug, Clone, Default)]
pub struct ShipmentFilter {
    pub organization_id: Option<i32>,
    pub status: Option<ShipmentStatus>,
    pub year: Option<i32>,
    pub employee_id: Option<i32>,
    /// 1-based page index
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Handler for persisted shipment records.
///
/// Implementations must enforce the uniqueness of
/// (employee_id, anniversary_year) in the store itself, so that
/// concurrent sweeps cannot double-create records.
#[async_trait]
pub trait ShipmentHandler {
    /// Atomic insert keyed on (employee_id, anniversary_year).
    ///
    /// Returns the new id, or `None` when a record for that key already
    /// exists (which is a no-op, not an error).
    async fn create_if_absent(&self, record: &ShipmentRecord) -> Result<Option<i32>, DataError>;

    async fn get_shipment_by_id(&self, id: i32) -> Result<ShipmentRecord, DataError>;

    async fn get_by_employee_and_year(
        &self,
        employee_id: i32,
        anniversary_year: i32,
    ) -> Result<Option<ShipmentRecord>, DataError>;

    /// Update an existing record in place; the record must carry an id.
    /// A status change that would regress the lifecycle is rejected.
    async fn update_shipment(&self, record: &ShipmentRecord) -> Result<(), DataError>;

    /// Matching records in stable id order plus the total match count
    /// before pagination
    async fn list_shipments(
        &self,
        filter: &ShipmentFilter,
    ) -> Result<(Vec<ShipmentRecord>, usize), DataError>;
}
