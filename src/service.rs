//! Query and update surface over the shipment store.
//!
//! This is the interface the presentation layer consumes: filtered and
//! paginated listings, aggregate reports, the manual status transitions,
//! and the bulk seeding of a new year. Every organization-scoped
//! operation treats a record owned by another organization as not found,
//! so existence is never leaked across organizations.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::config::QueryLimits;
use crate::datatypes::{
    DataError, EmployeeHandler, ShipmentFilter, ShipmentHandler, ShipmentRecord, ShipmentStatus,
};

/// Error related to the query/update surface
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Also returned when the record exists but belongs to another
    /// organization
    #[error("shipment not found")]
    NotFound,
    #[error("cannot change shipment status from {from} to {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },
    #[error("database error")]
    DBError(DataError),
}

impl From<DataError> for ServiceError {
    fn from(err: DataError) -> ServiceError {
        match err {
            DataError::NotFound(_) => ServiceError::NotFound,
            other => ServiceError::DBError(other),
        }
    }
}

/// Listing parameters as they arrive from the presentation layer
#[derive(Debug, Clone, Default)]
pub struct ShipmentQuery {
    pub status: Option<ShipmentStatus>,
    pub year: Option<i32>,
    pub employee_id: Option<i32>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// One page of shipment records
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Counts per status for one organization and year
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub year: i32,
    pub total: usize,
    pub counts_by_status: BTreeMap<ShipmentStatus, usize>,
}

/// Birthdays of one calendar month, cross-tabulated with how many of
/// those employees already have a shipment underway for the year
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub birthdays: usize,
    pub shipments_underway: usize,
}

/// Result of bulk-seeding one year
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeedSummary {
    pub year: i32,
    pub records_created: usize,
    pub total_employees: usize,
}

/// Read/filter shipments, manual status transitions, aggregates and
/// year seeding
pub struct ShipmentService {
    employees: Arc<dyn EmployeeHandler + Sync + Send>,
    shipments: Arc<dyn ShipmentHandler + Sync + Send>,
    limits: QueryLimits,
}

impl ShipmentService {
    pub fn new(
        employees: Arc<dyn EmployeeHandler + Sync + Send>,
        shipments: Arc<dyn ShipmentHandler + Sync + Send>,
        limits: QueryLimits,
    ) -> ShipmentService {
        ShipmentService {
            employees,
            shipments,
            limits,
        }
    }

    /// Shipments of one organization, filtered and paginated
    pub async fn list_shipments(
        &self,
        organization_id: i32,
        query: ShipmentQuery,
    ) -> Result<Page<ShipmentRecord>, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size);
        let filter = ShipmentFilter {
            organization_id: Some(organization_id),
            status: query.status,
            year: query.year,
            employee_id: query.employee_id,
            page: Some(page),
            limit: Some(limit),
        };
        let (items, total) = self.shipments.list_shipments(&filter).await?;
        Ok(Page {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    /// All records ready to ship, across organizations, for the
    /// logistics view
    pub async fn list_ready_for_dispatch(&self) -> Result<Vec<ShipmentRecord>, ServiceError> {
        let filter = ShipmentFilter {
            status: Some(ShipmentStatus::ProntoParaEnvio),
            ..ShipmentFilter::default()
        };
        let (items, _) = self.shipments.list_shipments(&filter).await?;
        Ok(items)
    }

    /// Force a shipment to `Enviado` and stamp its sent date
    pub async fn mark_shipped(
        &self,
        shipment_id: i32,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<ShipmentRecord, ServiceError> {
        let mut record = self.shipments.get_shipment_by_id(shipment_id).await?;
        if !record.status.can_transition_to(ShipmentStatus::Enviado) {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                to: ShipmentStatus::Enviado,
            });
        }
        record.status = ShipmentStatus::Enviado;
        record.sent_date = Some(today);
        if notes.is_some() {
            record.notes = notes;
        }
        self.shipments.update_shipment(&record).await?;
        Ok(record)
    }

    /// Manual status change, scoped to the caller's organization.
    ///
    /// Auto-fills the trigger date when moving to ready-to-ship without
    /// one, and the sent date when moving to sent/delivered without one.
    pub async fn set_status(
        &self,
        shipment_id: i32,
        organization_id: i32,
        new_status: ShipmentStatus,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<ShipmentRecord, ServiceError> {
        let mut record = self.shipments.get_shipment_by_id(shipment_id).await?;
        let owner = self.employees.get_employee_by_id(record.employee_id).await?;
        if owner.organization_id != organization_id {
            return Err(ServiceError::NotFound);
        }
        if !record.status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidTransition {
                from: record.status,
                to: new_status,
            });
        }
        record.status = new_status;
        if new_status == ShipmentStatus::ProntoParaEnvio && record.trigger_date.is_none() {
            record.trigger_date = Some(today);
        }
        if matches!(
            new_status,
            ShipmentStatus::Enviado | ShipmentStatus::Entregue
        ) && record.sent_date.is_none()
        {
            record.sent_date = Some(today);
        }
        if notes.is_some() {
            record.notes = notes;
        }
        self.shipments.update_shipment(&record).await?;
        Ok(record)
    }

    /// Counts grouped by status for one organization and year; the year
    /// defaults to the current one
    pub async fn statistics(
        &self,
        organization_id: i32,
        year: Option<i32>,
    ) -> Result<Statistics, ServiceError> {
        let year = year.unwrap_or_else(|| Utc::now().date_naive().year());
        let filter = ShipmentFilter {
            organization_id: Some(organization_id),
            year: Some(year),
            ..ShipmentFilter::default()
        };
        let (records, total) = self.shipments.list_shipments(&filter).await?;
        let mut counts_by_status = BTreeMap::new();
        for record in &records {
            *counts_by_status.entry(record.status).or_insert(0) += 1;
        }
        Ok(Statistics {
            year,
            total,
            counts_by_status,
        })
    }

    /// Birthdays per calendar month for one organization, with the count
    /// of employees whose shipment for `year` is already underway (any
    /// status other than pending)
    pub async fn monthly_distribution(
        &self,
        organization_id: i32,
        year: i32,
    ) -> Result<Vec<MonthBucket>, ServiceError> {
        let employees = self
            .employees
            .get_employees_by_organization(organization_id)
            .await?;
        let filter = ShipmentFilter {
            organization_id: Some(organization_id),
            year: Some(year),
            ..ShipmentFilter::default()
        };
        let (records, _) = self.shipments.list_shipments(&filter).await?;
        let underway: std::collections::BTreeSet<i32> = records
            .iter()
            .filter(|r| r.status != ShipmentStatus::Pendente)
            .map(|r| r.employee_id)
            .collect();
        let mut buckets: Vec<MonthBucket> = (1..=12)
            .map(|month| MonthBucket {
                month,
                birthdays: 0,
                shipments_underway: 0,
            })
            .collect();
        for employee in &employees {
            let bucket = &mut buckets[employee.birth_date.month() as usize - 1];
            bucket.birthdays += 1;
            if underway.contains(&employee.id) {
                bucket.shipments_underway += 1;
            }
        }
        Ok(buckets)
    }

    /// Create a pending record for every employee lacking one for
    /// `year`; existing records are left untouched
    pub async fn seed_year(&self, year: i32) -> Result<SeedSummary, ServiceError> {
        let employees = self.employees.get_all_employees().await?;
        let mut records_created = 0;
        for employee in &employees {
            let record = ShipmentRecord::pending(employee.id, year);
            if self.shipments.create_if_absent(&record).await?.is_some() {
                records_created += 1;
            }
        }
        info!(
            "seeded year {}: {} records created for {} employees",
            year,
            records_created,
            employees.len()
        );
        Ok(SeedSummary {
            year,
            records_created,
            total_employees: employees.len(),
        })
    }
}
