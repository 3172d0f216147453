//! The daily shipment sweep.
//!
//! Once a day, for every employee, the sweep computes this year's
//! birthday, walks back the configured number of business days to obtain
//! the trigger date, and advances the shipment record for
//! (employee, year) when the trigger date is today. The sweep is
//! idempotent: re-running it any number of times on the same day, or
//! resuming after a crash, never duplicates records and never regresses
//! an already-advanced status.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use thiserror::Error;

use crate::business_days::BusinessDays;
use crate::config::SchedulerConfig;
use crate::datatypes::{
    DataError, Employee, EmployeeHandler, ShipmentHandler, ShipmentRecord, ShipmentStatus,
};

/// Error related to the sweep
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("database error")]
    DBError(#[from] DataError),
    #[error("employee {0} has no valid anniversary in {1}")]
    InvalidAnniversary(i32, i32),
}

/// Outcome of the sweep for a single employee
enum SweepOutcome {
    /// Trigger date is not today
    NotDue,
    /// Record created as ready to ship
    Created,
    /// Pending record advanced to ready to ship
    Advanced,
    /// Record already at or past ready to ship
    AlreadyHandled,
}

/// Totals of one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Employees scanned
    pub swept: usize,
    /// Records created ready to ship
    pub created: usize,
    /// Pending records advanced to ready to ship
    pub advanced: usize,
    /// Employees skipped because of a per-employee failure
    pub skipped: usize,
}

/// Daily sweep over all employees, advancing shipment records on their
/// trigger date
pub struct GiftScheduler {
    employees: Arc<dyn EmployeeHandler + Sync + Send>,
    shipments: Arc<dyn ShipmentHandler + Sync + Send>,
    business_days: BusinessDays,
    config: SchedulerConfig,
}

impl GiftScheduler {
    pub fn new(
        employees: Arc<dyn EmployeeHandler + Sync + Send>,
        shipments: Arc<dyn ShipmentHandler + Sync + Send>,
        business_days: BusinessDays,
        config: SchedulerConfig,
    ) -> GiftScheduler {
        GiftScheduler {
            employees,
            shipments,
            business_days,
            config,
        }
    }

    /// Run the sweep with "today" taken from the configured timezone
    pub async fn run_sweep_now(&self) -> Result<SweepSummary, ScheduleError> {
        self.run_sweep(self.config.local_today()).await
    }

    /// Run the sweep for the given date.
    ///
    /// A per-employee failure is logged and skipped; the employee is
    /// retried automatically on the next run. A storage failure aborts
    /// the whole run, which is safe to retry thanks to idempotency.
    pub async fn run_sweep(&self, today: NaiveDate) -> Result<SweepSummary, ScheduleError> {
        let employees = self.employees.get_all_employees().await?;
        let mut summary = SweepSummary {
            swept: employees.len(),
            ..SweepSummary::default()
        };
        for employee in &employees {
            match self.sweep_employee(employee, today).await {
                Ok(SweepOutcome::Created) => summary.created += 1,
                Ok(SweepOutcome::Advanced) => summary.advanced += 1,
                Ok(SweepOutcome::NotDue) | Ok(SweepOutcome::AlreadyHandled) => {}
                Err(ScheduleError::DBError(err)) => return Err(ScheduleError::DBError(err)),
                Err(err) => {
                    warn!(
                        "sweep skipped employee {} ({}): {}",
                        employee.id, employee.name, err
                    );
                    summary.skipped += 1;
                }
            }
        }
        info!(
            "sweep for {} done: {} employees, {} created, {} advanced, {} skipped",
            today, summary.swept, summary.created, summary.advanced, summary.skipped
        );
        Ok(summary)
    }

    async fn sweep_employee(
        &self,
        employee: &Employee,
        today: NaiveDate,
    ) -> Result<SweepOutcome, ScheduleError> {
        let year = today.year();
        let anniversary = employee
            .anniversary_in(year)
            .ok_or(ScheduleError::InvalidAnniversary(employee.id, year))?;
        let trigger = self
            .business_days
            .business_days_before(anniversary, self.config.lead_business_days);
        if trigger != today {
            return Ok(SweepOutcome::NotDue);
        }
        match self
            .shipments
            .get_by_employee_and_year(employee.id, year)
            .await?
        {
            None => {
                let record = ShipmentRecord::ready(employee.id, year, today);
                match self.shipments.create_if_absent(&record).await? {
                    Some(id) => {
                        debug!(
                            "created shipment {} for employee {} (birthday {})",
                            id, employee.id, anniversary
                        );
                        Ok(SweepOutcome::Created)
                    }
                    // a concurrent sweep instance won the upsert race
                    None => Ok(SweepOutcome::AlreadyHandled),
                }
            }
            Some(mut record) if record.status == ShipmentStatus::Pendente => {
                record.status = ShipmentStatus::ProntoParaEnvio;
                record.trigger_date = Some(today);
                self.shipments.update_shipment(&record).await?;
                Ok(SweepOutcome::Advanced)
            }
            Some(_) => Ok(SweepOutcome::AlreadyHandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::memory_handler::InMemoryDB;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn employee(id: i32, birth: NaiveDate) -> Employee {
        Employee {
            id,
            name: format!("Employee {}", id),
            birth_date: birth,
            organization_id: 1,
        }
    }

    fn scheduler(db: Arc<InMemoryDB>) -> GiftScheduler {
        let business_days = BusinessDays::new(Arc::new(Calendar::brazil()));
        GiftScheduler::new(db.clone(), db, business_days, SchedulerConfig::default())
    }

    #[tokio::test]
    async fn pending_record_advances_on_trigger_date() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(1990, 1, 20)));
        let id = db
            .create_if_absent(&ShipmentRecord::pending(1, 2025))
            .await
            .unwrap()
            .unwrap();
        let scheduler = scheduler(db.clone());

        // 7 business days before Mon 2025-01-20
        let summary = scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        assert_eq!(summary.advanced, 1);
        assert_eq!(summary.created, 0);
        let record = db.get_shipment_by_id(id).await.unwrap();
        assert_eq!(record.status, ShipmentStatus::ProntoParaEnvio);
        assert_eq!(record.trigger_date, Some(date(2025, 1, 9)));
    }

    #[tokio::test]
    async fn sweep_is_idempotent_within_a_day() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(1990, 1, 20)));
        db.create_if_absent(&ShipmentRecord::pending(1, 2025))
            .await
            .unwrap();
        let scheduler = scheduler(db.clone());

        let first = scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        assert_eq!(first.advanced, 1);
        let state_after_first = db.get_by_employee_and_year(1, 2025).await.unwrap().unwrap();

        let second = scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        assert_eq!(second.advanced, 0);
        assert_eq!(second.created, 0);
        let state_after_second = db.get_by_employee_and_year(1, 2025).await.unwrap().unwrap();
        assert_eq!(state_after_first.status, state_after_second.status);
        assert_eq!(
            state_after_first.trigger_date,
            state_after_second.trigger_date
        );
    }

    #[tokio::test]
    async fn sweep_creates_record_lazily_when_none_seeded() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(1990, 3, 10)));
        let scheduler = scheduler(db.clone());

        // trigger date skips the Carnival days of 2025-03-03/04
        let summary = scheduler.run_sweep(date(2025, 2, 25)).await.unwrap();
        assert_eq!(summary.created, 1);
        let record = db.get_by_employee_and_year(1, 2025).await.unwrap().unwrap();
        assert_eq!(record.status, ShipmentStatus::ProntoParaEnvio);
        assert_eq!(record.trigger_date, Some(date(2025, 2, 25)));
    }

    #[tokio::test]
    async fn off_trigger_days_are_noops() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(1990, 1, 20)));
        let scheduler = scheduler(db.clone());

        let summary = scheduler.run_sweep(date(2025, 1, 8)).await.unwrap();
        assert_eq!(summary, SweepSummary { swept: 1, ..SweepSummary::default() });
        assert!(db.get_by_employee_and_year(1, 2025).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn already_advanced_record_is_left_untouched() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(1990, 1, 20)));
        let id = db
            .create_if_absent(&ShipmentRecord::ready(1, 2025, date(2025, 1, 9)))
            .await
            .unwrap()
            .unwrap();
        let mut record = db.get_shipment_by_id(id).await.unwrap();
        record.status = ShipmentStatus::Enviado;
        record.sent_date = Some(date(2025, 1, 10));
        db.update_shipment(&record).await.unwrap();
        let scheduler = scheduler(db.clone());

        scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        let after = db.get_shipment_by_id(id).await.unwrap();
        assert_eq!(after.status, ShipmentStatus::Enviado);
        assert_eq!(after.sent_date, Some(date(2025, 1, 10)));
    }

    #[tokio::test]
    async fn leap_day_birthday_is_skipped_not_fatal() {
        let db = Arc::new(InMemoryDB::new());
        db.insert_employee(employee(1, date(2000, 2, 29)));
        // second employee due today must still be processed
        db.insert_employee(employee(2, date(1985, 1, 20)));
        let scheduler = scheduler(db.clone());

        let summary = scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.created, 1);
        assert!(db.get_by_employee_and_year(2, 2025).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_directory_is_a_clean_run() {
        let db = Arc::new(InMemoryDB::new());
        let scheduler = scheduler(db);
        let summary = scheduler.run_sweep(date(2025, 1, 9)).await.unwrap();
        assert_eq!(summary, SweepSummary::default());
    }
}
