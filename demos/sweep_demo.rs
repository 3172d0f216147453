///! Demonstrate seeding a year and running the daily sweep against the
///! in-memory store. Run with RUST_LOG=debug to see the sweep's logging.
use std::sync::Arc;

use chrono::NaiveDate;

use brinde::business_days::BusinessDays;
use brinde::calendar::Calendar;
use brinde::config::{QueryLimits, SchedulerConfig};
use brinde::datatypes::Employee;
use brinde::memory_handler::InMemoryDB;
use brinde::scheduler::GiftScheduler;
use brinde::service::ShipmentService;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let db = Arc::new(InMemoryDB::new());
    db.insert_employee(Employee {
        id: 1,
        name: "Ana Souza".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 20).unwrap(),
        organization_id: 1,
    });
    db.insert_employee(Employee {
        id: 2,
        name: "Bruno Lima".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1988, 3, 10).unwrap(),
        organization_id: 1,
    });

    let service = ShipmentService::new(db.clone(), db.clone(), QueryLimits::default());
    let seeded = service.seed_year(2025).await.unwrap();
    println!(
        "Seeded {}: {} records created for {} employees",
        seeded.year, seeded.records_created, seeded.total_employees
    );

    let scheduler = GiftScheduler::new(
        db.clone(),
        db.clone(),
        BusinessDays::new(Arc::new(Calendar::brazil())),
        SchedulerConfig::default(),
    );
    // 7 business days before Ana's birthday on Mon 2025-01-20
    let today = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
    let summary = scheduler.run_sweep(today).await.unwrap();
    println!(
        "Sweep for {}: {} swept, {} created, {} advanced, {} skipped",
        today, summary.swept, summary.created, summary.advanced, summary.skipped
    );

    for record in service.list_ready_for_dispatch().await.unwrap() {
        println!(
            "Ready to ship: employee {} for {} (trigger date {:?})",
            record.employee_id, record.anniversary_year, record.trigger_date
        );
    }
}
