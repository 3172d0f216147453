//! Entities, handler traits and the shared storage error type.

use thiserror::Error;

pub mod employee;
pub mod shipment;
pub mod shipment_handler;

pub use employee::{Employee, EmployeeHandler};
pub use shipment::{ShipmentRecord, ShipmentStatus};
pub use shipment_handler::{ShipmentFilter, ShipmentHandler};

/// Error type for all data handler operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("connection to database failed: {0}")]
    DataAccessFailure(String),
    #[error("could not find requested object in database: {0}")]
    NotFound(String),
    #[error("update of object in database failed: {0}")]
    UpdateFailed(String),
    #[error("inserting object to database failed: {0}")]
    InsertFailed(String),
    #[error("invalid record data: {0}")]
    InvalidRecord(String),
}

pub trait DataItem {
    /// get id or return error if id hasn't been set yet
    fn get_id(&self) -> Result<i32, DataError>;
    /// set id or return error if id has already been set
    fn set_id(&mut self, id: i32) -> Result<(), DataError>;
}
