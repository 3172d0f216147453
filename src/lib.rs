//! # brinde
//!
//! Purpose of this library is to decide, for every employee of an
//! organization, when a birthday gift shipment must be prepared, and to
//! advance each shipment through its lifecycle. Building blocks include a
//! Brazilian bank holiday calendar (fixed dates plus the Easter-relative
//! movable holidays), business day arithmetic on top of it, a daily
//! idempotent sweep that turns pending shipment records into
//! ready-to-ship ones at the right moment, and a query/update surface
//! consumed by a presentation layer. Persistence is abstracted behind
//! handler traits with an in-memory backend for tests and a PostgreSQL
//! backend for production.

// module exports
pub mod business_days;
pub mod calendar;
pub mod config;
pub mod datatypes;
pub mod memory_handler;
pub mod postgres;
pub mod scheduler;
pub mod service;
