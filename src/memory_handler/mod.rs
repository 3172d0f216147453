//! Implementation of an in-memory data handler.
//!
//! Backs the unit tests of the scheduler and the query surface, and
//! doubles as a reference implementation of the handler contracts,
//! including the uniqueness of (employee_id, anniversary_year).

use crate::datatypes::{Employee, ShipmentRecord};
use std::collections::BTreeMap;
use std::sync::Mutex;

mod employee_handler;
mod shipment_handler;

struct Inner {
    employees: BTreeMap<i32, Employee>,
    shipments: BTreeMap<i32, ShipmentRecord>,
    next_shipment_id: i32,
}

/// Struct to store employees and shipment records in memory
pub struct InMemoryDB {
    inner: Mutex<Inner>,
}

impl InMemoryDB {
    pub fn new() -> InMemoryDB {
        InMemoryDB {
            inner: Mutex::new(Inner {
                employees: BTreeMap::new(),
                shipments: BTreeMap::new(),
                next_shipment_id: 1,
            }),
        }
    }

    /// Seed the employee directory; keyed by employee id
    pub fn insert_employee(&self, employee: Employee) {
        let mut inner = self.inner.lock().expect("in-memory store lock poisoned");
        inner.employees.insert(employee.id, employee);
    }
}

impl Default for InMemoryDB {
    fn default() -> Self {
        InMemoryDB::new()
    }
}

impl Inner {
    fn organization_of(&self, employee_id: i32) -> Option<i32> {
        self.employees.get(&employee_id).map(|e| e.organization_id)
    }
}
