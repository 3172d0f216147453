//! Shipment record and its status lifecycle.

use super::{DataError, DataItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a gift shipment.
///
/// Declaration order is lifecycle order: `Pendente` through `Entregue`
/// advance monotonically; `Cancelado` is a terminal abort reachable from
/// any non-terminal status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ShipmentStatus {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "PRONTO_PARA_ENVIO")]
    ProntoParaEnvio,
    #[serde(rename = "ENVIADO")]
    Enviado,
    #[serde(rename = "ENTREGUE")]
    Entregue,
    #[serde(rename = "CANCELADO")]
    Cancelado,
}

impl ShipmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Entregue | ShipmentStatus::Cancelado)
    }

    /// Whether a transition to `next` is allowed.
    ///
    /// Same-status transitions are allowed as no-ops (this is what makes
    /// retries and repeated sweeps harmless); otherwise only forward
    /// moves in lifecycle order are accepted, plus cancellation from any
    /// non-terminal status.
    pub fn can_transition_to(self, next: ShipmentStatus) -> bool {
        if self == next {
            return true;
        }
        match (self, next) {
            (from, ShipmentStatus::Cancelado) => !from.is_terminal(),
            (ShipmentStatus::Entregue, _) | (ShipmentStatus::Cancelado, _) => false,
            (from, to) => from < to,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShipmentStatus::Pendente => "PENDENTE",
            ShipmentStatus::ProntoParaEnvio => "PRONTO_PARA_ENVIO",
            ShipmentStatus::Enviado => "ENVIADO",
            ShipmentStatus::Entregue => "ENTREGUE",
            ShipmentStatus::Cancelado => "CANCELADO",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ShipmentStatus {
    type Err = DataError;

    fn from_str(s: &str) -> Result<ShipmentStatus, DataError> {
        match s {
            "PENDENTE" => Ok(ShipmentStatus::Pendente),
            "PRONTO_PARA_ENVIO" => Ok(ShipmentStatus::ProntoParaEnvio),
            "ENVIADO" => Ok(ShipmentStatus::Enviado),
            "ENTREGUE" => Ok(ShipmentStatus::Entregue),
            "CANCELADO" => Ok(ShipmentStatus::Cancelado),
            other => Err(DataError::InvalidRecord(format!(
                "unknown shipment status '{}'",
                other
            ))),
        }
    }
}

/// One gift shipment per employee per anniversary year.
///
/// The pair (employee_id, anniversary_year) is the idempotency key of the
/// whole subsystem; the storage layer enforces its uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Before a record is stored to a database, the id may be None
    pub id: Option<i32>,
    pub employee_id: i32,
    pub anniversary_year: i32,
    pub status: ShipmentStatus,
    /// Date the record became ready to ship; None until computed
    pub trigger_date: Option<NaiveDate>,
    /// Set when the shipment is marked as sent
    pub sent_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ShipmentRecord {
    /// Fresh record as created by the bulk seeding operation
    pub fn pending(employee_id: i32, anniversary_year: i32) -> ShipmentRecord {
        ShipmentRecord {
            id: None,
            employee_id,
            anniversary_year,
            status: ShipmentStatus::Pendente,
            trigger_date: None,
            sent_date: None,
            notes: None,
        }
    }

    /// Record as created lazily by the sweep on its trigger date
    pub fn ready(employee_id: i32, anniversary_year: i32, trigger_date: NaiveDate) -> ShipmentRecord {
        ShipmentRecord {
            id: None,
            employee_id,
            anniversary_year,
            status: ShipmentStatus::ProntoParaEnvio,
            trigger_date: Some(trigger_date),
            sent_date: None,
            notes: None,
        }
    }
}

impl DataItem for ShipmentRecord {
    fn get_id(&self) -> Result<i32, DataError> {
        match self.id {
            Some(id) => Ok(id),
            None => Err(DataError::DataAccessFailure(
                "tried to get id of unstored shipment record".to_string(),
            )),
        }
    }

    fn set_id(&mut self, id: i32) -> Result<(), DataError> {
        match self.id {
            Some(_) => Err(DataError::DataAccessFailure(
                "tried to change valid shipment record id".to_string(),
            )),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ShipmentStatus::*;
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Pendente.can_transition_to(ProntoParaEnvio));
        assert!(ProntoParaEnvio.can_transition_to(Enviado));
        assert!(Enviado.can_transition_to(Entregue));
        // jumping ahead is a legal manual action
        assert!(Pendente.can_transition_to(Entregue));
    }

    #[test]
    fn regressions_are_rejected() {
        assert!(!ProntoParaEnvio.can_transition_to(Pendente));
        assert!(!Enviado.can_transition_to(ProntoParaEnvio));
        assert!(!Entregue.can_transition_to(Enviado));
    }

    #[test]
    fn cancellation_only_from_non_terminal() {
        assert!(Pendente.can_transition_to(Cancelado));
        assert!(ProntoParaEnvio.can_transition_to(Cancelado));
        assert!(Enviado.can_transition_to(Cancelado));
        assert!(!Entregue.can_transition_to(Cancelado));
    }

    #[test]
    fn terminal_statuses_stay_put() {
        assert!(!Cancelado.can_transition_to(Pendente));
        assert!(!Cancelado.can_transition_to(Enviado));
        assert!(Cancelado.can_transition_to(Cancelado));
        assert!(Entregue.can_transition_to(Entregue));
    }

    #[test]
    fn status_wire_names_round_trip() {
        for status in [Pendente, ProntoParaEnvio, Enviado, Entregue, Cancelado] {
            assert_eq!(status.to_string().parse::<ShipmentStatus>().unwrap(), status);
        }
        assert!("ENVIADA".parse::<ShipmentStatus>().is_err());
    }
}
