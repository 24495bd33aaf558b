//! Legality checks for agent-initiated changes. Nothing here mutates a
//! delivery; the server stays the authority and these only decide whether
//! a request is worth sending.

use crate::errors::DeliveryError;
use crate::types::delivery_status::DeliveryStatus;
use crate::types::dtos::DeliveryDTO;

pub fn next_status(current: DeliveryStatus) -> Option<DeliveryStatus> {
    current.next_status()
}

pub fn can_accept(delivery: &DeliveryDTO) -> bool {
    delivery.can_accept()
}

pub fn validate_accept(delivery: &DeliveryDTO) -> Result<(), DeliveryError> {
    if can_accept(delivery) {
        Ok(())
    } else {
        Err(DeliveryError::NotAcceptable {
            id: delivery.id,
            status: delivery.status,
        })
    }
}

/// `requested` must be exactly the legal next step of the current status.
pub fn validate_advance(
    delivery: &DeliveryDTO,
    requested: DeliveryStatus,
) -> Result<(), DeliveryError> {
    match next_status(delivery.status) {
        Some(next) if next == requested => Ok(()),
        _ => Err(DeliveryError::InvalidTransition {
            from: delivery.status,
            requested,
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::delivery_status::DeliveryStatus;
    use crate::types::dtos::{AgentRef, DeliveryDTO, OrderDetailsDTO};
    use chrono::{TimeZone, Utc};

    pub fn delivery(id: u64, status: DeliveryStatus, assignee: Option<&str>) -> DeliveryDTO {
        DeliveryDTO {
            id,
            status,
            assignee: assignee.map(|name| AgentRef::Name(name.to_string())),
            assignee_name: assignee.map(str::to_string),
            pickup_location: "Annapurna Kitchen, FC Road".to_string(),
            dropoff_location: format!("{} MG Road", id),
            order: OrderDetailsDTO {
                id: 100 + id,
                item_name: "Veg Thali".to_string(),
                customer_name: "ravi".to_string(),
                quantity: 2,
                total_price: 240.0,
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::delivery;
    use super::*;

    #[test]
    fn test_advance_only_to_legal_next_status() {
        let accepted = delivery(2, DeliveryStatus::Accepted, Some("A"));
        assert!(validate_advance(&accepted, DeliveryStatus::PickedUp).is_ok());
        assert_eq!(
            validate_advance(&accepted, DeliveryStatus::Delivered),
            Err(DeliveryError::InvalidTransition {
                from: DeliveryStatus::Accepted,
                requested: DeliveryStatus::Delivered,
            })
        );

        let picked_up = delivery(3, DeliveryStatus::PickedUp, Some("A"));
        assert!(validate_advance(&picked_up, DeliveryStatus::Delivered).is_ok());
    }

    #[test]
    fn test_pending_cannot_be_advanced_only_accepted() {
        let pending = delivery(1, DeliveryStatus::Pending, None);
        assert!(validate_advance(&pending, DeliveryStatus::Accepted).is_err());
        assert!(validate_accept(&pending).is_ok());
    }

    #[test]
    fn test_terminal_deliveries_reject_everything() {
        for status in [DeliveryStatus::Delivered, DeliveryStatus::Cancelled] {
            let done = delivery(4, status, Some("A"));
            for requested in DeliveryStatus::ALL {
                assert!(validate_advance(&done, requested).is_err());
            }
            assert!(validate_accept(&done).is_err());
        }
    }

    #[test]
    fn test_accept_requires_unassigned_pending() {
        let taken = delivery(5, DeliveryStatus::Pending, Some("B"));
        assert!(!can_accept(&taken));
        assert_eq!(
            validate_accept(&taken),
            Err(DeliveryError::NotAcceptable {
                id: 5,
                status: DeliveryStatus::Pending,
            })
        );
    }
}
