use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enum representing the lifecycle status of a delivery, as served by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Esperando que algún delivery la acepte.
    Pending,
    /// Aceptada por un delivery, todavía no retirada.
    Accepted,
    /// Retirada del local, en camino al cliente.
    PickedUp,
    /// Entregada al cliente.
    Delivered,
    /// Cancelada.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Warning,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Pending,
    CheckCircle,
    LocalShipping,
    Cancel,
}

/// Display and lifecycle data attached to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDescriptor {
    pub color: StatusColor,
    pub icon: StatusIcon,
    pub label: &'static str,
    pub next: Option<DeliveryStatus>,
}

const DESCRIPTORS: [(DeliveryStatus, StatusDescriptor); 5] = [
    (
        DeliveryStatus::Pending,
        StatusDescriptor {
            color: StatusColor::Warning,
            icon: StatusIcon::Pending,
            label: "Pending",
            next: None,
        },
    ),
    (
        DeliveryStatus::Accepted,
        StatusDescriptor {
            color: StatusColor::Info,
            icon: StatusIcon::CheckCircle,
            label: "Accepted",
            next: Some(DeliveryStatus::PickedUp),
        },
    ),
    (
        DeliveryStatus::PickedUp,
        StatusDescriptor {
            color: StatusColor::Info,
            icon: StatusIcon::LocalShipping,
            label: "Picked up",
            next: Some(DeliveryStatus::Delivered),
        },
    ),
    (
        DeliveryStatus::Delivered,
        StatusDescriptor {
            color: StatusColor::Success,
            icon: StatusIcon::CheckCircle,
            label: "Delivered",
            next: None,
        },
    ),
    (
        DeliveryStatus::Cancelled,
        StatusDescriptor {
            color: StatusColor::Error,
            icon: StatusIcon::Cancel,
            label: "Cancelled",
            next: None,
        },
    ),
];

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 5] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Accepted,
        DeliveryStatus::PickedUp,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    pub fn descriptor(self) -> &'static StatusDescriptor {
        // The table is indexed in declaration order.
        &DESCRIPTORS[self as usize].1
    }

    /// The status a delivery agent may move this one to, if any.
    /// `Pending` has none: leaving it goes through the accept command.
    pub fn next_status(self) -> Option<DeliveryStatus> {
        self.descriptor().next
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// Statuses in which a delivery must have an agent assigned.
    pub fn requires_assignee(self) -> bool {
        matches!(self, DeliveryStatus::Accepted | DeliveryStatus::PickedUp)
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Accepted => "accepted",
            DeliveryStatus::PickedUp => "picked_up",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for DeliveryStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        DeliveryStatus::ALL
            .into_iter()
            .find(|status| status.wire_name() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table_matches_declaration_order() {
        for (status, _) in DESCRIPTORS.iter() {
            assert_eq!(DESCRIPTORS[*status as usize].0, *status);
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_next_status() {
        for status in DeliveryStatus::ALL {
            if status.is_terminal() {
                assert_eq!(status.next_status(), None, "{status} should be final");
            }
        }
    }

    #[test]
    fn test_agent_driven_transitions() {
        assert_eq!(
            DeliveryStatus::Accepted.next_status(),
            Some(DeliveryStatus::PickedUp)
        );
        assert_eq!(
            DeliveryStatus::PickedUp.next_status(),
            Some(DeliveryStatus::Delivered)
        );
        assert_eq!(DeliveryStatus::Pending.next_status(), None);
    }

    #[test]
    fn test_descriptors_for_display() {
        let picked_up = DeliveryStatus::PickedUp.descriptor();
        assert_eq!(picked_up.color, StatusColor::Info);
        assert_eq!(picked_up.icon, StatusIcon::LocalShipping);
        assert_eq!(picked_up.label, "Picked up");
        assert_eq!(
            DeliveryStatus::Cancelled.descriptor().color,
            StatusColor::Error
        );
    }

    #[test]
    fn test_parse_status_names() {
        assert_eq!(
            "picked_up".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::PickedUp)
        );
        assert_eq!(
            "Picked up".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::PickedUp)
        );
        assert!("rejected".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&DeliveryStatus::PickedUp).unwrap();
        assert_eq!(json, "\"picked_up\"");
        let status: DeliveryStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, DeliveryStatus::Cancelled);
    }
}
