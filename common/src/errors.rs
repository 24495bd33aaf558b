use crate::types::delivery_status::DeliveryStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("delivery pincode not available; log in as a delivery agent")]
    MissingPincode,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to fetch deliveries: {0}")]
    Fetch(String),

    #[error("request rejected by server{}", rejection_suffix(.reason))]
    Rejected {
        status: Option<u16>,
        reason: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("cannot move delivery from {from} to {requested}")]
    InvalidTransition {
        from: DeliveryStatus,
        requested: DeliveryStatus,
    },

    #[error("delivery {id} cannot be accepted while {status}")]
    NotAcceptable { id: u64, status: DeliveryStatus },

    #[error("delivery {id} has no next step while {status}")]
    NoNextStatus { id: u64, status: DeliveryStatus },

    #[error("delivery {0} is not in the local view")]
    UnknownDelivery(u64),

    #[error("delivery {0} is not a new delivery")]
    NotRejectable(u64),

    #[error("delivery tracker is not running")]
    TrackerStopped,
}

fn rejection_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

impl DeliveryError {
    /// Raised before any request leaves the client.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DeliveryError::InvalidTransition { .. }
                | DeliveryError::NotAcceptable { .. }
                | DeliveryError::NoNextStatus { .. }
                | DeliveryError::UnknownDelivery(_)
                | DeliveryError::NotRejectable(_)
        )
    }

    /// The server's own explanation, when it gave one.
    pub fn server_reason(&self) -> Option<&str> {
        match self {
            DeliveryError::Rejected { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Text shown to the agent: local rejections explain themselves, remote
    /// failures show the server's reason or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_local() || matches!(self, DeliveryError::TrackerStopped) {
            return self.to_string();
        }
        self.server_reason().unwrap_or(fallback).to_string()
    }
}
