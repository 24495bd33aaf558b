use crate::types::delivery_status::DeliveryStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::fmt;

/// Reference to the delivery agent a delivery is assigned to. The API serves
/// the agent's numeric id; other deployments use a username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentRef {
    Id(u64),
    Name(String),
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRef::Id(id) => write!(f, "#{}", id),
            AgentRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Summary of the order a delivery belongs to. Read-only for the tracker.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetailsDTO {
    /// ID de la orden.
    pub id: u64,
    /// Nombre del tiffin pedido.
    #[serde(rename = "tiffin_name")]
    pub item_name: String,
    /// Nombre del cliente que hizo el pedido.
    pub customer_name: String,
    pub quantity: u32,
    /// Precio total; el servidor lo manda como decimal en string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDTO {
    /// ID único de la entrega.
    pub id: u64,
    /// Estado actual de la entrega.
    pub status: DeliveryStatus,
    /// Delivery asignado, si lo hay.
    #[serde(rename = "delivery_boy", default)]
    pub assignee: Option<AgentRef>,
    #[serde(rename = "delivery_boy_name", default)]
    pub assignee_name: Option<String>,
    /// Dirección de retiro.
    #[serde(rename = "pickup_address")]
    pub pickup_location: String,
    /// Dirección de entrega.
    #[serde(rename = "delivery_address")]
    pub dropoff_location: String,
    #[serde(rename = "order_details")]
    pub order: OrderDetailsDTO,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeliveryDTO {
    pub fn is_assigned(&self) -> bool {
        self.assignee.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Pending and nobody has taken it yet.
    pub fn can_accept(&self) -> bool {
        self.status == DeliveryStatus::Pending && !self.is_assigned()
    }

    /// Checks the assignment invariants: pending deliveries are unassigned,
    /// accepted and picked up ones have an agent.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            DeliveryStatus::Pending => !self.is_assigned(),
            status if status.requires_assignee() => self.is_assigned(),
            _ => true,
        }
    }
}

/// One page of `GET /deliveries/`. `next` is the continuation cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<DeliveryDTO>,
}

impl DeliveryPage {
    pub fn new(results: Vec<DeliveryDTO>, next: Option<String>) -> Self {
        DeliveryPage {
            count: None,
            next,
            results,
        }
    }

    /// The cursor to follow, if the drain is not over. Blank cursors end it.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref().filter(|cursor| !cursor.trim().is_empty())
    }
}
