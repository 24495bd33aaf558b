use crate::types::delivery_status::DeliveryStatus;
use crate::types::dtos::DeliveryDTO;

/// The three lists shown to a delivery agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryViews {
    pub new: Vec<DeliveryDTO>,
    pub active: Vec<DeliveryDTO>,
    pub history: Vec<DeliveryDTO>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    New,
    Active,
    History,
}

impl ViewKind {
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::New => "New Deliveries",
            ViewKind::Active => "Active Deliveries",
            ViewKind::History => "Delivery History",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ViewKind::New => "No new deliveries available.",
            ViewKind::Active => "No active deliveries found.",
            ViewKind::History => "No delivery history found.",
        }
    }
}

/// Which view a delivery belongs to. `None` for records that fit no view,
/// such as a pending delivery that already has an agent.
pub fn classify(delivery: &DeliveryDTO) -> Option<ViewKind> {
    match delivery.status {
        DeliveryStatus::Pending if !delivery.is_assigned() => Some(ViewKind::New),
        DeliveryStatus::Accepted | DeliveryStatus::PickedUp if delivery.is_assigned() => {
            Some(ViewKind::Active)
        }
        DeliveryStatus::Delivered | DeliveryStatus::Cancelled => Some(ViewKind::History),
        _ => None,
    }
}

/// Splits a snapshot into views, keeping input order inside each view.
pub fn partition(deliveries: &[DeliveryDTO]) -> DeliveryViews {
    let mut views = DeliveryViews::default();
    for delivery in deliveries {
        match classify(delivery) {
            Some(ViewKind::New) => views.new.push(delivery.clone()),
            Some(ViewKind::Active) => views.active.push(delivery.clone()),
            Some(ViewKind::History) => views.history.push(delivery.clone()),
            None => {}
        }
    }
    views
}

impl DeliveryViews {
    pub fn view(&self, kind: ViewKind) -> &[DeliveryDTO] {
        match kind {
            ViewKind::New => &self.new,
            ViewKind::Active => &self.active,
            ViewKind::History => &self.history,
        }
    }

    pub fn ids(&self, kind: ViewKind) -> Vec<u64> {
        self.view(kind).iter().map(|d| d.id).collect()
    }
}
