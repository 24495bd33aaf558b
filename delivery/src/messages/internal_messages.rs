use actix::Message;
use common::errors::DeliveryError;
use common::partition::DeliveryViews;
use common::types::delivery_status::DeliveryStatus;
use common::types::dtos::DeliveryDTO;

// ------- Tracker ------- //

/// Pide un ciclo de reconciliación fuera del intervalo. Si ya hay uno en
/// curso, se encola uno solo para después.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RefreshNow;

/// Cancela el loop: no arrancan más ciclos y se descarta el que esté en vuelo.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct StopTracking;

#[derive(Message, Debug, Clone)]
#[rtype(result = "DeliveryViews")]
pub struct GetViews;

#[derive(Message, Debug, Clone)]
#[rtype(result = "Vec<DeliveryDTO>")]
pub struct GetSnapshot;

#[derive(Message, Debug, Clone)]
#[rtype(result = "Option<DeliveryDTO>")]
pub struct GetDelivery {
    pub delivery_id: u64,
}

/// Saca la entrega de la vista local de nuevas. No se avisa al servidor.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<DeliveryDTO, DeliveryError>")]
pub struct DismissLocally {
    pub delivery_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "TrackerState")]
pub struct GetTrackerState;

/// Counters and flags of the reconciliation loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    pub tracking: bool,
    pub draining: bool,
    pub refresh_queued: bool,
    pub completed_cycles: u64,
    pub failed_cycles: u64,
    pub discarded_cycles: u64,
    pub snapshot_len: usize,
    pub last_error: Option<DeliveryError>,
}

impl TrackerState {
    pub fn finished_cycles(&self) -> u64 {
        self.completed_cycles + self.failed_cycles
    }
}

// ------- Dispatcher ------- //

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), DeliveryError>")]
pub struct AcceptDelivery {
    pub delivery_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), DeliveryError>")]
pub struct AdvanceDelivery {
    pub delivery_id: u64,
    pub requested: DeliveryStatus,
}

/// Like `AdvanceDelivery`, to whatever the legal next status is.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<DeliveryStatus, DeliveryError>")]
pub struct AdvanceToNext {
    pub delivery_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), DeliveryError>")]
pub struct RejectDelivery {
    pub delivery_id: u64,
}
