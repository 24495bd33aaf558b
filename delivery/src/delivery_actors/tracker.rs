use crate::api::DeliveryApi;
use crate::messages::internal_messages::*;
use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;
use common::config::TrackerConfig;
use common::constants::MAX_DRAIN_PAGES;
use common::errors::DeliveryError;
use common::logger::Logger;
use common::notifications::{Notification, Notifier};
use common::partition::{ViewKind, classify, partition};
use common::types::dtos::DeliveryDTO;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Reconciliation loop for the deliveries visible to one agent.
///
/// Every `poll_interval` (and on `RefreshNow`) it drains all pages for its
/// pincode and swaps the result in as the new snapshot. At most one drain
/// runs at a time; requests that arrive during a drain collapse into a single
/// follow-up drain. A failed drain leaves the previous snapshot in place.
pub struct DeliveryTracker {
    /// Código postal que filtra las entregas visibles.
    pincode: String,
    api: Arc<dyn DeliveryApi>,
    poll_interval: Duration,
    /// Páginas máximas por drain antes de darlo por fallido.
    max_drain_pages: usize,
    /// Última foto completa; vacía hasta el primer drain exitoso.
    snapshot: Vec<DeliveryDTO>,
    /// Timer del polling periódico.
    poll_handle: Option<SpawnHandle>,
    tracking: bool,
    draining: bool,
    refresh_queued: bool,
    completed_cycles: u64,
    failed_cycles: u64,
    discarded_cycles: u64,
    last_error: Option<DeliveryError>,
    notifier: Arc<dyn Notifier>,
    logger: Logger,
}

impl DeliveryTracker {
    /// Fails fast with `MissingPincode` when there is nothing to filter by.
    pub fn new(
        pincode: Option<&str>,
        api: Arc<dyn DeliveryApi>,
        poll_interval: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DeliveryError> {
        let config = TrackerConfig {
            pincode: pincode.map(str::to_string),
            poll_interval,
            ..TrackerConfig::default()
        };
        Self::from_config(&config, api, notifier)
    }

    pub fn from_config(
        config: &TrackerConfig,
        api: Arc<dyn DeliveryApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DeliveryError> {
        let pincode = match config.require_pincode() {
            Ok(pincode) => pincode.to_string(),
            Err(err) => {
                notifier.notify(Notification::error(err.to_string()));
                return Err(err);
            }
        };

        Ok(Self {
            logger: Logger::new(format!("Tracker {}", pincode), Color::Cyan),
            pincode,
            api,
            poll_interval: config.poll_interval,
            max_drain_pages: MAX_DRAIN_PAGES,
            snapshot: Vec::new(),
            poll_handle: None,
            tracking: false,
            draining: false,
            refresh_queued: false,
            completed_cycles: 0,
            failed_cycles: 0,
            discarded_cycles: 0,
            last_error: None,
            notifier,
        })
    }

    /// Lowers the page cap of a single drain.
    pub fn with_max_drain_pages(mut self, max_pages: usize) -> Self {
        self.max_drain_pages = max_pages;
        self
    }

    /// Builds and starts the loop in one step.
    pub fn start_tracking(
        config: &TrackerConfig,
        api: Arc<dyn DeliveryApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Addr<Self>, DeliveryError> {
        Ok(Self::from_config(config, api, notifier)?.start())
    }

    fn request_cycle(&mut self, ctx: &mut Context<Self>) {
        if !self.tracking {
            return;
        }
        if self.draining {
            self.logger
                .debug("Drain already in flight, queueing one more cycle");
            self.refresh_queued = true;
            return;
        }

        self.draining = true;
        let api = self.api.clone();
        let pincode = self.pincode.clone();
        ctx.spawn(
            wrap_future::<_, Self>(drain_deliveries(api, pincode, self.max_drain_pages))
                .map(|result, act, ctx| act.finish_cycle(result, ctx)),
        );
    }

    fn finish_cycle(
        &mut self,
        result: Result<Vec<DeliveryDTO>, DeliveryError>,
        ctx: &mut Context<Self>,
    ) {
        self.draining = false;

        if !self.tracking {
            self.discarded_cycles += 1;
            self.logger
                .debug("Discarding drain result, tracking was cancelled");
            return;
        }

        match result {
            Ok(deliveries) => {
                for delivery in deliveries.iter().filter(|d| !d.is_consistent()) {
                    self.logger.warn(format!(
                        "Delivery {} is {} but assignee is {:?}; it will not be listed",
                        delivery.id, delivery.status, delivery.assignee
                    ));
                }
                self.logger.debug(format!(
                    "Drain complete with {} deliveries",
                    deliveries.len()
                ));
                self.snapshot = deliveries;
                self.completed_cycles += 1;
                self.last_error = None;
            }
            Err(err) => {
                self.failed_cycles += 1;
                self.logger.warn(format!(
                    "Reconciliation failed, keeping previous snapshot: {}",
                    err
                ));
                self.notifier
                    .notify(Notification::error("Failed to fetch deliveries"));
                self.last_error = Some(err);
            }
        }

        if self.refresh_queued {
            self.refresh_queued = false;
            self.request_cycle(ctx);
        }
    }

    fn state(&self) -> TrackerState {
        TrackerState {
            tracking: self.tracking,
            draining: self.draining,
            refresh_queued: self.refresh_queued,
            completed_cycles: self.completed_cycles,
            failed_cycles: self.failed_cycles,
            discarded_cycles: self.discarded_cycles,
            snapshot_len: self.snapshot.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Follows `next` cursors until the last page and returns everything as one
/// list. Any failing page fails the whole drain, and so does a cursor chain
/// longer than `max_pages`. A delivery served on two pages keeps its first
/// position and its latest data.
pub async fn drain_deliveries(
    api: Arc<dyn DeliveryApi>,
    pincode: String,
    max_pages: usize,
) -> Result<Vec<DeliveryDTO>, DeliveryError> {
    let mut deliveries: Vec<DeliveryDTO> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut cursor: Option<String> = None;

    for _ in 0..max_pages {
        let page = api.fetch_page(&pincode, cursor.as_deref()).await?;
        let next = page.next_cursor().map(str::to_string);

        for delivery in page.results {
            match positions.get(&delivery.id) {
                Some(&index) => deliveries[index] = delivery,
                None => {
                    positions.insert(delivery.id, deliveries.len());
                    deliveries.push(delivery);
                }
            }
        }

        match next {
            Some(next) => cursor = Some(next),
            None => return Ok(deliveries),
        }
    }

    Err(DeliveryError::Fetch(format!(
        "pagination did not finish after {} pages",
        max_pages
    )))
}

impl Actor for DeliveryTracker {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.logger.info(format!(
            "Tracking deliveries for pincode {} every {:?}",
            self.pincode, self.poll_interval
        ));
        self.tracking = true;
        self.request_cycle(ctx);
        self.poll_handle = Some(ctx.run_interval(self.poll_interval, |act, ctx| {
            act.request_cycle(ctx);
        }));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("Delivery tracker stopped");
    }
}

impl Handler<RefreshNow> for DeliveryTracker {
    type Result = ();

    fn handle(&mut self, _msg: RefreshNow, ctx: &mut Self::Context) -> Self::Result {
        self.request_cycle(ctx);
    }
}

impl Handler<StopTracking> for DeliveryTracker {
    type Result = ();

    fn handle(&mut self, _msg: StopTracking, ctx: &mut Self::Context) -> Self::Result {
        if !self.tracking {
            return;
        }
        self.tracking = false;
        self.refresh_queued = false;
        if let Some(handle) = self.poll_handle.take() {
            ctx.cancel_future(handle);
        }
        self.logger.info(format!(
            "Stopped tracking pincode {}{}",
            self.pincode,
            if self.draining {
                ", in-flight drain will be discarded"
            } else {
                ""
            }
        ));
    }
}

impl Handler<GetViews> for DeliveryTracker {
    type Result = MessageResult<GetViews>;

    fn handle(&mut self, _msg: GetViews, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(partition(&self.snapshot))
    }
}

impl Handler<GetSnapshot> for DeliveryTracker {
    type Result = Vec<DeliveryDTO>;

    fn handle(&mut self, _msg: GetSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        self.snapshot.clone()
    }
}

impl Handler<GetDelivery> for DeliveryTracker {
    type Result = Option<DeliveryDTO>;

    fn handle(&mut self, msg: GetDelivery, _ctx: &mut Self::Context) -> Self::Result {
        self.snapshot
            .iter()
            .find(|d| d.id == msg.delivery_id)
            .cloned()
    }
}

impl Handler<DismissLocally> for DeliveryTracker {
    type Result = Result<DeliveryDTO, DeliveryError>;

    fn handle(&mut self, msg: DismissLocally, _ctx: &mut Self::Context) -> Self::Result {
        let position = self
            .snapshot
            .iter()
            .position(|d| d.id == msg.delivery_id)
            .ok_or(DeliveryError::UnknownDelivery(msg.delivery_id))?;

        if classify(&self.snapshot[position]) != Some(ViewKind::New) {
            return Err(DeliveryError::NotRejectable(msg.delivery_id));
        }

        // Only the local copy goes away; the next drain brings it back if
        // the server still offers it.
        self.logger.info(format!(
            "Dismissing delivery {} from the new view",
            msg.delivery_id
        ));
        Ok(self.snapshot.remove(position))
    }
}

impl Handler<GetTrackerState> for DeliveryTracker {
    type Result = MessageResult<GetTrackerState>;

    fn handle(&mut self, _msg: GetTrackerState, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.state())
    }
}
