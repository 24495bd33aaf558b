use crate::api::DeliveryApi;
use crate::delivery_actors::tracker::DeliveryTracker;
use crate::messages::internal_messages::*;
use actix::prelude::*;
use colored::Color;
use common::errors::DeliveryError;
use common::logger::Logger;
use common::notifications::{Notification, Notifier};
use common::transitions::{next_status, validate_accept, validate_advance};
use common::types::delivery_status::DeliveryStatus;
use common::types::dtos::DeliveryDTO;
use std::sync::Arc;

/// Sends agent commands to the server. Checks legality against the tracker's
/// snapshot first, never edits that snapshot on success, and asks the tracker
/// for a refresh instead. Every command ends in exactly one notification.
pub struct CommandDispatcher {
    api: Arc<dyn DeliveryApi>,
    /// Dueño de la foto local de entregas.
    tracker: Addr<DeliveryTracker>,
    notifier: Arc<dyn Notifier>,
    logger: Logger,
}

impl CommandDispatcher {
    pub fn new(
        api: Arc<dyn DeliveryApi>,
        tracker: Addr<DeliveryTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tracker,
            notifier,
            logger: Logger::new("Dispatcher", Color::Magenta),
        }
    }
}

impl Actor for CommandDispatcher {
    type Context = Context<Self>;
}

async fn lookup(
    tracker: &Addr<DeliveryTracker>,
    delivery_id: u64,
) -> Result<DeliveryDTO, DeliveryError> {
    tracker
        .send(GetDelivery { delivery_id })
        .await
        .map_err(|_| DeliveryError::TrackerStopped)?
        .ok_or(DeliveryError::UnknownDelivery(delivery_id))
}

async fn accept_delivery(
    api: Arc<dyn DeliveryApi>,
    tracker: &Addr<DeliveryTracker>,
    delivery_id: u64,
) -> Result<(), DeliveryError> {
    let delivery = lookup(tracker, delivery_id).await?;
    validate_accept(&delivery)?;
    api.accept(delivery_id).await
}

/// `requested == None` means "whatever comes next".
async fn advance_delivery(
    api: Arc<dyn DeliveryApi>,
    tracker: &Addr<DeliveryTracker>,
    delivery_id: u64,
    requested: Option<DeliveryStatus>,
) -> Result<DeliveryStatus, DeliveryError> {
    let delivery = lookup(tracker, delivery_id).await?;
    let requested = match requested {
        Some(requested) => requested,
        None => next_status(delivery.status).ok_or(DeliveryError::NoNextStatus {
            id: delivery_id,
            status: delivery.status,
        })?,
    };
    validate_advance(&delivery, requested)?;
    api.update_status(delivery_id, requested).await?;
    Ok(requested)
}

/// Shared tail of every remote command: notify, and refresh on success.
fn report<T>(
    result: &Result<T, DeliveryError>,
    success: impl FnOnce(&T) -> String,
    failure: &str,
    tracker: &Addr<DeliveryTracker>,
    notifier: &dyn Notifier,
    logger: &Logger,
) {
    match result {
        Ok(value) => {
            let message = success(value);
            logger.info(&message);
            notifier.notify(Notification::success(message));
            tracker.do_send(RefreshNow);
        }
        Err(err) => {
            logger.warn(format!("{}: {}", failure, err));
            notifier.notify(Notification::error(err.user_message(failure)));
        }
    }
}

impl Handler<AcceptDelivery> for CommandDispatcher {
    type Result = ResponseFuture<Result<(), DeliveryError>>;

    fn handle(&mut self, msg: AcceptDelivery, _ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        let tracker = self.tracker.clone();
        let notifier = self.notifier.clone();
        let logger = self.logger.clone();
        logger.info(format!("Accepting delivery {}", msg.delivery_id));

        Box::pin(async move {
            let result = accept_delivery(api, &tracker, msg.delivery_id).await;
            report(
                &result,
                |_| "Delivery accepted!".to_string(),
                "Failed to accept delivery",
                &tracker,
                notifier.as_ref(),
                &logger,
            );
            result
        })
    }
}

fn marked_as(status: &DeliveryStatus) -> String {
    format!("Delivery marked as {}!", status.label().to_lowercase())
}

impl Handler<AdvanceDelivery> for CommandDispatcher {
    type Result = ResponseFuture<Result<(), DeliveryError>>;

    fn handle(&mut self, msg: AdvanceDelivery, _ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        let tracker = self.tracker.clone();
        let notifier = self.notifier.clone();
        let logger = self.logger.clone();
        logger.info(format!(
            "Moving delivery {} to {}",
            msg.delivery_id, msg.requested
        ));

        Box::pin(async move {
            let result =
                advance_delivery(api, &tracker, msg.delivery_id, Some(msg.requested)).await;
            report(
                &result,
                marked_as,
                "Failed to update delivery status",
                &tracker,
                notifier.as_ref(),
                &logger,
            );
            result.map(|_| ())
        })
    }
}

impl Handler<AdvanceToNext> for CommandDispatcher {
    type Result = ResponseFuture<Result<DeliveryStatus, DeliveryError>>;

    fn handle(&mut self, msg: AdvanceToNext, _ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        let tracker = self.tracker.clone();
        let notifier = self.notifier.clone();
        let logger = self.logger.clone();

        Box::pin(async move {
            let result = advance_delivery(api, &tracker, msg.delivery_id, None).await;
            report(
                &result,
                marked_as,
                "Failed to update delivery status",
                &tracker,
                notifier.as_ref(),
                &logger,
            );
            result
        })
    }
}

impl Handler<RejectDelivery> for CommandDispatcher {
    type Result = ResponseFuture<Result<(), DeliveryError>>;

    fn handle(&mut self, msg: RejectDelivery, _ctx: &mut Self::Context) -> Self::Result {
        let tracker = self.tracker.clone();
        let notifier = self.notifier.clone();
        let logger = self.logger.clone();

        // The server has no reject endpoint: this only hides the delivery
        // until the next drain.
        Box::pin(async move {
            let result = tracker
                .send(DismissLocally {
                    delivery_id: msg.delivery_id,
                })
                .await
                .map_err(|_| DeliveryError::TrackerStopped)
                .and_then(|dismissed| dismissed)
                .map(|_| ());

            match &result {
                Ok(()) => notifier.notify(Notification::info("Delivery rejected.")),
                Err(err) => {
                    logger.warn(format!("Failed to reject delivery: {}", err));
                    notifier.notify(Notification::error(
                        err.user_message("Failed to reject delivery"),
                    ));
                }
            }
            result
        })
    }
}
