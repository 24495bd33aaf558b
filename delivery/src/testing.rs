//! In-memory stand-ins for the REST API and the notification channel.

use crate::api::DeliveryApi;
use crate::delivery_actors::tracker::DeliveryTracker;
use crate::messages::internal_messages::{GetTrackerState, TrackerState};
use actix::Addr;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::errors::DeliveryError;
use common::notifications::{Notification, Notifier};
use common::types::delivery_status::DeliveryStatus;
use common::types::dtos::{AgentRef, DeliveryDTO, DeliveryPage, OrderDetailsDTO};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

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

/// Scripted API. Pages are served in push order across drains; once the
/// script runs out every page request fails.
#[derive(Default)]
pub struct FakeDeliveryApi {
    pages: Mutex<VecDeque<Result<DeliveryPage, DeliveryError>>>,
    accept_results: Mutex<VecDeque<Result<(), DeliveryError>>>,
    update_results: Mutex<VecDeque<Result<(), DeliveryError>>>,
    page_requests: Mutex<Vec<(String, Option<String>)>>,
    accept_calls: Mutex<Vec<u64>>,
    update_calls: Mutex<Vec<(u64, DeliveryStatus)>>,
    /// Each page request waits for one permit, when set.
    gate: Option<Arc<Semaphore>>,
}

impl FakeDeliveryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_page(&self, results: Vec<DeliveryDTO>, next: Option<&str>) {
        self.pages
            .lock()
            .unwrap()
            .push_back(Ok(DeliveryPage::new(results, next.map(str::to_string))));
    }

    pub fn push_page_error(&self, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .push_back(Err(DeliveryError::Fetch(message.to_string())));
    }

    pub fn push_accept(&self, result: Result<(), DeliveryError>) {
        self.accept_results.lock().unwrap().push_back(result);
    }

    pub fn push_update(&self, result: Result<(), DeliveryError>) {
        self.update_results.lock().unwrap().push_back(result);
    }

    pub fn page_requests(&self) -> Vec<(String, Option<String>)> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn accept_calls(&self) -> Vec<u64> {
        self.accept_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(u64, DeliveryStatus)> {
        self.update_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryApi for FakeDeliveryApi {
    async fn fetch_page(
        &self,
        pincode: &str,
        cursor: Option<&str>,
    ) -> Result<DeliveryPage, DeliveryError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((pincode.to_string(), cursor.map(str::to_string)));

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let next = self.pages.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(DeliveryError::Fetch("no page scripted".to_string())))
    }

    async fn accept(&self, delivery_id: u64) -> Result<(), DeliveryError> {
        self.accept_calls.lock().unwrap().push(delivery_id);
        let next = self.accept_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn update_status(
        &self,
        delivery_id: u64,
        status: DeliveryStatus,
    ) -> Result<(), DeliveryError> {
        self.update_calls.lock().unwrap().push((delivery_id, status));
        let next = self.update_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<Notification> {
        self.notes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notes.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notes.lock().unwrap().push(notification);
    }
}

/// Polls the tracker until `condition` holds; panics after five seconds.
pub async fn wait_for<F>(tracker: &Addr<DeliveryTracker>, condition: F) -> TrackerState
where
    F: Fn(&TrackerState) -> bool,
{
    let poll = async {
        loop {
            let state = tracker.send(GetTrackerState).await.unwrap();
            if condition(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), poll)
        .await
        .expect("tracker never reached the expected state")
}
