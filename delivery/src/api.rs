use async_trait::async_trait;
use common::errors::DeliveryError;
use common::types::delivery_status::DeliveryStatus;
use common::types::dtos::DeliveryPage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Remote authority for deliveries.
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// One page of deliveries for `pincode`; `cursor` is the `next` value of
    /// the previous page.
    async fn fetch_page(
        &self,
        pincode: &str,
        cursor: Option<&str>,
    ) -> Result<DeliveryPage, DeliveryError>;

    async fn accept(&self, delivery_id: u64) -> Result<(), DeliveryError>;

    async fn update_status(
        &self,
        delivery_id: u64,
        status: DeliveryStatus,
    ) -> Result<(), DeliveryError>;
}

/// Supplies the bearer credential. Acquiring and renewing it is someone
/// else's job.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Serialize)]
struct UpdateStatusRequest {
    status: DeliveryStatus,
}

/// Error payload; the API puts the reason in either field.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    error: Option<String>,
}

pub struct HttpDeliveryApi {
    base_url: String,
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl HttpDeliveryApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, DeliveryError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DeliveryError::Config("api url must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Config(format!("cannot build http client: {}", e)))?;
        Ok(Self {
            base_url,
            client,
            tokens,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Whether `url` points at the same scheme, host and port as the API.
    fn is_own_origin(&self, url: &str) -> bool {
        match (reqwest::Url::parse(&self.base_url), reqwest::Url::parse(url)) {
            (Ok(base), Ok(url)) => base.origin() == url.origin(),
            _ => false,
        }
    }

    /// The credential only travels to the API's own origin.
    fn page_request(&self, pincode: &str, cursor: Option<&str>) -> reqwest::RequestBuilder {
        match cursor {
            // Django REST style: `next` is already a complete URL.
            Some(next) if next.starts_with("http://") || next.starts_with("https://") => {
                let request = self.client.get(next);
                if self.is_own_origin(next) {
                    self.authorized(request)
                } else {
                    request
                }
            }
            Some(cursor) => self.authorized(
                self.client
                    .get(format!("{}/deliveries/", self.base_url))
                    .query(&[("pincode", pincode), ("cursor", cursor)]),
            ),
            None => self.authorized(
                self.client
                    .get(format!("{}/deliveries/", self.base_url))
                    .query(&[("pincode", pincode)]),
            ),
        }
    }

    async fn post_command<T: Serialize + ?Sized>(
        &self,
        url: String,
        body: &T,
    ) -> Result<(), DeliveryError> {
        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &text))
    }
}

fn rejection(status: u16, body: &str) -> DeliveryError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    DeliveryError::Rejected {
        status: Some(status),
        reason: parsed.detail.or(parsed.error),
    }
}

#[async_trait]
impl DeliveryApi for HttpDeliveryApi {
    async fn fetch_page(
        &self,
        pincode: &str,
        cursor: Option<&str>,
    ) -> Result<DeliveryPage, DeliveryError> {
        let response = self
            .page_request(pincode, cursor)
            .send()
            .await
            .map_err(|e| DeliveryError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Fetch(format!("server answered {}", status)));
        }

        response
            .json::<DeliveryPage>()
            .await
            .map_err(|e| DeliveryError::Fetch(format!("malformed page: {}", e)))
    }

    async fn accept(&self, delivery_id: u64) -> Result<(), DeliveryError> {
        let url = format!("{}/deliveries/{}/accept/", self.base_url, delivery_id);
        self.post_command(url, &serde_json::json!({})).await
    }

    async fn update_status(
        &self,
        delivery_id: u64,
        status: DeliveryStatus,
    ) -> Result<(), DeliveryError> {
        let url = format!("{}/deliveries/{}/update_status/", self.base_url, delivery_id);
        self.post_command(url, &UpdateStatusRequest { status }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpDeliveryApi {
        HttpDeliveryApi::new(
            "http://localhost:8000/api/",
            Duration::from_secs(1),
            Arc::new(StaticToken(Some("token".to_string()))),
        )
        .unwrap()
    }

    #[test]
    fn test_rejection_reads_detail_or_error() {
        assert_eq!(
            rejection(400, r#"{"error": "Delivery already assigned."}"#),
            DeliveryError::Rejected {
                status: Some(400),
                reason: Some("Delivery already assigned.".to_string()),
            }
        );
        assert_eq!(
            rejection(403, r#"{"detail": "Authentication credentials were not provided."}"#)
                .server_reason(),
            Some("Authentication credentials were not provided.")
        );
        assert_eq!(rejection(502, "<html>bad gateway</html>").server_reason(), None);
    }

    #[test]
    fn test_first_page_url_carries_pincode() {
        let request = api().page_request("411001", None).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/deliveries/?pincode=411001"
        );
    }

    #[test]
    fn test_cursor_pages() {
        let api = api();
        let absolute = api
            .page_request(
                "411001",
                Some("http://localhost:8000/api/deliveries/?page=2&pincode=411001"),
            )
            .build()
            .unwrap();
        assert_eq!(
            absolute.url().as_str(),
            "http://localhost:8000/api/deliveries/?page=2&pincode=411001"
        );

        let opaque = api.page_request("411001", Some("abc")).build().unwrap();
        assert_eq!(
            opaque.url().as_str(),
            "http://localhost:8000/api/deliveries/?pincode=411001&cursor=abc"
        );
    }

    #[test]
    fn test_requests_carry_bearer_token() {
        let api = api();
        for cursor in [
            None,
            Some("abc"),
            Some("http://localhost:8000/api/deliveries/?page=2&pincode=411001"),
        ] {
            let request = api.page_request("411001", cursor).build().unwrap();
            assert_eq!(
                request.headers().get("authorization").unwrap(),
                "Bearer token"
            );
        }
    }

    #[test]
    fn test_foreign_cursor_gets_no_token() {
        let api = api();
        for cursor in [
            "https://localhost:8000/api/deliveries/?page=2",
            "http://localhost:9000/api/deliveries/?page=2",
            "http://elsewhere.example/api/deliveries/?page=2",
        ] {
            let request = api.page_request("411001", Some(cursor)).build().unwrap();
            assert_eq!(request.url().as_str(), cursor);
            assert!(request.headers().get("authorization").is_none());
        }
    }

    #[test]
    fn test_update_status_body() {
        let body = serde_json::to_value(UpdateStatusRequest {
            status: DeliveryStatus::PickedUp,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "picked_up" }));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let result = HttpDeliveryApi::new("/", Duration::from_secs(1), Arc::new(StaticToken(None)));
        assert!(matches!(result, Err(DeliveryError::Config(_))));
    }
}
