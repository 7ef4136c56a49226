use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::FetchError;
use super::types::{PositionSample, StatusSample};
use super::TelemetrySource;

const POSITION_PATH: &str = "/api/current-position";
const STATUS_PATH: &str = "/api/tracker-status";
const HISTORY_PATH: &str = "/api/position-history";

/// HTTP client for the tracker telemetry API. Never retries.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    base_url: String,
    http: Client,
}

impl TelemetryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_position(&self) -> Result<PositionSample, FetchError> {
        self.get_json(POSITION_PATH).await
    }

    pub async fn fetch_status(&self) -> Result<StatusSample, FetchError> {
        self.get_json(STATUS_PATH).await
    }

    pub async fn fetch_history(&self) -> Result<Vec<PositionSample>, FetchError> {
        self.get_json(HISTORY_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl TelemetrySource for TelemetryClient {
    async fn fetch_position(&self) -> Result<PositionSample, FetchError> {
        TelemetryClient::fetch_position(self).await
    }

    async fn fetch_status(&self) -> Result<StatusSample, FetchError> {
        TelemetryClient::fetch_status(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fetches_and_parses_position_and_status() {
        let router = Router::new()
            .route(
                POSITION_PATH,
                get(|| async { Json(json!({"lat": 52.5, "lon": 13.4, "speed": 10, "altitude": 34})) }),
            )
            .route(
                STATUS_PATH,
                get(|| async {
                    Json(json!({
                        "online": true,
                        "battery": 15,
                        "signal_strength": 90,
                        "last_update": "2026-10-18T14:03:05.000001"
                    }))
                }),
            );
        let base = serve(router).await;
        let client = TelemetryClient::new(&format!("{}/", base), Duration::from_secs(2)).unwrap();
        assert_eq!(client.base_url(), base);

        let position = client.fetch_position().await.unwrap();
        assert_eq!(position.lat, 52.5);
        assert_eq!(position.speed, 10.0);

        let status = client.fetch_status().await.unwrap();
        assert!(status.online);
        assert_eq!(status.battery, 15);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            POSITION_PATH,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = serve(router).await;
        let client = TelemetryClient::new(&base, Duration::from_secs(2)).unwrap();

        match client.fetch_position().await {
            Err(FetchError::Status { status, body, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let router = Router::new().route(STATUS_PATH, get(|| async { "{\"online\": " }));
        let base = serve(router).await;
        let client = TelemetryClient::new(&base, Duration::from_secs(2)).unwrap();

        assert!(matches!(
            client.fetch_status().await,
            Err(FetchError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let router = Router::new().route(
            POSITION_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = serve(router).await;
        let client = TelemetryClient::new(&base, Duration::from_millis(100)).unwrap();

        assert!(matches!(
            client.fetch_position().await,
            Err(FetchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client =
            TelemetryClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();

        assert!(matches!(
            client.fetch_status().await,
            Err(FetchError::Network { .. })
        ));
    }
}
