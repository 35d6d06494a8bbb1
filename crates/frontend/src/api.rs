use serde::Serialize;
use thiserror::Error;
use trafficflow_shared::models::{
    ClosureState, ClosureToggle, SignalTimingUpdate, SignalTimings, Snapshot, SpawnUpdate,
};
use trafficflow_shared::protocol::{self, DecodeError};

use crate::poller::SnapshotSource;
use crate::sync::SettingsApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("unreadable response: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Non-success statuses are failures even when a body came back.
fn ensure_success(status: reqwest::StatusCode) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

/// Origin of the hosting page. The service is reached same-origin.
pub fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// HTTP client for the simulation service.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn same_origin() -> Self {
        Self::new(page_origin().unwrap_or_default())
    }

    pub fn url(&self, path: &str) -> String {
        protocol::endpoint_url(&self.base_url, path)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self.client.get(self.url(path)).send().await?;
        ensure_success(resp.status())?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Vec<u8>, ApiError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        ensure_success(resp.status())?;
        Ok(resp.bytes().await?.to_vec())
    }
}

impl SnapshotSource for HttpApi {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
        let body = self.get_bytes(protocol::STATE_PATH).await?;
        Ok(protocol::decode_snapshot(&body)?)
    }
}

impl SettingsApi for HttpApi {
    async fn set_signal_timings(
        &self,
        update: SignalTimingUpdate,
    ) -> Result<Option<SignalTimings>, ApiError> {
        let body = self.post_json(protocol::SIGNALS_PATH, &update).await?;
        Ok(protocol::decode_json(&body).ok())
    }

    async fn set_spawn_interval(&self, update: SpawnUpdate) -> Result<Option<SpawnUpdate>, ApiError> {
        let body = self.post_json(protocol::SPAWN_PATH, &update).await?;
        Ok(protocol::decode_json(&body).ok())
    }

    async fn toggle_closure(&self, edge_id: &str) -> Result<ClosureState, ApiError> {
        let request = ClosureToggle {
            edge_id: edge_id.to_string(),
        };
        let body = self.post_json(protocol::CLOSURE_TOGGLE_PATH, &request).await?;
        Ok(protocol::decode_json(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let api = HttpApi::new("http://localhost:8080/");
        assert_eq!(api.url(protocol::STATE_PATH), "http://localhost:8080/api/state");
    }

    #[test]
    fn test_same_origin_relative_url() {
        let api = HttpApi::new("");
        assert_eq!(api.url(protocol::SPAWN_PATH), "/api/settings/spawn");
    }

    #[test]
    fn test_signal_body_shape() {
        let json = serde_json::to_value(SignalTimingUpdate { ns: 30.0, ew: 12.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"ns": 30.0, "ew": 12.5}));
    }

    #[test]
    fn test_spawn_body_shape() {
        let json = serde_json::to_value(SpawnUpdate { spawn_interval: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({"spawn_interval": 7}));
    }

    #[test]
    fn test_closure_body_shape() {
        let json = serde_json::to_value(ClosureToggle {
            edge_id: "e_n_0_0_to_n_0_1".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"edge_id": "e_n_0_0_to_n_0_1"}));
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(reqwest::StatusCode::OK).is_ok());
        assert!(matches!(
            ensure_success(reqwest::StatusCode::SERVICE_UNAVAILABLE),
            Err(ApiError::Status(503))
        ));
        assert!(matches!(
            ensure_success(reqwest::StatusCode::UNPROCESSABLE_ENTITY),
            Err(ApiError::Status(422))
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ApiError::Status(500).to_string(),
            "server responded with status 500"
        );
        assert_eq!(
            ApiError::Transport("connection refused".to_string()).to_string(),
            "request failed: connection refused"
        );
    }
}
