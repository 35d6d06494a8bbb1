//! HTTP surface of the simulation service and the validated decode step that
//! turns its JSON payloads into typed values.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::Snapshot;

pub const STATE_PATH: &str = "/api/state";
pub const SIGNALS_PATH: &str = "/api/settings/signals";
pub const SPAWN_PATH: &str = "/api/settings/spawn";
pub const CLOSURE_TOGGLE_PATH: &str = "/api/closures/toggle";

/// Prefix shared by every service endpoint.
pub const API_PREFIX: &str = "/api";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Join a base URL (with or without trailing slash) and an endpoint path.
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Decode any JSON response body into `T`.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a `/api/state` body and reject values no renderer could draw.
///
/// Missing `network`, `metrics`, `settings` or `history` is not an error; those
/// come back as `None`.
pub fn decode_snapshot(body: &[u8]) -> Result<Snapshot, DecodeError> {
    let snapshot: Snapshot = decode_json(body)?;

    if let Some(network) = &snapshot.network {
        if let Some(node) = network
            .nodes
            .iter()
            .find(|n| !n.x.is_finite() || !n.y.is_finite())
        {
            return Err(DecodeError::Invalid {
                field: "network.nodes",
                reason: format!("node {} has a non-finite coordinate", node.id),
            });
        }
    }
    if let Some(vehicle) = snapshot
        .vehicles
        .iter()
        .find(|v| !v.coords.x.is_finite() || !v.coords.y.is_finite())
    {
        return Err(DecodeError::Invalid {
            field: "vehicles",
            reason: format!("vehicle {} has a non-finite coordinate", vehicle.id),
        });
    }

    Ok(snapshot)
}
