//! Forwards `/api/*` to the simulation service so the viewer can stay
//! same-origin.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Largest request body accepted for forwarding.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("simulation service unreachable: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("unsupported method {0}")]
    Method(String),
    #[error("request body unreadable: {0}")]
    Body(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "api forward failed");
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, path_and_query: &str) -> String {
        trafficflow_shared::protocol::endpoint_url(&self.base_url, path_and_query)
    }
}

/// Replay the request against the upstream and hand back its status, content
/// type and body unchanged.
pub async fn forward(State(upstream): State<Upstream>, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());
    let url = upstream.url_for(target);

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|_| ProxyError::Method(parts.method.to_string()))?;
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::Body(e.to_string()))?;

    let mut outbound = upstream.client.request(method, &url);
    if let Some(content_type) = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        outbound = outbound.header(reqwest::header::CONTENT_TYPE, content_type);
    }
    if !body.is_empty() {
        outbound = outbound.body(body.to_vec());
    }

    let reply = outbound.send().await?;
    let status = StatusCode::from_u16(reply.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = reply
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| HeaderValue::from_str(v).ok());
    let bytes = reply.bytes().await?;

    tracing::debug!(method = %parts.method, %url, status = status.as_u16(), "api forwarded");

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_keeps_query() {
        let upstream = Upstream::new("http://127.0.0.1:8000/");
        assert_eq!(
            upstream.url_for("/api/state?since=10"),
            "http://127.0.0.1:8000/api/state?since=10"
        );
    }

    #[test]
    fn test_proxy_error_is_bad_gateway() {
        let resp = ProxyError::Method("BREW".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
