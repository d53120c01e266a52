//! Custom Axum extractors: the request's IRI base and lenient JSON bodies.

use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderName},
};
use elucidate::RequestContext;
use serde::de::DeserializeOwned;

use crate::{config::NodeConfig, error::AppError, handlers::AppState};

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

// ---------------------------------------------------------------------------
// RequestHost extractor
// ---------------------------------------------------------------------------

/// Axum extractor yielding the scheme and host that IRIs are minted against.
///
/// Never rejects: when nothing in the request names a host, the bind address
/// is used.
pub struct RequestHost(pub RequestContext);

impl<S> FromRequestParts<S> for RequestHost
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = AppState::from_ref(state);
        let ctx = request_context(parts, &app_state.config);
        async move { Ok(RequestHost(ctx)) }
    }
}

/// Resolve scheme and host for a request.
///
/// Scheme: `X-Forwarded-Proto` (trusted proxy only), else the configured
/// scheme. Host: `X-Forwarded-Host` (trusted proxy only), else `Host`, else
/// the URI authority, else the bind address.
pub fn request_context(parts: &Parts, config: &NodeConfig) -> RequestContext {
    let forwarded = |name: &HeaderName| {
        if config.trust_proxy {
            first_value(parts, name)
        } else {
            None
        }
    };

    let scheme = forwarded(&X_FORWARDED_PROTO).unwrap_or_else(|| config.scheme.clone());
    let host = forwarded(&X_FORWARDED_HOST)
        .or_else(|| first_value(parts, &header::HOST))
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| config.bind_addr.to_string());

    RequestContext::new(scheme, host)
}

/// First comma-separated element of a header, trimmed; `None` if absent or empty.
fn first_value(parts: &Parts, name: &HeaderName) -> Option<String> {
    let value = parts.headers.get(name)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

// ---------------------------------------------------------------------------
// JsonBody extractor
// ---------------------------------------------------------------------------

/// JSON request body that tolerates a missing body and any content type.
///
/// An empty (or all-whitespace) body deserialises as `{}`. A body that is
/// not valid JSON, or does not fit `T`, is rejected with 400.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("unreadable body: {e}")))?;
            parse_body(&bytes).map(JsonBody)
        }
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))
}
