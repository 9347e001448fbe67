use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::Instrument;

use shopdesk_auth::{AuthzError, JwtValidator, Principal};

use crate::app::errors::ApiError;
use crate::context::{CORRELATION_HEADER, CorrelationId};
use crate::envelope::FailureEnvelope;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub session_cookie: Arc<str>,
}

/// Resolve the request's [`Principal`] from a bearer token or session cookie.
///
/// Any failure short-circuits with 401 before routing reaches a handler.
pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    let Some(token) = extract_bearer(req.headers()).or_else(|| extract_cookie(req.headers(), &state.session_cookie))
    else {
        tracing::debug!("no_credential");
        return ApiError::from(AuthzError::Unauthenticated).into_response();
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "credential_rejected");
            return ApiError::from(AuthzError::Unauthenticated).into_response();
        }
    };

    let principal = Principal::from_claims(&claims);
    tracing::Span::current().record("principal_id", tracing::field::display(principal.id()));
    req.extensions_mut().insert(principal);

    next.run(req).await
}

/// Outermost layer: assigns the correlation id, opens the request span and
/// stamps the id onto the response and any failure envelope.
pub async fn correlation_middleware(mut req: Request, next: Next) -> Response {
    let correlation = req
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(CorrelationId::from_header)
        .unwrap_or_else(CorrelationId::generate);
    req.extensions_mut().insert(correlation.clone());

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation,
        method = %req.method(),
        path = %req.uri().path(),
        principal_id = tracing::field::Empty,
    );

    let mut res = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| tracing::info!(status = res.status().as_u16(), "request_completed"));

    // Router-level 405s come back without an envelope.
    let envelope = match res.extensions_mut().remove::<FailureEnvelope>() {
        Some(envelope) => Some(envelope),
        None if res.status() == StatusCode::METHOD_NOT_ALLOWED => {
            let err = ApiError::MethodNotAllowed;
            Some(FailureEnvelope::new(err.code(), err.to_string()))
        }
        None => None,
    };
    if let Some(envelope) = envelope {
        res = rerender_failure(res, envelope.with_correlation(correlation.as_str()));
    }
    if let Ok(value) = HeaderValue::from_str(correlation.as_str()) {
        res.headers_mut().insert(CORRELATION_HEADER, value);
    }
    res
}

fn rerender_failure(res: Response, envelope: FailureEnvelope) -> Response {
    let (mut parts, _) = res.into_parts();
    match serde_json::to_vec(&envelope) {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(error = %e, "failure_envelope_serialization");
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}
