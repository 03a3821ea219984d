// API module entry
// Asset registry REST routes over the ledger session pool

mod error;
mod handlers;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{Method, Request, Response};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http::{
    apply_common_headers, build_options_response, is_json_content, parse_query, percent_decode,
    strip_body,
};
use crate::logger::{self, AccessLogEntry};

use error::ApiError;

/// Failure text for bodies over `http.max_body_size`
const ENTITY_TOO_LARGE: &str = "request entity too large";

/// Resolved API route
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    CreateAsset,
    ListAssets,
    GetAsset(String),
    UpdateAsset(String),
    DeleteAsset(String),
    Health,
    UserInfo,
}

impl Route {
    /// Match method and path. HEAD resolves like GET; a single trailing
    /// slash is ignored.
    fn resolve(method: &Method, path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let read = *method == Method::GET || *method == Method::HEAD;

        match path {
            "/assets" if *method == Method::POST => Some(Self::CreateAsset),
            "/assets" if read => Some(Self::ListAssets),
            "/health" if read => Some(Self::Health),
            "/user-info" if read => Some(Self::UserInfo),
            _ => {
                let raw = path.strip_prefix("/assets/")?;
                if raw.is_empty() || raw.contains('/') {
                    return None;
                }
                let id = percent_decode(raw);
                match *method {
                    Method::PUT => Some(Self::UpdateAsset(id)),
                    Method::DELETE => Some(Self::DeleteAsset(id)),
                    _ if read => Some(Self::GetAsset(id)),
                    _ => None,
                }
            }
        }
    }
}

/// API request entry point
///
/// Never fails: every error becomes a JSON response. Also writes the access
/// log line for the request.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::from_request(&req, peer_addr);
    let is_head = req.method() == Method::HEAD;
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = match dispatch(req, &state).await {
        Ok(response) => response,
        Err(err) => {
            if matches!(err, ApiError::Malformed(_)) {
                logger::log_error(&format!("Unhandled request failure: {err}"));
            }
            err.into_response()
        }
    };

    apply_common_headers(&mut response, &state.config.http);
    if is_head {
        response = strip_body(response);
    }

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() == Method::OPTIONS {
        return Ok(build_options_response(
            state.config.http.enable_cors,
            req.headers().get("access-control-request-headers"),
        ));
    }

    let route = Route::resolve(req.method(), req.uri().path()).ok_or(ApiError::EndpointNotFound)?;
    let raw_query = req.uri().query().map(str::to_owned);
    let query = raw_query.as_deref();
    let limit = state.config.http.max_body_size;

    match route {
        Route::CreateAsset => {
            let body = read_json_body(req, limit).await?;
            handlers::create_asset(state, &body).await
        }
        Route::ListAssets => handlers::list_assets(state, &query_params(query)?).await,
        Route::GetAsset(id) => handlers::get_asset(state, &id, &query_params(query)?).await,
        Route::UpdateAsset(id) => {
            let body = read_json_body(req, limit).await?;
            handlers::update_asset(state, &id, &body).await
        }
        Route::DeleteAsset(id) => handlers::delete_asset(state, &id).await,
        Route::Health => Ok(handlers::health()),
        Route::UserInfo => handlers::user_info(state, &query_params(query)?).await,
    }
}

fn query_params<T: DeserializeOwned>(query: Option<&str>) -> Result<T, ApiError> {
    parse_query(query).map_err(|e| ApiError::Malformed(e.to_string()))
}

/// Collect a JSON request body, refusing anything over `limit` bytes.
///
/// Bodies that are not declared `application/json` are left unread and count
/// as empty, so their fields are simply missing.
async fn read_json_body<B>(req: Request<B>, limit: u64) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if !is_json_content(req.headers()) {
        return Ok(Bytes::new());
    }

    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::Malformed(ENTITY_TOO_LARGE.to_string()));
    }

    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::Malformed(ENTITY_TOO_LARGE.to_string()))
        }
        Err(e) => Err(ApiError::Malformed(e.to_string())),
    }
}
