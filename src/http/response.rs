//! HTTP response building module
//!
//! Builders for JSON responses and the headers every response carries,
//! decoupled from the asset routes.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;

/// Methods advertised in CORS preflight responses
pub const CORS_ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Build JSON response
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|e| {
                log_build_error(status.as_str(), &e);
                Response::new(Full::new(Bytes::new()))
            }),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            let mut response = Response::new(Full::new(Bytes::from_static(
                br#"{"error":"Something went wrong!"}"#,
            )));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
            response
        }
    }
}

/// Build CORS preflight response (OPTIONS)
///
/// Requested headers are echoed back, as a permissive CORS policy does.
pub fn build_options_response(
    enable_cors: bool,
    requested_headers: Option<&HeaderValue>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", CORS_ALLOWED_METHODS)
        .header("Content-Length", "0");

    if enable_cors {
        builder = builder.header("Access-Control-Allow-Methods", CORS_ALLOWED_METHODS);
        if let Some(headers) = requested_headers {
            builder = builder
                .header("Access-Control-Allow-Headers", headers)
                .header("Vary", "Access-Control-Request-Headers");
        }
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Add the headers every response carries
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, http: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&http.server_name) {
        headers.insert(SERVER, server);
    }
    if http.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

/// Drop the body of a response to a HEAD request, keeping its headers
pub fn strip_body(response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "asset-gateway/test".to_string(),
            enable_cors,
            max_body_size: 1024,
        }
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = json_response(StatusCode::CREATED, &serde_json::json!({"assetId": "a1"}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"assetId":"a1"}"#);
    }

    #[test]
    fn test_options_echoes_requested_headers() {
        let requested = HeaderValue::from_static("content-type,x-request-id");
        let response = build_options_response(true, Some(&requested));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            CORS_ALLOWED_METHODS
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Headers"],
            "content-type,x-request-id"
        );
    }

    #[test]
    fn test_options_without_cors() {
        let response = build_options_response(false, None);
        assert!(response
            .headers()
            .get("Access-Control-Allow-Methods")
            .is_none());
    }

    #[test]
    fn test_common_headers() {
        let mut response = json_response(StatusCode::OK, &serde_json::json!({}));
        apply_common_headers(&mut response, &http_config(true));
        assert_eq!(response.headers()[SERVER], "asset-gateway/test");
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        let mut response = json_response(StatusCode::OK, &serde_json::json!({}));
        apply_common_headers(&mut response, &http_config(false));
        assert!(response.headers().get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_strip_body() {
        let response = strip_body(json_response(StatusCode::OK, &serde_json::json!({"a": 1})));
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
