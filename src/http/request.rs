//! Request parsing helpers

use hyper::header::{HeaderMap, CONTENT_TYPE};
use serde::de::DeserializeOwned;

/// Percent-decode a path segment.
///
/// Invalid escapes or non-UTF-8 results fall back to the raw input.
pub fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
}

/// Deserialize a query string into `T`. A missing query reads as empty.
pub fn parse_query<T: DeserializeOwned>(query: Option<&str>) -> Result<T, serde_urlencoded::de::Error> {
    serde_urlencoded::from_str(query.unwrap_or(""))
}

/// Whether the request declares an `application/json` body; media type
/// parameters such as `charset` are ignored.
pub fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Params {
        #[serde(rename = "userRole")]
        user_role: Option<String>,
        all: Option<String>,
    }

    #[test]
    fn test_parse_query() {
        let params: Params = parse_query(Some("userRole=auditor&all=true")).unwrap();
        assert_eq!(params.user_role.as_deref(), Some("auditor"));
        assert_eq!(params.all.as_deref(), Some("true"));
    }

    #[test]
    fn test_parse_query_decodes() {
        let params: Params = parse_query(Some("userRole=org1%2Fadmin+x&all=a%26b&other=1")).unwrap();
        assert_eq!(params.user_role.as_deref(), Some("org1/admin x"));
        assert_eq!(params.all.as_deref(), Some("a&b"));
    }

    #[test]
    fn test_parse_query_empty() {
        let params: Params = parse_query(None).unwrap();
        assert!(params.user_role.is_none());
        let params: Params = parse_query(Some("")).unwrap();
        assert!(params.all.is_none());
    }

    #[test]
    fn test_parse_query_repeated_key() {
        assert!(parse_query::<Params>(Some("userRole=user&userRole=admin")).is_err());
    }

    #[test]
    fn test_is_json_content() {
        let mut headers = HeaderMap::new();
        assert!(!is_json_content(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(is_json_content(&headers));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(is_json_content(&headers));

        for other in ["text/plain", "application/x-www-form-urlencoded", "application/jsonp"] {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(other));
            assert!(!is_json_content(&headers), "{other}");
        }
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("asset%201"), "asset 1");
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("bad%ZZ"), "bad%ZZ");
    }
}
