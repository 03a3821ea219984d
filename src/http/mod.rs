//! HTTP protocol helpers
//!
//! Response builders and request-side parsing shared by the API routes.

pub mod request;
pub mod response;

pub use request::{is_json_content, parse_query, percent_decode};
pub use response::{apply_common_headers, build_options_response, json_response, strip_body};
