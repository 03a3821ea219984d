// Asset route handlers
// Validate, open a session for the role, run one contract operation, map the result

use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

use super::error::ApiError;
use super::types::{
    role_or_default, CreateAssetRequest, HealthResponse, ListQuery, MutationResponse, Permissions,
    RoleQuery, UpdateAssetRequest, UserInfoResponse,
};
use crate::config::AppState;
use crate::http::json_response;
use crate::ledger::{LedgerError, Operation};
use crate::logger;

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

const SERVICE_NAME: &str = "Hyperledger Fabric Asset Transfer API";

/// POST /assets
pub async fn create_asset(state: &AppState, body: &[u8]) -> HandlerResult {
    let req: CreateAssetRequest = parse_body(body)?;

    let (Some(id), Some(owner), Some(value)) = (
        req.id.filter(is_truthy),
        req.owner.filter(is_truthy),
        req.value,
    ) else {
        return Err(ApiError::Validation(
            "Missing required fields: id, owner, value".to_string(),
        ));
    };

    let asset_id = to_arg(&id);
    let args = [asset_id.clone(), to_arg(&owner), to_arg(&value)];
    invoke(state, "admin", Operation::CreateAsset, &args, "Failed to create asset").await?;

    Ok(json_response(
        StatusCode::CREATED,
        &MutationResponse {
            message: "Asset created successfully",
            asset_id,
        },
    ))
}

/// GET /assets/:id
pub async fn get_asset(state: &AppState, id: &str, query: &RoleQuery) -> HandlerResult {
    const CONTEXT: &str = "Failed to retrieve asset";

    let role = query.role();
    let payload = invoke(state, role, Operation::ReadAsset, &[id.to_string()], CONTEXT).await?;
    let asset = parse_payload(CONTEXT, &payload)?;
    Ok(json_response(StatusCode::OK, &asset))
}

/// GET /assets
pub async fn list_assets(state: &AppState, query: &ListQuery) -> HandlerResult {
    const CONTEXT: &str = "Failed to retrieve assets";

    let role = query.role();
    let operation = select_list_operation(role, query.wants_all());

    let payload = invoke(state, role, operation, &[], CONTEXT).await?;
    let assets = parse_payload(CONTEXT, &payload)?;
    Ok(json_response(StatusCode::OK, &assets))
}

/// PUT /assets/:id
pub async fn update_asset(state: &AppState, id: &str, body: &[u8]) -> HandlerResult {
    let req: UpdateAssetRequest = parse_body(body)?;
    let Some(value) = req.value else {
        return Err(ApiError::Validation(
            "Missing required field: value".to_string(),
        ));
    };
    let role = role_or_default(req.user_role.as_deref());

    let args = [id.to_string(), to_arg(&value)];
    invoke(state, role, Operation::UpdateAsset, &args, "Failed to update asset").await?;

    Ok(json_response(
        StatusCode::OK,
        &MutationResponse {
            message: "Asset updated successfully",
            asset_id: id.to_string(),
        },
    ))
}

/// DELETE /assets/:id
pub async fn delete_asset(state: &AppState, id: &str) -> HandlerResult {
    invoke(
        state,
        "admin",
        Operation::DeleteAsset,
        &[id.to_string()],
        "Failed to delete asset",
    )
    .await?;

    Ok(json_response(
        StatusCode::OK,
        &MutationResponse {
            message: "Asset deleted successfully",
            asset_id: id.to_string(),
        },
    ))
}

/// GET /health
pub fn health() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            service: SERVICE_NAME,
        },
    )
}

/// GET /user-info
///
/// Opening a session proves the role has a usable identity; nothing is
/// invoked on it.
pub async fn user_info(state: &AppState, query: &RoleQuery) -> HandlerResult {
    let role = query.role();
    let session = state
        .sessions
        .acquire(role)
        .await
        .map_err(|e| ledger_failure("Failed to get user info", e))?;
    drop(session);

    Ok(json_response(
        StatusCode::OK,
        &UserInfoResponse {
            role: role.to_string(),
            permissions: Permissions::for_role(role),
        },
    ))
}

/// Only auditors and admins may list every asset; everyone else gets their own
pub fn select_list_operation(role: &str, all: bool) -> Operation {
    if all && (role == "auditor" || role == "admin") {
        Operation::GetAllAssets
    } else {
        Operation::GetMyAssets
    }
}

/// Run one operation on a session scoped to this call
async fn invoke(
    state: &AppState,
    role: &str,
    operation: Operation,
    args: &[String],
    context: &'static str,
) -> Result<Vec<u8>, ApiError> {
    let started = Instant::now();
    let mut session = state
        .sessions
        .acquire(role)
        .await
        .map_err(|e| ledger_failure(context, e))?;
    let result = session.invoke(operation, args).await;
    drop(session);

    match result {
        Ok(payload) => {
            logger::log_ledger_call(role, operation.name(), started.elapsed());
            Ok(payload)
        }
        Err(e) => Err(ledger_failure(context, e)),
    }
}

fn ledger_failure(context: &'static str, err: LedgerError) -> ApiError {
    logger::log_ledger_failure(context, &err);
    ApiError::ledger(context, err)
}

/// Decode a JSON body.
///
/// An empty body or an array reads as `{}`, so every field is missing.
/// Anything other than an object or array is refused.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    match value {
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
        }
        Value::Array(_) => Ok(T::default()),
        other => Err(ApiError::Malformed(format!(
            "JSON body must be an object or array, got {other}"
        ))),
    }
}

fn parse_payload(context: &'static str, payload: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(payload).map_err(|e| {
        logger::log_ledger_failure(context, &e);
        ApiError::Payload {
            context,
            message: e.to_string(),
        }
    })
}

/// Presence test for required identifiers: null, false, 0 and "" are missing
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value as a contract argument
fn to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), number_text),
        other => other.to_string(),
    }
}

/// Shortest round-trip decimal text of a number in the notation JavaScript's
/// `Number#toString` uses: plain digits for magnitudes in `[1e-6, 1e21)`,
/// otherwise `d.ddde+N` / `d.ddde-N`.
fn number_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i64>() else {
        return sci;
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    // Position of the decimal point relative to the first digit
    let n = exp + 1;
    let zeros = |count: i64| "0".repeat(usize::try_from(count).unwrap_or(0));

    let text = if k <= n && n <= 21 {
        format!("{digits}{}", zeros(n - k))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(n).unwrap_or(0));
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", zeros(-n))
    } else {
        let (first, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let sign = if exp >= 0 { '+' } else { '-' };
        format!("{first}{frac}e{sign}{}", exp.abs())
    };

    if f < 0.0 {
        format!("-{text}")
    } else {
        text
    }
}
