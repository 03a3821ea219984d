// API types module
// Request and response bodies of the asset routes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role assumed when a request names none
pub const DEFAULT_ROLE: &str = "user";

/// POST /assets body
///
/// Fields stay untyped so that validation, not deserialization, decides
/// what counts as missing.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAssetRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// PUT /assets/:id body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub user_role: Option<String>,
}

/// `?userRole=` on read routes
#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    #[serde(default, rename = "userRole")]
    pub user_role: Option<String>,
}

impl RoleQuery {
    /// Requested role; absent or empty falls back to `user`
    pub fn role(&self) -> &str {
        role_or_default(self.user_role.as_deref())
    }
}

/// GET /assets query
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, rename = "userRole")]
    pub user_role: Option<String>,
    /// Only the exact string `true` asks for every asset
    #[serde(default)]
    pub all: Option<String>,
}

impl ListQuery {
    pub fn role(&self) -> &str {
        role_or_default(self.user_role.as_deref())
    }

    pub fn wants_all(&self) -> bool {
        self.all.as_deref() == Some("true")
    }
}

pub fn role_or_default(role: Option<&str>) -> &str {
    role.filter(|r| !r.is_empty()).unwrap_or(DEFAULT_ROLE)
}

/// Acknowledgement of a write
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub message: &'static str,
    pub asset_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub role: String,
    pub permissions: Permissions,
}

/// What a role may do, as advertised to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub create_asset: bool,
    pub view_all_assets: bool,
    pub view_own_assets: bool,
    pub update_own_assets: bool,
    pub delete_asset: bool,
}

impl Permissions {
    pub fn for_role(role: &str) -> Self {
        let admin = role == "admin";
        Self {
            create_asset: admin,
            view_all_assets: admin || role == "auditor",
            view_own_assets: true,
            update_own_assets: true,
            delete_asset: admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admin_permissions() {
        let value = serde_json::to_value(Permissions::for_role("admin")).unwrap();
        assert_eq!(
            value,
            json!({
                "createAsset": true,
                "viewAllAssets": true,
                "viewOwnAssets": true,
                "updateOwnAssets": true,
                "deleteAsset": true
            })
        );
    }

    #[test]
    fn test_user_permissions() {
        let value = serde_json::to_value(Permissions::for_role("user")).unwrap();
        assert_eq!(
            value,
            json!({
                "createAsset": false,
                "viewAllAssets": false,
                "viewOwnAssets": true,
                "updateOwnAssets": true,
                "deleteAsset": false
            })
        );
    }

    #[test]
    fn test_auditor_and_unknown_roles() {
        let auditor = Permissions::for_role("auditor");
        assert!(auditor.view_all_assets);
        assert!(!auditor.create_asset);
        assert!(!auditor.delete_asset);

        // Matching is exact
        let shouting = Permissions::for_role("ADMIN");
        assert_eq!(shouting, Permissions::for_role("user"));
    }

    #[test]
    fn test_update_request_fields() {
        let req: UpdateAssetRequest =
            serde_json::from_value(json!({"value": 7, "userRole": "admin"})).unwrap();
        assert_eq!(req.value, Some(json!(7)));
        assert_eq!(req.user_role.as_deref(), Some("admin"));

        let req: UpdateAssetRequest = serde_json::from_value(json!({"value": null})).unwrap();
        assert!(req.value.is_none());
        assert!(req.user_role.is_none());
    }

    #[test]
    fn test_list_query() {
        let query: ListQuery =
            serde_urlencoded::from_str("userRole=auditor&all=true").unwrap();
        assert_eq!(query.role(), "auditor");
        assert!(query.wants_all());

        let query: ListQuery = serde_urlencoded::from_str("all=1&userRole=").unwrap();
        assert_eq!(query.role(), DEFAULT_ROLE);
        assert!(!query.wants_all());
    }

    #[test]
    fn test_role_query_default() {
        let query: RoleQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.role(), "user");
        let query: RoleQuery = serde_urlencoded::from_str("userRole=admin").unwrap();
        assert_eq!(query.role(), "admin");
    }

    #[test]
    fn test_mutation_response_shape() {
        let body = MutationResponse {
            message: "Asset deleted successfully",
            asset_id: "a1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"message": "Asset deleted successfully", "assetId": "a1"})
        );
    }
}
