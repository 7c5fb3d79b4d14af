use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::api::handlers::{api_error, ApiError, ErrorResponse};

pub const ADMIN_USER_HEADER: &str = "x-admin-user";
pub const ADMIN_ROLE_HEADER: &str = "x-admin-role";

/// Admin roles, weakest first. Each role may do everything the ones before it can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Support,
    Operator,
    Admin,
}

impl AdminRole {
    /// Unknown roles get the least privilege.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => AdminRole::Admin,
            "operator" => AdminRole::Operator,
            _ => AdminRole::Support,
        }
    }
}

/// Operator identity for admin endpoints, taken from request headers set by
/// the admin console's auth proxy:
/// - X-Admin-User: required operator name
/// - X-Admin-Role: optional role, defaults to `support`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUser {
    pub username: String,
    pub role: AdminRole,
}

impl AdminUser {
    /// 403 unless the caller holds at least `role`.
    pub fn require(&self, role: AdminRole) -> Result<(), ApiError> {
        if self.role >= role {
            return Ok(());
        }
        log::warn!(
            "{} ({:?}) denied an action needing {:?}",
            self.username,
            self.role,
            role
        );
        Err(api_error(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "この操作を行う権限がありません",
        ))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        admin_from_headers(&parts.headers).ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("UNAUTHORIZED", "管理者認証が必要です")),
            )
        })
    }
}

pub fn admin_from_headers(headers: &HeaderMap) -> Option<AdminUser> {
    let username = extract_header_value(headers, ADMIN_USER_HEADER)?;
    let role = extract_header_value(headers, ADMIN_ROLE_HEADER)
        .map(|r| AdminRole::parse(&r))
        .unwrap_or(AdminRole::Support);
    Some(AdminUser { username, role })
}

/// Extract a non-empty header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_admin_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ADMIN_USER_HEADER),
            HeaderValue::from_static("operator1"),
        );

        let admin = admin_from_headers(&headers).unwrap();
        assert_eq!(admin.username, "operator1");
        assert_eq!(admin.role, AdminRole::Support);

        headers.insert(
            HeaderName::from_static(ADMIN_ROLE_HEADER),
            HeaderValue::from_static("Operator"),
        );
        assert_eq!(admin_from_headers(&headers).unwrap().role, AdminRole::Operator);

        headers.insert(
            HeaderName::from_static(ADMIN_ROLE_HEADER),
            HeaderValue::from_static("superuser"),
        );
        assert_eq!(admin_from_headers(&headers).unwrap().role, AdminRole::Support);
    }

    #[test]
    fn test_missing_or_blank_header() {
        let mut headers = HeaderMap::new();
        assert!(admin_from_headers(&headers).is_none());

        headers.insert(
            HeaderName::from_static(ADMIN_USER_HEADER),
            HeaderValue::from_static("  "),
        );
        assert!(admin_from_headers(&headers).is_none());
    }

    #[test]
    fn test_role_requirements() {
        let user = |role| AdminUser {
            username: "kato".into(),
            role,
        };
        assert!(user(AdminRole::Support).require(AdminRole::Support).is_ok());
        assert!(user(AdminRole::Admin).require(AdminRole::Operator).is_ok());

        let (status, body) = user(AdminRole::Support)
            .require(AdminRole::Operator)
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error, "FORBIDDEN");
    }
}
