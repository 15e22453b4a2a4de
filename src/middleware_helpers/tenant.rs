use crate::{errors::ServiceError, AppState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant owning the current request.
///
/// Taken from `x-tenant-id`, falling back to the configured
/// `default_tenant_id`. Requests with neither are rejected with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
}

pub fn resolve_tenant(
    header: Option<&str>,
    default_tenant: Option<Uuid>,
) -> Result<TenantContext, ServiceError> {
    match header.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => Uuid::parse_str(raw)
            .map(|tenant_id| TenantContext { tenant_id })
            .map_err(|_| {
                ServiceError::BadRequest(format!("{} must be a UUID, got '{}'", TENANT_HEADER, raw))
            }),
        None => default_tenant
            .map(|tenant_id| TenantContext { tenant_id })
            .ok_or_else(|| ServiceError::BadRequest(format!("missing {} header", TENANT_HEADER))),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(TENANT_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ServiceError::BadRequest(format!("{} is not valid ASCII", TENANT_HEADER))
            })?),
            None => None,
        };
        resolve_tenant(header, state.config.default_tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn header_wins_over_default() {
        let tenant = Uuid::new_v4();
        let fallback = Uuid::new_v4();
        let ctx = resolve_tenant(Some(&tenant.to_string()), Some(fallback)).unwrap();
        assert_eq!(ctx.tenant_id, tenant);
    }

    #[test]
    fn default_is_used_when_header_missing_or_blank() {
        let fallback = Uuid::new_v4();
        assert_eq!(resolve_tenant(None, Some(fallback)).unwrap().tenant_id, fallback);
        assert_eq!(resolve_tenant(Some("  "), Some(fallback)).unwrap().tenant_id, fallback);
    }

    #[test]
    fn missing_or_malformed_tenant_is_a_bad_request() {
        assert_matches!(resolve_tenant(None, None), Err(ServiceError::BadRequest(_)));
        assert_matches!(
            resolve_tenant(Some("acme"), Some(Uuid::new_v4())),
            Err(ServiceError::BadRequest(_))
        );
    }
}
