use crate::{
    config::AppConfig,
    errors::ServiceError,
    services::{ListParams, Page},
    ApiResponse, PaginatedResponse,
};
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

/// Pages past this are rejected instead of producing absurd offsets
pub const MAX_PAGE: u64 = 1_000_000;

/// Query string accepted by every list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page, clamped to the configured maximum
    pub limit: Option<u64>,
    /// Case-insensitive substring search
    pub search: Option<String>,
    /// Status filter, snake_case
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

impl ListQuery {
    pub fn to_params(&self, config: &AppConfig) -> Result<ListParams, ServiceError> {
        if self.page.is_some_and(|page| page > MAX_PAGE) {
            return Err(ServiceError::ValidationError(format!(
                "page must be at most {}",
                MAX_PAGE
            )));
        }
        let mut params = ListParams::new(self.page, config.page_limit(self.limit));
        params.search = self.search.clone();
        params.status = self.status.clone();
        Ok(params)
    }
}

pub fn paginated<T>(page: Page<T>, params: &ListParams) -> PaginatedResponse<T> {
    PaginatedResponse::new(page.items, page.total, params.page, params.limit)
}

/// 201 with the standard envelope
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_by_config() {
        let config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        let query = ListQuery {
            page: Some(2),
            limit: Some(10_000),
            ..Default::default()
        };
        let params = query.to_params(&config).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.limit, config.api_max_page_size);

        let defaults = ListQuery::default().to_params(&config).unwrap();
        assert_eq!(defaults.page, 1);
        assert_eq!(defaults.limit, config.api_default_page_size);
    }

    #[test]
    fn huge_page_is_rejected() {
        let config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        let query = ListQuery {
            page: Some(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            query.to_params(&config),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
