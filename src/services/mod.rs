//! Tenant-scoped business logic. Handlers stay thin and call into these.

pub mod customers;
pub mod estimates;
pub mod inventory;
pub mod invoices;
pub mod jobs;
pub mod numbering;
pub mod pricing;
pub mod purchase_orders;
pub mod revenue;
pub mod vendors;

use crate::errors::ServiceError;
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ColumnTrait, Condition,
};
use std::str::FromStr;
use validator::ValidationError;

/// Rejects strings that are empty once trimmed
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Normalised list request shared by every collection endpoint
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    pub fn new(page: Option<u64>, limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.max(1),
            search: None,
            status: None,
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Non-empty search term, trimmed
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Parses the status filter into the entity's status enum
    pub fn status_filter<S: FromStr>(&self) -> Result<Option<S>, ServiceError> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<S>()
                .map(Some)
                .map_err(|_| ServiceError::InvalidStatus(format!("unknown status '{}'", raw))),
        }
    }
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Case-insensitive substring match on a column
pub(crate) fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(format!("%{}%", needle.to_lowercase()))
}

/// `OR` of [`contains_ci`] across several columns
pub(crate) fn search_any<C: ColumnTrait>(columns: &[C], needle: &str) -> Condition {
    columns
        .iter()
        .fold(Condition::any(), |cond, column| {
            cond.add(contains_ci(*column, needle))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::job::JobStatus;

    #[test]
    fn offset_follows_page() {
        let params = ListParams::new(Some(3), 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(ListParams::new(Some(0), 20).page, 1);
        assert_eq!(ListParams::new(None, 20).offset(), 0);
        assert_eq!(ListParams::new(Some(u64::MAX), 100).offset(), u64::MAX);
    }

    #[test]
    fn status_filter_parses_or_rejects() {
        let mut params = ListParams::new(None, 10);
        assert_eq!(params.status_filter::<JobStatus>().unwrap(), None);

        params.status = Some("scheduled".into());
        assert_eq!(
            params.status_filter::<JobStatus>().unwrap(),
            Some(JobStatus::Scheduled)
        );

        params.status = Some("bogus".into());
        assert!(matches!(
            params.status_filter::<JobStatus>(),
            Err(ServiceError::InvalidStatus(_))
        ));
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(validate_not_blank("  \t ").is_err());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" GAF-HDZ ").is_ok());
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut params = ListParams::new(None, 10);
        params.search = Some("   ".into());
        assert_eq!(params.search_term(), None);
        params.search = Some(" Smith ".into());
        assert_eq!(params.search_term(), Some("Smith"));
    }
}
