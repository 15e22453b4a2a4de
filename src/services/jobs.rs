use crate::{
    db::DbPool,
    entities::{
        customer,
        job::{self, JobStatus},
    },
    errors::ServiceError,
    services::{numbering, search_any, validate_not_blank, ListParams, Page},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub roof_type: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub roof_squares: Option<Decimal>,
    pub scheduled_start: Option<DateTime<Utc>>,
    #[validate(custom = "validate_non_negative")]
    pub estimated_revenue: Option<Decimal>,
}

/// Partial update of everything except the status
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub roof_type: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub roof_squares: Option<Decimal>,
    pub scheduled_start: Option<DateTime<Utc>>,
    #[validate(custom = "validate_non_negative")]
    pub estimated_revenue: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
}

#[derive(Clone)]
pub struct JobService {
    db: Arc<DbPool>,
}

impl JobService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
        customer_id: Option<Uuid>,
    ) -> Result<Page<job::Model>, ServiceError> {
        let mut query = job::Entity::find().filter(job::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<JobStatus>()? {
            query = query.filter(job::Column::Status.eq(status));
        }
        if let Some(customer_id) = customer_id {
            query = query.filter(job::Column::CustomerId.eq(customer_id));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[
                    job::Column::Title,
                    job::Column::JobNumber,
                    job::Column::Address,
                    job::Column::RoofType,
                ],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(job::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }

    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateJobRequest,
    ) -> Result<job::Model, ServiceError> {
        input.validate()?;
        ensure_customer(&self.db, tenant_id, input.customer_id).await?;

        let now = Utc::now();
        let model = job::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            customer_id: Set(input.customer_id),
            job_number: Set(numbering::document_number(numbering::JOB_PREFIX, now)),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            address: Set(input.address),
            roof_type: Set(input.roof_type),
            roof_squares: Set(input.roof_squares),
            status: Set(JobStatus::Pending),
            scheduled_start: Set(input.scheduled_start),
            completed_at: Set(None),
            estimated_revenue: Set(input.estimated_revenue.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(job_id = %model.id, job_number = %model.job_number, "job created");
        Ok(model)
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<job::Model, ServiceError> {
        job::Entity::find_by_id(id)
            .filter(job::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job", id))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateJobRequest,
    ) -> Result<job::Model, ServiceError> {
        input.validate()?;
        let mut model: job::ActiveModel = self.get(tenant_id, id).await?.into();

        if let Some(title) = input.title {
            model.title = Set(title.trim().to_string());
        }
        if input.description.is_some() {
            model.description = Set(input.description);
        }
        if input.address.is_some() {
            model.address = Set(input.address);
        }
        if input.roof_type.is_some() {
            model.roof_type = Set(input.roof_type);
        }
        if input.roof_squares.is_some() {
            model.roof_squares = Set(input.roof_squares);
        }
        if input.scheduled_start.is_some() {
            model.scheduled_start = Set(input.scheduled_start);
        }
        if let Some(revenue) = input.estimated_revenue {
            model.estimated_revenue = Set(revenue);
        }

        Ok(model.update(&*self.db).await?)
    }

    /// Moves a job through its status machine
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        next: JobStatus,
    ) -> Result<job::Model, ServiceError> {
        let current = self.get(tenant_id, id).await?;
        if !current.status.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "job {} cannot move from {} to {}",
                current.job_number, current.status, next
            )));
        }

        let previous = current.status;
        let mut model: job::ActiveModel = current.into();
        model.status = Set(next);
        if next == JobStatus::Completed {
            model.completed_at = Set(Some(Utc::now()));
        }

        let updated = model.update(&*self.db).await?;
        info!(job_id = %id, from = %previous, to = %next, "job status changed");
        Ok(updated)
    }

    /// Only pending or cancelled jobs can be deleted
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let job = self.get(tenant_id, id).await?;
        if !job.status.is_deletable() {
            return Err(ServiceError::Conflict(format!(
                "job {} is {} and cannot be deleted",
                job.job_number, job.status
            )));
        }

        job::Entity::delete_by_id(job.id).exec(&*self.db).await?;
        Ok(())
    }
}

/// Fails with 400 when the customer does not exist for this tenant
pub(crate) async fn ensure_customer(
    db: &DbPool,
    tenant_id: Uuid,
    customer_id: Uuid,
) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(customer_id)
        .filter(customer::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::BadRequest(format!("customer {} does not exist", customer_id)))
}

/// Fails with 400 unless the job exists for this tenant and belongs to
/// `customer_id`
pub(crate) async fn ensure_job(
    db: &DbPool,
    tenant_id: Uuid,
    job_id: Uuid,
    customer_id: Uuid,
) -> Result<job::Model, ServiceError> {
    let job = job::Entity::find_by_id(job_id)
        .filter(job::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::BadRequest(format!("job {} does not exist", job_id)))?;
    if job.customer_id != customer_id {
        return Err(ServiceError::BadRequest(format!(
            "job {} belongs to a different customer",
            job.job_number
        )));
    }
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_amounts_fail_validation() {
        let mut input = CreateJobRequest {
            customer_id: Uuid::new_v4(),
            title: "Tear-off and re-roof".into(),
            description: None,
            address: None,
            roof_type: Some("asphalt".into()),
            roof_squares: Some(dec!(24.5)),
            scheduled_start: None,
            estimated_revenue: Some(dec!(18500)),
        };
        assert!(input.validate().is_ok());

        input.roof_squares = Some(dec!(-1));
        assert!(input.validate().is_err());
    }
}
