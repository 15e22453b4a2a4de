use crate::{
    db::DbPool,
    entities::{
        estimate::{self, EstimateStatus},
        invoice,
    },
    errors::ServiceError,
    services::{
        invoices::{insert_invoice, InvoiceDraft, DEFAULT_PAYMENT_TERMS_DAYS},
        jobs::{ensure_customer, ensure_job},
        numbering,
        pricing::{self, LineItem},
        search_any, ListParams, Page,
    },
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEstimateRequest {
    pub customer_id: Uuid,
    pub job_id: Option<Uuid>,
    pub line_items: Vec<LineItem>,
    /// Overrides the configured default tax rate
    pub tax_rate: Option<Decimal>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEstimateRequest {
    pub job_id: Option<Uuid>,
    pub line_items: Option<Vec<LineItem>>,
    pub tax_rate: Option<Decimal>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct EstimateService {
    db: Arc<DbPool>,
    default_tax_rate: Decimal,
}

impl EstimateService {
    pub fn new(db: Arc<DbPool>, default_tax_rate: Decimal) -> Self {
        Self {
            db,
            default_tax_rate,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
        customer_id: Option<Uuid>,
    ) -> Result<Page<estimate::Model>, ServiceError> {
        let mut query =
            estimate::Entity::find().filter(estimate::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<EstimateStatus>()? {
            query = query.filter(estimate::Column::Status.eq(status));
        }
        if let Some(customer_id) = customer_id {
            query = query.filter(estimate::Column::CustomerId.eq(customer_id));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[estimate::Column::EstimateNumber, estimate::Column::Notes],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(estimate::Column::CreatedAt)
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
        input: CreateEstimateRequest,
    ) -> Result<estimate::Model, ServiceError> {
        let totals = pricing::compute_totals(
            &input.line_items,
            input.tax_rate.unwrap_or(self.default_tax_rate),
        )?;
        ensure_customer(&self.db, tenant_id, input.customer_id).await?;
        if let Some(job_id) = input.job_id {
            ensure_job(&self.db, tenant_id, job_id, input.customer_id).await?;
        }

        let now = Utc::now();
        let model = estimate::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            customer_id: Set(input.customer_id),
            job_id: Set(input.job_id),
            estimate_number: Set(numbering::document_number(numbering::ESTIMATE_PREFIX, now)),
            status: Set(EstimateStatus::Draft),
            line_items: Set(pricing::to_json(&input.line_items)?),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(totals.tax_rate),
            tax_amount: Set(totals.tax_amount),
            total: Set(totals.total),
            valid_until: Set(input.valid_until),
            notes: Set(input.notes),
            invoice_id: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(estimate_id = %model.id, total = %model.total, "estimate created");
        Ok(model)
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<estimate::Model, ServiceError> {
        estimate::Entity::find_by_id(id)
            .filter(estimate::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Estimate", id))
    }

    async fn get_draft(&self, tenant_id: Uuid, id: Uuid) -> Result<estimate::Model, ServiceError> {
        let estimate = self.get(tenant_id, id).await?;
        if estimate.status != EstimateStatus::Draft {
            return Err(ServiceError::Conflict(format!(
                "estimate {} is {}; only drafts can be changed",
                estimate.estimate_number, estimate.status
            )));
        }
        Ok(estimate)
    }

    /// Updates a draft and recomputes its totals
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateEstimateRequest,
    ) -> Result<estimate::Model, ServiceError> {
        let current = self.get_draft(tenant_id, id).await?;
        if let Some(job_id) = input.job_id {
            ensure_job(&self.db, tenant_id, job_id, current.customer_id).await?;
        }

        let line_items = match input.line_items {
            Some(items) => items,
            None => pricing::from_json::<LineItem>(&current.line_items)?,
        };
        let totals = pricing::compute_totals(
            &line_items,
            input.tax_rate.unwrap_or(current.tax_rate),
        )?;

        let mut model: estimate::ActiveModel = current.into();
        model.line_items = Set(pricing::to_json(&line_items)?);
        model.subtotal = Set(totals.subtotal);
        model.tax_rate = Set(totals.tax_rate);
        model.tax_amount = Set(totals.tax_amount);
        model.total = Set(totals.total);
        if input.job_id.is_some() {
            model.job_id = Set(input.job_id);
        }
        if input.valid_until.is_some() {
            model.valid_until = Set(input.valid_until);
        }
        if input.notes.is_some() {
            model.notes = Set(input.notes);
        }

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let estimate = self.get_draft(tenant_id, id).await?;
        estimate::Entity::delete_by_id(estimate.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Applies one step of the estimate status machine
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        next: EstimateStatus,
    ) -> Result<estimate::Model, ServiceError> {
        let estimate = self.get(tenant_id, id).await?;
        if !estimate.status.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "estimate {} cannot move from {} to {}",
                estimate.estimate_number, estimate.status, next
            )));
        }

        let previous = estimate.status;
        let mut model: estimate::ActiveModel = estimate.into();
        model.status = Set(next);
        let updated = model.update(&*self.db).await?;
        info!(estimate_id = %id, from = %previous, to = %next, "estimate status changed");
        Ok(updated)
    }

    /// Turns an accepted estimate into a draft invoice, at most once
    #[instrument(skip(self))]
    pub async fn convert_to_invoice(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<invoice::Model, ServiceError> {
        // Locked so two concurrent converts cannot both see `invoice_id` unset
        let txn = self.db.begin().await?;
        let estimate = estimate::Entity::find_by_id(id)
            .filter(estimate::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Estimate", id))?;
        if let Some(invoice_id) = estimate.invoice_id {
            return Err(ServiceError::Conflict(format!(
                "estimate {} was already converted to invoice {}",
                estimate.estimate_number, invoice_id
            )));
        }
        if estimate.status != EstimateStatus::Accepted {
            return Err(ServiceError::Conflict(format!(
                "estimate {} is {}; only accepted estimates can be converted",
                estimate.estimate_number, estimate.status
            )));
        }

        let line_items = pricing::from_json::<LineItem>(&estimate.line_items)?;
        let issue_date = Utc::now();
        let draft = InvoiceDraft {
            customer_id: estimate.customer_id,
            job_id: estimate.job_id,
            estimate_id: Some(estimate.id),
            line_items,
            totals: pricing::Totals {
                subtotal: estimate.subtotal,
                tax_rate: estimate.tax_rate,
                tax_amount: estimate.tax_amount,
                total: estimate.total,
            },
            issue_date,
            due_date: issue_date + Duration::days(DEFAULT_PAYMENT_TERMS_DAYS),
            notes: estimate.notes.clone(),
        };

        let invoice = insert_invoice(&txn, tenant_id, draft).await?;
        let mut model: estimate::ActiveModel = estimate.into();
        model.invoice_id = Set(Some(invoice.id));
        model.update(&txn).await?;
        txn.commit().await?;

        info!(estimate_id = %id, invoice_id = %invoice.id, "estimate converted");
        Ok(invoice)
    }
}
