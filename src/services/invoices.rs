use crate::{
    db::DbPool,
    entities::{
        invoice::{self, InvoiceStatus},
        payment,
    },
    errors::ServiceError,
    metrics,
    services::{
        jobs::{ensure_customer, ensure_job},
        numbering,
        pricing::{self, LineItem, Totals},
        search_any, ListParams, Page,
    },
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Days between issue and due date when the caller gives no due date
pub const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub customer_id: Uuid,
    pub job_id: Option<Uuid>,
    pub line_items: Vec<LineItem>,
    /// Overrides the configured default tax rate
    pub tax_rate: Option<Decimal>,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub job_id: Option<Uuid>,
    pub line_items: Option<Vec<LineItem>>,
    pub tax_rate: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
}

/// Everything needed to insert an invoice row
pub(crate) struct InvoiceDraft {
    pub customer_id: Uuid,
    pub job_id: Option<Uuid>,
    pub estimate_id: Option<Uuid>,
    pub line_items: Vec<LineItem>,
    pub totals: Totals,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

pub(crate) async fn insert_invoice<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    draft: InvoiceDraft,
) -> Result<invoice::Model, ServiceError> {
    let now = Utc::now();
    let model = invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        customer_id: Set(draft.customer_id),
        job_id: Set(draft.job_id),
        estimate_id: Set(draft.estimate_id),
        invoice_number: Set(numbering::document_number(numbering::INVOICE_PREFIX, now)),
        status: Set(InvoiceStatus::Draft),
        line_items: Set(pricing::to_json(&draft.line_items)?),
        subtotal: Set(draft.totals.subtotal),
        tax_rate: Set(draft.totals.tax_rate),
        tax_amount: Set(draft.totals.tax_amount),
        total: Set(draft.totals.total),
        amount_paid: Set(Decimal::ZERO),
        issue_date: Set(draft.issue_date),
        due_date: Set(draft.due_date),
        paid_at: Set(None),
        notes: Set(draft.notes),
        created_at: Set(now),
        updated_at: Set(None),
    }
    .insert(db)
    .await?;

    metrics::increment_counter(metrics::INVOICES_CREATED_TOTAL);
    info!(invoice_id = %model.id, invoice_number = %model.invoice_number, "invoice created");
    Ok(model)
}

fn resolve_due_date(
    issue_date: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, ServiceError> {
    let due = due_date.unwrap_or(issue_date + Duration::days(DEFAULT_PAYMENT_TERMS_DAYS));
    if due < issue_date {
        return Err(ServiceError::ValidationError(
            "due_date must not be before issue_date".to_string(),
        ));
    }
    Ok(due)
}

/// Status after a payment brings `amount_paid` to the given value
pub fn status_after_payment(total: Decimal, amount_paid: Decimal) -> InvoiceStatus {
    if amount_paid >= total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    db: Arc<DbPool>,
    default_tax_rate: Decimal,
}

impl InvoiceService {
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
    ) -> Result<Page<invoice::Model>, ServiceError> {
        let mut query =
            invoice::Entity::find().filter(invoice::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<InvoiceStatus>()? {
            query = query.filter(invoice::Column::Status.eq(status));
        }
        if let Some(customer_id) = customer_id {
            query = query.filter(invoice::Column::CustomerId.eq(customer_id));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[invoice::Column::InvoiceNumber, invoice::Column::Notes],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(invoice::Column::CreatedAt)
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
        input: CreateInvoiceRequest,
    ) -> Result<invoice::Model, ServiceError> {
        let totals = pricing::compute_totals(
            &input.line_items,
            input.tax_rate.unwrap_or(self.default_tax_rate),
        )?;
        ensure_customer(&self.db, tenant_id, input.customer_id).await?;
        if let Some(job_id) = input.job_id {
            ensure_job(&self.db, tenant_id, job_id, input.customer_id).await?;
        }

        let issue_date = input.issue_date.unwrap_or_else(Utc::now);
        let due_date = resolve_due_date(issue_date, input.due_date)?;

        insert_invoice(
            &*self.db,
            tenant_id,
            InvoiceDraft {
                customer_id: input.customer_id,
                job_id: input.job_id,
                estimate_id: None,
                line_items: input.line_items,
                totals,
                issue_date,
                due_date,
                notes: input.notes,
            },
        )
        .await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<invoice::Model, ServiceError> {
        invoice::Entity::find_by_id(id)
            .filter(invoice::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))
    }

    async fn get_draft(&self, tenant_id: Uuid, id: Uuid) -> Result<invoice::Model, ServiceError> {
        let invoice = self.get(tenant_id, id).await?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(ServiceError::Conflict(format!(
                "invoice {} is {}; only draft invoices can be changed",
                invoice.invoice_number, invoice.status
            )));
        }
        Ok(invoice)
    }

    /// Updates a draft invoice and recomputes its totals
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateInvoiceRequest,
    ) -> Result<invoice::Model, ServiceError> {
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
        let due_date = resolve_due_date(current.issue_date, input.due_date.or(Some(current.due_date)))?;

        let mut model: invoice::ActiveModel = current.into();
        model.line_items = Set(pricing::to_json(&line_items)?);
        model.subtotal = Set(totals.subtotal);
        model.tax_rate = Set(totals.tax_rate);
        model.tax_amount = Set(totals.tax_amount);
        model.total = Set(totals.total);
        model.due_date = Set(due_date);
        if input.job_id.is_some() {
            model.job_id = Set(input.job_id);
        }
        if input.notes.is_some() {
            model.notes = Set(input.notes);
        }

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let invoice = self.get_draft(tenant_id, id).await?;
        invoice::Entity::delete_by_id(invoice.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn send(&self, tenant_id: Uuid, id: Uuid) -> Result<invoice::Model, ServiceError> {
        let invoice = self.get(tenant_id, id).await?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(ServiceError::Conflict(format!(
                "invoice {} is {}; only draft invoices can be sent",
                invoice.invoice_number, invoice.status
            )));
        }

        let mut model: invoice::ActiveModel = invoice.into();
        model.status = Set(InvoiceStatus::Sent);
        Ok(model.update(&*self.db).await?)
    }

    /// Records a payment and moves the invoice to partially paid or paid
    #[instrument(skip(self, input), fields(amount = %input.amount))]
    pub async fn record_payment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: RecordPaymentRequest,
    ) -> Result<invoice::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "payment amount must be greater than zero".to_string(),
            ));
        }

        // Row lock serialises concurrent payments against the balance check
        let txn = self.db.begin().await?;
        let invoice = invoice::Entity::find_by_id(id)
            .filter(invoice::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;

        if !invoice.status.accepts_payments() {
            return Err(ServiceError::Conflict(format!(
                "invoice {} is {} and cannot take payments",
                invoice.invoice_number, invoice.status
            )));
        }
        let balance = invoice.balance();
        if input.amount > balance {
            return Err(ServiceError::ValidationError(format!(
                "payment {} exceeds outstanding balance {}",
                input.amount, balance
            )));
        }

        let now = Utc::now();
        payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            invoice_id: Set(invoice.id),
            amount: Set(input.amount),
            method: Set(input.method),
            reference: Set(input.reference),
            received_at: Set(input.received_at.unwrap_or(now)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let amount_paid = invoice
            .amount_paid
            .checked_add(input.amount)
            .ok_or_else(|| ServiceError::ValidationError("payment amount out of range".to_string()))?;
        let status = status_after_payment(invoice.total, amount_paid);
        let invoice_number = invoice.invoice_number.clone();

        let mut model: invoice::ActiveModel = invoice.into();
        model.amount_paid = Set(amount_paid);
        model.status = Set(status);
        if status == InvoiceStatus::Paid {
            model.paid_at = Set(Some(now));
        }
        let updated = model.update(&txn).await?;
        txn.commit().await?;

        metrics::increment_counter(metrics::PAYMENTS_RECORDED_TOTAL);
        info!(%invoice_number, %status, "payment recorded");
        Ok(updated)
    }

    pub async fn list_payments(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<payment::Model>, ServiceError> {
        self.get(tenant_id, id).await?;
        Ok(payment::Entity::find()
            .filter(payment::Column::TenantId.eq(tenant_id))
            .filter(payment::Column::InvoiceId.eq(id))
            .order_by_asc(payment::Column::ReceivedAt)
            .all(&*self.db)
            .await?)
    }

    /// Voids an invoice that has not received any payment
    #[instrument(skip(self))]
    pub async fn void(&self, tenant_id: Uuid, id: Uuid) -> Result<invoice::Model, ServiceError> {
        let invoice = self.get(tenant_id, id).await?;
        if invoice.status == InvoiceStatus::Void {
            return Err(ServiceError::Conflict(format!(
                "invoice {} is already void",
                invoice.invoice_number
            )));
        }
        if invoice.amount_paid > Decimal::ZERO {
            return Err(ServiceError::Conflict(format!(
                "invoice {} has recorded payments and cannot be voided",
                invoice.invoice_number
            )));
        }

        let mut model: invoice::ActiveModel = invoice.into();
        model.status = Set(InvoiceStatus::Void);
        Ok(model.update(&*self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn due_date_defaults_to_thirty_days() {
        let issue = Utc::now();
        assert_eq!(
            resolve_due_date(issue, None).unwrap(),
            issue + Duration::days(30)
        );
        assert!(resolve_due_date(issue, Some(issue - Duration::days(1))).is_err());
    }

    #[test]
    fn payment_status_depends_on_balance() {
        assert_eq!(
            status_after_payment(dec!(100), dec!(40)),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!(status_after_payment(dec!(100), dec!(100)), InvoiceStatus::Paid);
    }
}
