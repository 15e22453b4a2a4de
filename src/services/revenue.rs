//! Revenue metrics. [`compute_metrics`] is pure so the arithmetic can be
//! tested without a database; [`RevenueService`] only loads rows.

use crate::{
    db::DbPool,
    entities::{
        invoice::{self, InvoiceStatus},
        job::{self, JobStatus},
    },
    errors::ServiceError,
    services::pricing::round2,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    /// Calendar month of the issue date, `YYYY-MM`
    pub month: String,
    pub billed: Decimal,
    pub collected: Decimal,
    pub invoice_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RevenueMetrics {
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub outstanding: Decimal,
    pub overdue_amount: Decimal,
    pub overdue_count: u64,
    pub billed_invoice_count: u64,
    pub paid_invoice_count: u64,
    pub open_invoice_count: u64,
    pub average_invoice_value: Decimal,
    /// Percent of billed revenue collected
    pub collection_rate: Decimal,
    pub pipeline_value: Decimal,
    pub completed_jobs: u64,
    pub monthly: Vec<MonthlyRevenue>,
}

pub fn compute_metrics(
    invoices: &[invoice::Model],
    jobs: &[job::Model],
    now: DateTime<Utc>,
) -> RevenueMetrics {
    let mut total_billed = Decimal::ZERO;
    let mut total_collected = Decimal::ZERO;
    let mut overdue_amount = Decimal::ZERO;
    let mut overdue_count = 0u64;
    let mut billed_invoice_count = 0u64;
    let mut paid_invoice_count = 0u64;
    let mut open_invoice_count = 0u64;
    let mut monthly: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();

    for invoice in invoices.iter().filter(|inv| inv.status.is_billed()) {
        billed_invoice_count += 1;
        total_billed += invoice.total;
        total_collected += invoice.amount_paid;

        let balance = invoice.balance();
        if invoice.status == InvoiceStatus::Paid {
            paid_invoice_count += 1;
        }
        if balance > Decimal::ZERO {
            open_invoice_count += 1;
            if invoice.due_date < now {
                overdue_count += 1;
                overdue_amount += balance;
            }
        }

        let month = invoice.issue_date.format("%Y-%m").to_string();
        let entry = monthly.entry(month.clone()).or_insert(MonthlyRevenue {
            month,
            billed: Decimal::ZERO,
            collected: Decimal::ZERO,
            invoice_count: 0,
        });
        entry.billed += invoice.total;
        entry.collected += invoice.amount_paid;
        entry.invoice_count += 1;
    }

    let average_invoice_value = if billed_invoice_count == 0 {
        Decimal::ZERO
    } else {
        round2(total_billed / Decimal::from(billed_invoice_count))
    };
    let collection_rate = if total_billed.is_zero() {
        Decimal::ZERO
    } else {
        round2(total_collected / total_billed * Decimal::ONE_HUNDRED)
    };

    let pipeline_value = jobs
        .iter()
        .filter(|job| !job.status.is_terminal())
        .map(|job| job.estimated_revenue)
        .sum();
    let completed_jobs = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Completed)
        .count() as u64;

    RevenueMetrics {
        total_billed,
        total_collected,
        outstanding: total_billed - total_collected,
        overdue_amount,
        overdue_count,
        billed_invoice_count,
        paid_invoice_count,
        open_invoice_count,
        average_invoice_value,
        collection_rate,
        pipeline_value,
        completed_jobs,
        monthly: monthly.into_values().collect(),
    }
}

#[derive(Clone)]
pub struct RevenueService {
    db: Arc<DbPool>,
}

impl RevenueService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Loads the tenant's invoices (optionally bounded by issue date) and jobs
    pub async fn metrics(
        &self,
        tenant_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<RevenueMetrics, ServiceError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ServiceError::BadRequest(
                    "'from' must not be after 'to'".to_string(),
                ));
            }
        }

        let mut query = invoice::Entity::find().filter(invoice::Column::TenantId.eq(tenant_id));
        if let Some(from) = from {
            query = query.filter(invoice::Column::IssueDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(invoice::Column::IssueDate.lte(to));
        }
        let invoices = query.all(&*self.db).await?;

        let jobs = job::Entity::find()
            .filter(job::Column::TenantId.eq(tenant_id))
            .all(&*self.db)
            .await?;

        Ok(compute_metrics(&invoices, &jobs, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn invoice(
        status: InvoiceStatus,
        total: Decimal,
        paid: Decimal,
        issue: DateTime<Utc>,
        due: DateTime<Utc>,
    ) -> invoice::Model {
        invoice::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            customer_id: Uuid::nil(),
            job_id: None,
            estimate_id: None,
            invoice_number: "INV-20240101-ABCDEF".into(),
            status,
            line_items: serde_json::json!([]),
            subtotal: total,
            tax_rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total,
            amount_paid: paid,
            issue_date: issue,
            due_date: due,
            paid_at: None,
            notes: None,
            created_at: issue,
            updated_at: None,
        }
    }

    fn job(status: JobStatus, revenue: Decimal) -> job::Model {
        job::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            customer_id: Uuid::nil(),
            job_number: "JOB-20240101-ABCDEF".into(),
            title: "Re-roof".into(),
            description: None,
            address: None,
            roof_type: None,
            roof_squares: None,
            status,
            scheduled_start: None,
            completed_at: None,
            estimated_revenue: revenue,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_tenant_has_zeroed_metrics() {
        let metrics = compute_metrics(&[], &[], Utc::now());
        assert_eq!(metrics.total_billed, Decimal::ZERO);
        assert_eq!(metrics.average_invoice_value, Decimal::ZERO);
        assert_eq!(metrics.collection_rate, Decimal::ZERO);
        assert!(metrics.monthly.is_empty());
    }

    #[test]
    fn metrics_cover_billing_collection_and_pipeline() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap();
        let jan = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();

        let invoices = vec![
            // paid in full
            invoice(InvoiceStatus::Paid, dec!(1000.00), dec!(1000.00), jan, jan + Duration::days(30)),
            // partially paid and overdue
            invoice(InvoiceStatus::PartiallyPaid, dec!(500.00), dec!(200.00), jan, jan + Duration::days(30)),
            // sent, not yet due
            invoice(InvoiceStatus::Sent, dec!(300.00), dec!(0), mar, now + Duration::days(10)),
            // excluded from billing
            invoice(InvoiceStatus::Draft, dec!(9999), dec!(0), mar, mar),
            invoice(InvoiceStatus::Void, dec!(4444), dec!(0), mar, mar),
        ];
        let jobs = vec![
            job(JobStatus::Pending, dec!(12000)),
            job(JobStatus::InProgress, dec!(8000)),
            job(JobStatus::Completed, dec!(5000)),
            job(JobStatus::Cancelled, dec!(7000)),
        ];

        let metrics = compute_metrics(&invoices, &jobs, now);
        assert_eq!(metrics.total_billed, dec!(1800.00));
        assert_eq!(metrics.total_collected, dec!(1200.00));
        assert_eq!(metrics.outstanding, dec!(600.00));
        assert_eq!(metrics.overdue_amount, dec!(300.00));
        assert_eq!(metrics.overdue_count, 1);
        assert_eq!(metrics.billed_invoice_count, 3);
        assert_eq!(metrics.paid_invoice_count, 1);
        assert_eq!(metrics.open_invoice_count, 2);
        assert_eq!(metrics.average_invoice_value, dec!(600.00));
        assert_eq!(metrics.collection_rate, dec!(66.67));
        assert_eq!(metrics.pipeline_value, dec!(20000));
        assert_eq!(metrics.completed_jobs, 1);

        let months: Vec<&str> = metrics.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-03"]);
        assert_eq!(metrics.monthly[0].billed, dec!(1500.00));
        assert_eq!(metrics.monthly[0].collected, dec!(1200.00));
        assert_eq!(metrics.monthly[1].invoice_count, 1);
    }
}
