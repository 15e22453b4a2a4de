use crate::{
    db::DbPool,
    entities::{
        customer::{self, CustomerStatus},
        estimate, invoice, job,
    },
    errors::ServiceError,
    services::{search_any, validate_not_blank, ListParams, Page},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub status: Option<CustomerStatus>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub status: Option<CustomerStatus>,
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
    ) -> Result<Page<customer::Model>, ServiceError> {
        let mut query = customer::Entity::find().filter(customer::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<CustomerStatus>()? {
            query = query.filter(customer::Column::Status.eq(status));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[
                    customer::Column::Name,
                    customer::Column::Email,
                    customer::Column::Phone,
                    customer::Column::City,
                ],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(customer::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;

        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            city: Set(input.city),
            state: Set(input.state),
            zip: Set(input.zip),
            notes: Set(input.notes),
            status: Set(input.status.unwrap_or(CustomerStatus::Active)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(customer_id = %model.id, %tenant_id, "customer created");
        Ok(model)
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .filter(customer::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let mut model: customer::ActiveModel = self.get(tenant_id, id).await?.into();

        if let Some(name) = input.name {
            model.name = Set(name.trim().to_string());
        }
        if input.email.is_some() {
            model.email = Set(input.email);
        }
        if input.phone.is_some() {
            model.phone = Set(input.phone);
        }
        if input.address.is_some() {
            model.address = Set(input.address);
        }
        if input.city.is_some() {
            model.city = Set(input.city);
        }
        if input.state.is_some() {
            model.state = Set(input.state);
        }
        if input.zip.is_some() {
            model.zip = Set(input.zip);
        }
        if input.notes.is_some() {
            model.notes = Set(input.notes);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        Ok(model.update(&*self.db).await?)
    }

    /// Deletes a customer that has no jobs, estimates or invoices
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let customer = self.get(tenant_id, id).await?;
        let db = &*self.db;

        let jobs = job::Entity::find()
            .filter(job::Column::TenantId.eq(tenant_id))
            .filter(job::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        let estimates = estimate::Entity::find()
            .filter(estimate::Column::TenantId.eq(tenant_id))
            .filter(estimate::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        let invoices = invoice::Entity::find()
            .filter(invoice::Column::TenantId.eq(tenant_id))
            .filter(invoice::Column::CustomerId.eq(id))
            .count(db)
            .await?;

        if jobs + estimates + invoices > 0 {
            return Err(ServiceError::Conflict(format!(
                "customer {} still has {} job(s), {} estimate(s) and {} invoice(s)",
                id, jobs, estimates, invoices
            )));
        }

        customer::Entity::delete_by_id(customer.id).exec(db).await?;
        info!(customer_id = %id, %tenant_id, "customer deleted");
        Ok(())
    }

    pub async fn list_jobs(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        params: &ListParams,
    ) -> Result<Page<job::Model>, ServiceError> {
        self.get(tenant_id, id).await?;

        let query = job::Entity::find()
            .filter(job::Column::TenantId.eq(tenant_id))
            .filter(job::Column::CustomerId.eq(id));
        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(job::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }
}
