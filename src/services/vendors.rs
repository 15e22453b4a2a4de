use crate::{
    db::DbPool,
    entities::{
        purchase_order,
        vendor::{self, VendorStatus},
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
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<VendorStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<VendorStatus>,
}

#[derive(Clone)]
pub struct VendorService {
    db: Arc<DbPool>,
}

impl VendorService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
    ) -> Result<Page<vendor::Model>, ServiceError> {
        let mut query = vendor::Entity::find().filter(vendor::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<VendorStatus>()? {
            query = query.filter(vendor::Column::Status.eq(status));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[
                    vendor::Column::Name,
                    vendor::Column::ContactName,
                    vendor::Column::Email,
                ],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(vendor::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateVendorRequest,
    ) -> Result<vendor::Model, ServiceError> {
        input.validate()?;

        Ok(vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name.trim().to_string()),
            contact_name: Set(input.contact_name),
            email: Set(input.email),
            phone: Set(input.phone),
            status: Set(input.status.unwrap_or(VendorStatus::Active)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?)
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(id)
            .filter(vendor::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateVendorRequest,
    ) -> Result<vendor::Model, ServiceError> {
        input.validate()?;
        let mut model: vendor::ActiveModel = self.get(tenant_id, id).await?.into();

        if let Some(name) = input.name {
            model.name = Set(name.trim().to_string());
        }
        if input.contact_name.is_some() {
            model.contact_name = Set(input.contact_name);
        }
        if input.email.is_some() {
            model.email = Set(input.email);
        }
        if input.phone.is_some() {
            model.phone = Set(input.phone);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        Ok(model.update(&*self.db).await?)
    }

    /// Vendors referenced by purchase orders cannot be deleted
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let vendor = self.get(tenant_id, id).await?;
        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::TenantId.eq(tenant_id))
            .filter(purchase_order::Column::VendorId.eq(id))
            .count(&*self.db)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "vendor {} is referenced by {} purchase order(s)",
                vendor.name, orders
            )));
        }

        vendor::Entity::delete_by_id(vendor.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}

/// Fails with 400 when the vendor does not exist for this tenant
pub(crate) async fn ensure_vendor(
    db: &DbPool,
    tenant_id: Uuid,
    vendor_id: Uuid,
) -> Result<vendor::Model, ServiceError> {
    vendor::Entity::find_by_id(vendor_id)
        .filter(vendor::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::BadRequest(format!("vendor {} does not exist", vendor_id)))
}
