use crate::{
    db::DbPool,
    entities::inventory_item,
    errors::ServiceError,
    services::{
        jobs::validate_non_negative, search_any, validate_not_blank, vendors::ensure_vendor,
        ListParams, Page,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, max = 64), custom = "validate_not_blank")]
    pub sku: String,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    pub category: Option<String>,
    /// Unit of measure, e.g. "bundle" or "roll"
    pub unit: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub quantity_on_hand: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub reorder_point: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub unit_cost: Option<Decimal>,
    pub vendor_id: Option<Uuid>,
}

/// Partial update. Quantity changes go through adjustments.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryItemRequest {
    #[validate(length(min = 1, max = 64), custom = "validate_not_blank")]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub reorder_point: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub unit_cost: Option<Decimal>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed quantity change
    pub delta: Decimal,
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
    ) -> Result<Page<inventory_item::Model>, ServiceError> {
        let mut query = inventory_item::Entity::find()
            .filter(inventory_item::Column::TenantId.eq(tenant_id));

        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[
                    inventory_item::Column::Sku,
                    inventory_item::Column::Name,
                    inventory_item::Column::Category,
                ],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(inventory_item::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }

    /// Items at or below their reorder point, lowest stock first
    pub async fn low_stock(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        Ok(inventory_item::Entity::find()
            .filter(inventory_item::Column::TenantId.eq(tenant_id))
            .filter(
                Expr::col(inventory_item::Column::QuantityOnHand)
                    .lte(Expr::col(inventory_item::Column::ReorderPoint)),
            )
            .order_by_asc(inventory_item::Column::QuantityOnHand)
            .all(&*self.db)
            .await?)
    }

    async fn ensure_sku_free(
        &self,
        tenant_id: Uuid,
        sku: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = inventory_item::Entity::find()
            .filter(inventory_item::Column::TenantId.eq(tenant_id))
            .filter(inventory_item::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(inventory_item::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!("sku '{}' already exists", sku)));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        input.validate()?;
        let sku = input.sku.trim().to_string();
        self.ensure_sku_free(tenant_id, &sku, None).await?;
        if let Some(vendor_id) = input.vendor_id {
            ensure_vendor(&self.db, tenant_id, vendor_id).await?;
        }

        let model = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            sku: Set(sku),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category),
            unit: Set(input.unit.unwrap_or_else(|| "each".to_string())),
            quantity_on_hand: Set(input.quantity_on_hand.unwrap_or_default()),
            reorder_point: Set(input.reorder_point.unwrap_or_default()),
            unit_cost: Set(input.unit_cost.unwrap_or_default()),
            vendor_id: Set(input.vendor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        Ok(model)
    }

    pub async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        inventory_item::Entity::find_by_id(id)
            .filter(inventory_item::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Inventory item", id))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        input.validate()?;
        let current = self.get(tenant_id, id).await?;
        if let Some(vendor_id) = input.vendor_id {
            ensure_vendor(&self.db, tenant_id, vendor_id).await?;
        }

        let mut model: inventory_item::ActiveModel = current.into();
        if let Some(sku) = input.sku {
            let sku = sku.trim().to_string();
            self.ensure_sku_free(tenant_id, &sku, Some(id)).await?;
            model.sku = Set(sku);
        }
        if let Some(name) = input.name {
            model.name = Set(name.trim().to_string());
        }
        if input.category.is_some() {
            model.category = Set(input.category);
        }
        if let Some(unit) = input.unit {
            model.unit = Set(unit);
        }
        if let Some(reorder_point) = input.reorder_point {
            model.reorder_point = Set(reorder_point);
        }
        if let Some(unit_cost) = input.unit_cost {
            model.unit_cost = Set(unit_cost);
        }
        if input.vendor_id.is_some() {
            model.vendor_id = Set(input.vendor_id);
        }

        Ok(model.update(&*self.db).await?)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let item = self.get(tenant_id, id).await?;
        inventory_item::Entity::delete_by_id(item.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Applies a signed quantity change; stock never goes below zero
    #[instrument(skip(self, input), fields(delta = %input.delta))]
    pub async fn adjust(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AdjustStockRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        if input.delta.is_zero() {
            return Err(ServiceError::ValidationError(
                "delta must not be zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let item = inventory_item::Entity::find_by_id(id)
            .filter(inventory_item::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Inventory item", id))?;
        let next = item
            .quantity_on_hand
            .checked_add(input.delta)
            .ok_or_else(|| ServiceError::BadRequest(format!("stock for {} would overflow", item.sku)))?;
        if next < Decimal::ZERO {
            return Err(ServiceError::BadRequest(format!(
                "adjustment would leave {} with negative stock ({})",
                item.sku, next
            )));
        }

        let sku = item.sku.clone();
        let mut model: inventory_item::ActiveModel = item.into();
        model.quantity_on_hand = Set(next);
        let updated = model.update(&txn).await?;
        txn.commit().await?;

        info!(
            %sku,
            delta = %input.delta,
            reason = input.reason.as_deref().unwrap_or(""),
            quantity_on_hand = %updated.quantity_on_hand,
            "stock adjusted"
        );
        if updated.is_low_stock() {
            warn!(%sku, "item at or below reorder point");
        }
        Ok(updated)
    }
}
