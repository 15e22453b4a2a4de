use crate::{
    db::DbPool,
    entities::{
        inventory_item,
        purchase_order::{self, PurchaseOrderStatus},
    },
    errors::ServiceError,
    services::{
        numbering,
        pricing::{self, PurchaseLineItem},
        search_any,
        vendors::ensure_vendor,
        ListParams, Page,
    },
};
use chrono::{DateTime, Utc};
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
pub struct CreatePurchaseOrderRequest {
    pub vendor_id: Uuid,
    pub line_items: Vec<PurchaseLineItem>,
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    pub line_items: Option<Vec<PurchaseLineItem>>,
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &ListParams,
        vendor_id: Option<Uuid>,
    ) -> Result<Page<purchase_order::Model>, ServiceError> {
        let mut query = purchase_order::Entity::find()
            .filter(purchase_order::Column::TenantId.eq(tenant_id));

        if let Some(status) = params.status_filter::<PurchaseOrderStatus>()? {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(vendor_id) = vendor_id {
            query = query.filter(purchase_order::Column::VendorId.eq(vendor_id));
        }
        if let Some(term) = params.search_term() {
            query = query.filter(search_any(
                &[purchase_order::Column::PoNumber, purchase_order::Column::Notes],
                term,
            ));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(purchase_order::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit)
            .all(&*self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn check_lines(
        &self,
        tenant_id: Uuid,
        lines: &[PurchaseLineItem],
    ) -> Result<rust_decimal::Decimal, ServiceError> {
        let total = pricing::purchase_total(lines)?;
        for item_id in lines.iter().filter_map(|line| line.inventory_item_id) {
            let exists = inventory_item::Entity::find_by_id(item_id)
                .filter(inventory_item::Column::TenantId.eq(tenant_id))
                .count(&*self.db)
                .await?
                > 0;
            if !exists {
                return Err(ServiceError::BadRequest(format!(
                    "inventory item {} does not exist",
                    item_id
                )));
            }
        }
        Ok(total)
    }

    #[instrument(skip(self, input), fields(vendor_id = %input.vendor_id))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreatePurchaseOrderRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        let total_amount = self.check_lines(tenant_id, &input.line_items).await?;
        ensure_vendor(&self.db, tenant_id, input.vendor_id).await?;

        let now = Utc::now();
        let model = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            vendor_id: Set(input.vendor_id),
            po_number: Set(numbering::document_number(
                numbering::PURCHASE_ORDER_PREFIX,
                now,
            )),
            status: Set(PurchaseOrderStatus::Draft),
            line_items: Set(pricing::to_json(&input.line_items)?),
            total_amount: Set(total_amount),
            expected_date: Set(input.expected_date),
            notes: Set(input.notes),
            submitted_at: Set(None),
            received_at: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(po_id = %model.id, po_number = %model.po_number, "purchase order created");
        Ok(model)
    }

    pub async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(id)
            .filter(purchase_order::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))
    }

    async fn get_draft(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let order = self.get(tenant_id, id).await?;
        if order.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::Conflict(format!(
                "purchase order {} is {}; only drafts can be changed",
                order.po_number, order.status
            )));
        }
        Ok(order)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdatePurchaseOrderRequest,
    ) -> Result<purchase_order::Model, ServiceError> {
        let current = self.get_draft(tenant_id, id).await?;
        let mut model: purchase_order::ActiveModel = current.into();

        if let Some(lines) = input.line_items {
            let total = self.check_lines(tenant_id, &lines).await?;
            model.line_items = Set(pricing::to_json(&lines)?);
            model.total_amount = Set(total);
        }
        if input.expected_date.is_some() {
            model.expected_date = Set(input.expected_date);
        }
        if input.notes.is_some() {
            model.notes = Set(input.notes);
        }

        Ok(model.update(&*self.db).await?)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let order = self.get_draft(tenant_id, id).await?;
        purchase_order::Entity::delete_by_id(order.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    fn check_transition(
        order: &purchase_order::Model,
        next: PurchaseOrderStatus,
    ) -> Result<(), ServiceError> {
        if order.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(ServiceError::Conflict(format!(
                "purchase order {} cannot move from {} to {}",
                order.po_number, order.status, next
            )))
        }
    }

    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let order = self.get(tenant_id, id).await?;
        Self::check_transition(&order, PurchaseOrderStatus::Submitted)?;

        let mut model: purchase_order::ActiveModel = order.into();
        model.status = Set(PurchaseOrderStatus::Submitted);
        model.submitted_at = Set(Some(Utc::now()));
        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let order = self.get(tenant_id, id).await?;
        Self::check_transition(&order, PurchaseOrderStatus::Cancelled)?;

        let mut model: purchase_order::ActiveModel = order.into();
        model.status = Set(PurchaseOrderStatus::Cancelled);
        Ok(model.update(&*self.db).await?)
    }

    /// Marks the order received and adds every linked line to stock,
    /// all inside one transaction
    #[instrument(skip(self))]
    pub async fn receive(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = purchase_order::Entity::find_by_id(id)
            .filter(purchase_order::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;
        Self::check_transition(&order, PurchaseOrderStatus::Received)?;

        let lines = pricing::from_json::<PurchaseLineItem>(&order.line_items)?;
        let mut restocked = 0usize;
        for line in &lines {
            let Some(item_id) = line.inventory_item_id else {
                continue;
            };
            let item = inventory_item::Entity::find_by_id(item_id)
                .filter(inventory_item::Column::TenantId.eq(tenant_id))
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::Conflict(format!(
                        "inventory item {} on purchase order {} no longer exists",
                        item_id, order.po_number
                    ))
                })?;

            let quantity = item
                .quantity_on_hand
                .checked_add(line.quantity)
                .ok_or_else(|| {
                    ServiceError::BadRequest(format!("stock for {} would overflow", item.sku))
                })?;
            let mut item: inventory_item::ActiveModel = item.into();
            item.quantity_on_hand = Set(quantity);
            item.update(&txn).await?;
            restocked += 1;
        }

        let po_number = order.po_number.clone();
        let mut model: purchase_order::ActiveModel = order.into();
        model.status = Set(PurchaseOrderStatus::Received);
        model.received_at = Set(Some(Utc::now()));
        let updated = model.update(&txn).await?;
        txn.commit().await?;

        info!(%po_number, restocked, "purchase order received");
        Ok(updated)
    }
}
