pub mod common;
pub mod customers;
pub mod estimates;
pub mod inventory;
pub mod invoices;
pub mod jobs;
pub mod purchase_orders;
pub mod rag;
pub mod revenue;
pub mod vendors;

use crate::{
    config::AppConfig,
    db::DbPool,
    rag::{EmbeddingProvider, RagService},
    services::{
        customers::CustomerService, estimates::EstimateService, inventory::InventoryService,
        invoices::InvoiceService, jobs::JobService, purchase_orders::PurchaseOrderService,
        revenue::RevenueService, vendors::VendorService,
    },
};
use std::sync::Arc;

/// Services shared by every HTTP handler
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub jobs: Arc<JobService>,
    pub estimates: Arc<EstimateService>,
    pub invoices: Arc<InvoiceService>,
    pub inventory: Arc<InventoryService>,
    pub vendors: Arc<VendorService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub revenue: Arc<RevenueService>,
    pub rag: Arc<RagService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(db.clone())),
            jobs: Arc::new(JobService::new(db.clone())),
            estimates: Arc::new(EstimateService::new(db.clone(), config.default_tax_rate)),
            invoices: Arc::new(InvoiceService::new(db.clone(), config.default_tax_rate)),
            inventory: Arc::new(InventoryService::new(db.clone())),
            vendors: Arc::new(VendorService::new(db.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(db.clone())),
            revenue: Arc::new(RevenueService::new(db.clone())),
            rag: Arc::new(RagService::new(db, embedder)),
        }
    }
}
