//! sea-orm entities. Every table is tenant scoped through `tenant_id`.

pub mod customer;
pub mod estimate;
pub mod inventory_item;
pub mod invoice;
pub mod job;
pub mod payment;
pub mod purchase_order;
pub mod rag_chunk;
pub mod rag_document;
pub mod vendor;
