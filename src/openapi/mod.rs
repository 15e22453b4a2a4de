use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BrainOps API",
        description = r#"
# BrainOps API

Backend for roofing contractors. Every `/api/v1` resource is scoped to the
tenant named by the `X-Tenant-ID` header.

## Authentication

When an API key is configured, send it as `X-API-Key: <key>` or
`Authorization: Bearer <key>`. `/api/v1/status` and `/api/v1/health` stay open.

## Pagination

List endpoints accept `page` (default 1), `limit` (clamped to the configured
maximum), `search` and `status`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "customers", description = "Customer records"),
        (name = "jobs", description = "Roofing jobs and their lifecycle"),
        (name = "estimates", description = "Quotes sent to customers"),
        (name = "invoices", description = "Billing and payments"),
        (name = "inventory", description = "Materials on hand"),
        (name = "vendors", description = "Suppliers"),
        (name = "purchase_orders", description = "Orders placed with vendors"),
        (name = "revenue", description = "Revenue metrics"),
        (name = "rag", description = "Document retrieval"),
        (name = "system", description = "Service identity and route manifest"),
        (name = "health", description = "Health probes")
    ),
    paths(
        crate::health::health_check,
        crate::health::liveness,
        crate::health::readiness,
        crate::api::status_handler,
        crate::api::routes_handler,

        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::customers::list_customer_jobs,

        crate::handlers::jobs::list_jobs,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::update_job,
        crate::handlers::jobs::update_job_status,
        crate::handlers::jobs::delete_job,

        crate::handlers::estimates::list_estimates,
        crate::handlers::estimates::create_estimate,
        crate::handlers::estimates::get_estimate,
        crate::handlers::estimates::update_estimate,
        crate::handlers::estimates::delete_estimate,
        crate::handlers::estimates::send_estimate,
        crate::handlers::estimates::accept_estimate,
        crate::handlers::estimates::reject_estimate,
        crate::handlers::estimates::expire_estimate,
        crate::handlers::estimates::convert_estimate,

        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::delete_invoice,
        crate::handlers::invoices::send_invoice,
        crate::handlers::invoices::record_payment,
        crate::handlers::invoices::list_payments,
        crate::handlers::invoices::void_invoice,

        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::get_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::delete_item,
        crate::handlers::inventory::adjust_item,

        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,

        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::submit_purchase_order,
        crate::handlers::purchase_orders::receive_purchase_order,
        crate::handlers::purchase_orders::cancel_purchase_order,

        crate::handlers::revenue::revenue_metrics,

        crate::handlers::rag::search,
        crate::handlers::rag::list_documents,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::rag::IngestReport,
        )
    )
)]
pub struct ApiDocV1;

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}
