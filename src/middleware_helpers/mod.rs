pub mod api_key;
pub mod request_id;
pub mod tenant;

pub use api_key::{api_key_middleware, ApiKeyState, API_KEY_HEADER};
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
pub use tenant::{TenantContext, TENANT_HEADER};
