pub mod auth;
pub mod error;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use error::error_handler;
pub use response::{ApiResponse, ApiResult};
