pub mod extract;
pub mod format;

pub use extract::ApiJson;
pub use format::{record_to_api_value, records_to_api_values};
