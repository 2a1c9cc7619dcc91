use serde_json::Value;

use crate::models::Resource;
use crate::store::Document;

/// Convert a stored document into the public wire format
/// `{ _id, ...fields, created, updated }`.
///
/// Every handler that returns records goes through here, so fields listed in
/// `R::HIDDEN` (password hashes) can never reach a response.
pub fn record_to_api_value<R: Resource>(doc: &Document) -> Value {
    doc.to_json(R::HIDDEN)
}

pub fn records_to_api_values<R: Resource>(docs: &[Document]) -> Vec<Value> {
    docs.iter().map(record_to_api_value::<R>).collect()
}
