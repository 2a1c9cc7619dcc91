pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

pub use app::app;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// Collections the API serves, in routing order
pub const COLLECTIONS: &[&str] = &[
    <models::Contact as models::Resource>::COLLECTION,
    <models::Project as models::Resource>::COLLECTION,
    <models::Service as models::Resource>::COLLECTION,
    <models::User as models::Resource>::COLLECTION,
];
