// handlers/mod.rs
//
// crud   - generic controller instantiated once per resource model
// auth   - token acquisition (public)
// system - root, health and the fallback for unmatched paths

pub mod auth;
pub mod crud;
pub mod system;

pub use crud::CrudController;
