pub mod auth_service;
pub mod data_store;
pub mod record_service;
pub mod summary;
