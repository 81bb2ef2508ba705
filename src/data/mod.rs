pub mod collection;
pub mod memory;
pub mod record_repository;
pub mod sled_store;
pub mod uploads;
