pub mod entries;
pub mod error;
pub mod records;
pub mod repository;
pub mod user;
