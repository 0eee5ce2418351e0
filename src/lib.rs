pub mod catalog_operations;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod db_operations;
pub mod errors;
pub mod export;
pub mod file_operations;
pub mod schedule;
pub mod session;
pub mod shared_main;
pub mod validation;
