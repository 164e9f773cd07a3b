pub mod connection;
#[cfg(test)]
pub mod memory_store;
pub mod migrations;
pub mod models;
pub mod pg_store;
pub mod store;
