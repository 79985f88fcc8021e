// Session history: records, seed data, pluggable stores and aggregate stats.

pub mod file_store;
pub mod handlers;
pub mod models;
pub mod pg_store;
pub mod repository;
pub mod seed;
pub mod stats;
pub mod store;
