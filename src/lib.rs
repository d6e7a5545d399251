pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod repo;
pub mod security;
pub mod server;
pub mod stats;
pub mod store;
