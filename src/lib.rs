pub mod catalog;
pub mod collation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod http_client;
pub mod player;
pub mod position;
pub mod provider;
pub mod roster;
pub mod session;
pub mod sqlite_store;
pub mod state;
pub mod store;
pub mod supabase;
