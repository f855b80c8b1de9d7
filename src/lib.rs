pub mod auction;
pub mod bidding;
pub mod cache;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod invoice;
pub mod query;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod store;
