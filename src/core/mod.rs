pub mod collector;
pub mod docstore;
pub mod error;
pub mod provider;
pub mod ratelimit;
pub mod seed;
pub mod session;
pub mod store;
pub mod vault;
