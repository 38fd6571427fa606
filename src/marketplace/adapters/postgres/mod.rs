//! `PostgreSQL` adapters for marketplace persistence.

mod models;
mod repository;
mod schema;

pub use repository::{MarketplacePgPool, PostgresMarketplaceRepository};
