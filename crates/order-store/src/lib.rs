//! Persistence boundary for the order tracking system.
//!
//! The core never talks to a database directly; it consumes the
//! [`Catalog`] and [`OrderStore`] traits defined here. Two implementations
//! are provided: [`InMemoryStore`] for tests and local runs, and
//! [`PostgresStore`] for production.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{
    NewOrder, NewOrderLine, Person, Product, ProductType, RawOrder, RawOrderLine, StatusRow, Table,
    User,
};
pub use seed::CatalogSeed;
pub use store::{Catalog, MAX_LINE_QUANTITY, OrderStore, validate_new_order};
