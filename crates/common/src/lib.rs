//! Shared identifiers and value types used across the order tracking crates.

mod ids;
mod money;
mod role;

pub use ids::{OrderId, PersonId, ProductId, ProductTypeId, Revision, StatusId, TableId, UserId};
pub use money::Money;
pub use role::{ParseRoleError, Role};
