use std::collections::HashSet;

use async_trait::async_trait;
use common::{OrderId, PersonId, ProductId, ProductTypeId, Revision, StatusId, TableId, UserId};

use crate::{
    NewOrder, NewOrderLine, Person, Product, ProductType, RawOrder, Result, StatusRow, StoreError,
    Table, User,
};

/// Largest quantity a single order line may carry. Enforced by every store.
pub const MAX_LINE_QUANTITY: u32 = 1_000;

/// Read-only reference data: users, tables, products and the status
/// vocabulary.
///
/// Lookups return `Ok(None)` when the row does not exist; errors are reserved
/// for backend failures.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_person(&self, id: PersonId) -> Result<Option<Person>>;

    async fn find_table(&self, id: TableId) -> Result<Option<Table>>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn find_product_type(&self, id: ProductTypeId) -> Result<Option<ProductType>>;

    /// All tables, ordered by id.
    async fn list_tables(&self) -> Result<Vec<Table>>;

    /// All products (active or not), ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// All product types, ordered by id.
    async fn list_product_types(&self) -> Result<Vec<ProductType>>;

    /// The full status vocabulary, ordered by id.
    async fn list_statuses(&self) -> Result<Vec<StatusRow>>;
}

/// Persistence of orders and their lines.
///
/// Every method is a single atomic unit: either it commits entirely or it
/// leaves the stored state untouched.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order header and all of its lines atomically.
    ///
    /// The new order starts at [`Revision::first`].
    async fn persist_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> Result<OrderId>;

    /// Sets the status of an order and bumps its revision.
    ///
    /// If `expected_revision` is set and does not match the stored revision,
    /// fails with [`StoreError::Conflict`] without writing. Returns the new
    /// revision.
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
        expected_revision: Option<Revision>,
    ) -> Result<Revision>;

    /// Deletes an order and all of its lines.
    async fn delete_order_cascade(&self, order_id: OrderId) -> Result<()>;

    /// Fetches one order with its lines.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<RawOrder>>;

    /// Fetches every order with its lines, newest first.
    async fn fetch_all_orders(&self) -> Result<Vec<RawOrder>>;
}

/// Validates an order before persisting it.
///
/// This is the last line of defense for the composition invariants; the
/// order service validates the same properties with richer errors first.
pub fn validate_new_order(lines: &[NewOrderLine]) -> Result<()> {
    if lines.is_empty() {
        return Err(StoreError::InvalidOrder(
            "An order needs at least one line".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(StoreError::InvalidOrder(format!(
                "Line for product {} has quantity 0",
                line.product_id
            )));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(StoreError::InvalidOrder(format!(
                "Line for product {} exceeds the maximum quantity of {MAX_LINE_QUANTITY}",
                line.product_id
            )));
        }
        if !seen.insert(line.product_id) {
            return Err(StoreError::InvalidOrder(format!(
                "Product {} appears more than once",
                line.product_id
            )));
        }
    }

    Ok(())
}
