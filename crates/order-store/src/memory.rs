use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, PersonId, ProductId, ProductTypeId, Revision, StatusId, TableId, UserId};
use tokio::sync::RwLock;

use crate::{
    CatalogSeed, NewOrder, NewOrderLine, Person, Product, ProductType, RawOrder, RawOrderLine,
    Result, StatusRow, StoreError, Table, User,
    store::{Catalog, OrderStore, validate_new_order},
};

#[derive(Default)]
struct CatalogTables {
    statuses: BTreeMap<StatusId, StatusRow>,
    persons: BTreeMap<PersonId, Person>,
    users: BTreeMap<UserId, User>,
    tables: BTreeMap<TableId, Table>,
    product_types: BTreeMap<ProductTypeId, ProductType>,
    products: BTreeMap<ProductId, Product>,
}

struct OrderRow {
    id: OrderId,
    creator_id: UserId,
    table_id: TableId,
    status_id: StatusId,
    created_at: DateTime<Utc>,
    revision: Revision,
}

#[derive(Default)]
struct OrderTables {
    orders: BTreeMap<OrderId, OrderRow>,
    lines: Vec<RawOrderLine>,
    last_id: i64,
}

impl OrderTables {
    fn assemble(&self, row: &OrderRow) -> RawOrder {
        RawOrder {
            id: row.id,
            creator_id: row.creator_id,
            table_id: row.table_id,
            status_id: row.status_id,
            created_at: row.created_at,
            revision: row.revision,
            lines: self
                .lines
                .iter()
                .filter(|l| l.order_id == row.id)
                .cloned()
                .collect(),
        }
    }
}

/// In-memory store implementation for tests and local runs.
///
/// This implementation keeps every row in memory and provides the same
/// interface as the PostgreSQL implementation. Order writes hold a single
/// write lock, so each call is atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    catalog: Arc<RwLock<CatalogTables>>,
    orders: Arc<RwLock<OrderTables>>,
}

impl InMemoryStore {
    /// Creates a new store with an empty catalog and no orders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose catalog is populated from `seed`.
    pub fn with_catalog(seed: CatalogSeed) -> Self {
        let catalog = CatalogTables {
            statuses: seed.statuses.into_iter().map(|s| (s.id, s)).collect(),
            persons: seed.persons.into_iter().map(|p| (p.id, p)).collect(),
            users: seed.users.into_iter().map(|u| (u.id, u)).collect(),
            tables: seed.tables.into_iter().map(|t| (t.id, t)).collect(),
            product_types: seed.product_types.into_iter().map(|t| (t.id, t)).collect(),
            products: seed.products.into_iter().map(|p| (p.id, p)).collect(),
        };
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            orders: Arc::default(),
        }
    }

    /// Inserts or replaces a product row.
    pub async fn upsert_product(&self, product: Product) {
        self.catalog
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Removes a product row, leaving any order lines that reference it.
    pub async fn remove_product(&self, id: ProductId) -> Option<Product> {
        self.catalog.write().await.products.remove(&id)
    }

    /// Inserts or replaces a user row.
    pub async fn upsert_user(&self, user: User) {
        self.catalog.write().await.users.insert(user.id, user);
    }

    /// Removes a user row, leaving any orders that reference it.
    pub async fn remove_user(&self, id: UserId) -> Option<User> {
        self.catalog.write().await.users.remove(&id)
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.orders.len()
    }

    /// Returns the number of stored order lines across all orders.
    pub async fn line_count(&self) -> usize {
        self.orders.read().await.lines.len()
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.catalog.read().await.users.get(&id).cloned())
    }

    async fn find_person(&self, id: PersonId) -> Result<Option<Person>> {
        Ok(self.catalog.read().await.persons.get(&id).cloned())
    }

    async fn find_table(&self, id: TableId) -> Result<Option<Table>> {
        Ok(self.catalog.read().await.tables.get(&id).cloned())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.catalog.read().await.products.get(&id).cloned())
    }

    async fn find_product_type(&self, id: ProductTypeId) -> Result<Option<ProductType>> {
        Ok(self.catalog.read().await.product_types.get(&id).cloned())
    }

    async fn list_tables(&self) -> Result<Vec<Table>> {
        Ok(self.catalog.read().await.tables.values().cloned().collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.catalog.read().await.products.values().cloned().collect())
    }

    async fn list_product_types(&self) -> Result<Vec<ProductType>> {
        Ok(self
            .catalog
            .read()
            .await
            .product_types
            .values()
            .cloned()
            .collect())
    }

    async fn list_statuses(&self) -> Result<Vec<StatusRow>> {
        Ok(self.catalog.read().await.statuses.values().cloned().collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn persist_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> Result<OrderId> {
        validate_new_order(&lines)?;

        let mut tables = self.orders.write().await;
        tables.last_id += 1;
        let id = OrderId::new(tables.last_id);

        tables.orders.insert(
            id,
            OrderRow {
                id,
                creator_id: order.creator_id,
                table_id: order.table_id,
                status_id: order.status_id,
                created_at: order.created_at,
                revision: Revision::first(),
            },
        );
        tables
            .lines
            .extend(lines.into_iter().map(|l| RawOrderLine::from_new(id, l)));

        Ok(id)
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
        expected_revision: Option<Revision>,
    ) -> Result<Revision> {
        let mut tables = self.orders.write().await;
        let row = tables
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;

        if let Some(expected) = expected_revision
            && row.revision != expected
        {
            return Err(StoreError::Conflict {
                order_id,
                expected,
                actual: row.revision,
            });
        }

        row.status_id = status_id;
        row.revision = row.revision.next();
        Ok(row.revision)
    }

    async fn delete_order_cascade(&self, order_id: OrderId) -> Result<()> {
        let mut tables = self.orders.write().await;
        if tables.orders.remove(&order_id).is_none() {
            return Err(StoreError::OrderNotFound(order_id));
        }
        tables.lines.retain(|l| l.order_id != order_id);
        Ok(())
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<RawOrder>> {
        let tables = self.orders.read().await;
        Ok(tables.orders.get(&order_id).map(|row| tables.assemble(row)))
    }

    async fn fetch_all_orders(&self) -> Result<Vec<RawOrder>> {
        let tables = self.orders.read().await;
        let mut orders: Vec<_> = tables
            .orders
            .values()
            .map(|row| tables.assemble(row))
            .collect();

        // Newest first
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use common::Money;

    use super::*;

    fn new_order(created_at: DateTime<Utc>) -> NewOrder {
        NewOrder {
            creator_id: UserId::new(2),
            table_id: TableId::new(5),
            status_id: StatusId::new(2),
            created_at,
        }
    }

    fn line(product: i64, quantity: u32) -> NewOrderLine {
        NewOrderLine {
            product_id: ProductId::new(product),
            quantity,
            notes: None,
            unit_price: Money::from_cents(1000),
        }
    }

    #[tokio::test]
    async fn persist_assigns_ids_and_first_revision() {
        let store = InMemoryStore::new();

        let first = store
            .persist_order(new_order(Utc::now()), vec![line(1, 2)])
            .await
            .unwrap();
        let second = store
            .persist_order(new_order(Utc::now()), vec![line(1, 1)])
            .await
            .unwrap();

        assert_ne!(first, second);
        let order = store.fetch_order(first).await.unwrap().unwrap();
        assert_eq!(order.revision, Revision::first());
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn persist_rejects_invalid_lines_without_writing() {
        let store = InMemoryStore::new();

        let result = store.persist_order(new_order(Utc::now()), vec![]).await;

        assert!(matches!(result, Err(StoreError::InvalidOrder(_))));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.line_count().await, 0);
    }

    #[tokio::test]
    async fn update_status_bumps_revision() {
        let store = InMemoryStore::new();
        let id = store
            .persist_order(new_order(Utc::now()), vec![line(1, 1)])
            .await
            .unwrap();

        let rev = store
            .update_order_status(id, StatusId::new(3), Some(Revision::first()))
            .await
            .unwrap();

        assert_eq!(rev, Revision::new(2));
        let order = store.fetch_order(id).await.unwrap().unwrap();
        assert_eq!(order.status_id, StatusId::new(3));
    }

    #[tokio::test]
    async fn update_status_with_stale_revision_conflicts() {
        let store = InMemoryStore::new();
        let id = store
            .persist_order(new_order(Utc::now()), vec![line(1, 1)])
            .await
            .unwrap();
        store
            .update_order_status(id, StatusId::new(3), None)
            .await
            .unwrap();

        let result = store
            .update_order_status(id, StatusId::new(4), Some(Revision::first()))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Conflict { expected, actual, .. })
                if expected == Revision::first() && actual == Revision::new(2)
        ));
        let order = store.fetch_order(id).await.unwrap().unwrap();
        assert_eq!(order.status_id, StatusId::new(3));
    }

    #[tokio::test]
    async fn update_missing_order_is_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .update_order_status(OrderId::new(99), StatusId::new(3), None)
            .await;
        assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn delete_cascades_to_lines() {
        let store = InMemoryStore::new();
        let keep = store
            .persist_order(new_order(Utc::now()), vec![line(1, 1)])
            .await
            .unwrap();
        let gone = store
            .persist_order(new_order(Utc::now()), vec![line(1, 1), line(2, 1), line(3, 1)])
            .await
            .unwrap();

        store.delete_order_cascade(gone).await.unwrap();

        assert!(store.fetch_order(gone).await.unwrap().is_none());
        assert!(store.fetch_order(keep).await.unwrap().is_some());
        assert_eq!(store.line_count().await, 1);
        assert!(matches!(
            store.delete_order_cascade(gone).await,
            Err(StoreError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn fetch_all_returns_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let older = store
            .persist_order(new_order(now - Duration::minutes(10)), vec![line(1, 1)])
            .await
            .unwrap();
        let newer = store
            .persist_order(new_order(now), vec![line(1, 1)])
            .await
            .unwrap();

        let all = store.fetch_all_orders().await.unwrap();
        let ids: Vec<_> = all.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn catalog_lookups_use_seed() {
        let store = InMemoryStore::with_catalog(CatalogSeed::demo());

        let table = store.find_table(TableId::new(5)).await.unwrap().unwrap();
        assert_eq!(table.label, "Table 5");
        assert!(store.find_table(TableId::new(50)).await.unwrap().is_none());
        assert_eq!(store.list_products().await.unwrap().len(), 18);

        store.remove_product(ProductId::new(1)).await;
        assert!(store.find_product(ProductId::new(1)).await.unwrap().is_none());
    }
}
