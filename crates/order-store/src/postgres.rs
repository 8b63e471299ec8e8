use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    Money, OrderId, PersonId, ProductId, ProductTypeId, Revision, Role, StatusId, TableId, UserId,
};
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    NewOrder, NewOrderLine, Person, Product, ProductType, RawOrder, RawOrderLine, Result,
    StatusRow, StoreError, Table, User,
    store::{Catalog, OrderStore, validate_new_order},
};

const ORDER_COLUMNS: &str = "id, creator_id, table_id, status_id, created_at, revision";
const LINE_COLUMNS: &str = "order_id, product_id, quantity, notes, unit_price_cents";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations, including the catalog seed.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_revision(row: &PgRow) -> Result<Revision> {
        let raw: i64 = row.try_get("revision")?;
        u64::try_from(raw)
            .map(Revision::new)
            .map_err(|_| StoreError::InvalidRow(format!("negative revision {raw}")))
    }

    fn row_to_order(row: &PgRow) -> Result<RawOrder> {
        Ok(RawOrder {
            id: OrderId::new(row.try_get("id")?),
            creator_id: UserId::new(row.try_get("creator_id")?),
            table_id: TableId::new(row.try_get("table_id")?),
            status_id: StatusId::new(row.try_get("status_id")?),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            revision: Self::row_to_revision(row)?,
            lines: Vec::new(),
        })
    }

    fn row_to_line(row: &PgRow) -> Result<RawOrderLine> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(RawOrderLine {
            order_id: OrderId::new(row.try_get("order_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: u32::try_from(quantity)
                .map_err(|_| StoreError::InvalidRow(format!("negative quantity {quantity}")))?,
            notes: row.try_get("notes")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    fn row_to_user(row: &PgRow) -> Result<User> {
        let role: String = row.try_get("role")?;
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            person_id: PersonId::new(row.try_get("person_id")?),
            role: role
                .parse::<Role>()
                .map_err(|e| StoreError::InvalidRow(e.to_string()))?,
            username: row.try_get("username")?,
            status_id: StatusId::new(row.try_get("status_id")?),
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            type_id: ProductTypeId::new(row.try_get("type_id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            status_id: StatusId::new(row.try_get("status_id")?),
        })
    }

    fn row_to_table(row: &PgRow) -> Result<Table> {
        Ok(Table {
            id: TableId::new(row.try_get("id")?),
            label: row.try_get("label")?,
        })
    }

    fn row_to_product_type(row: &PgRow) -> Result<ProductType> {
        Ok(ProductType {
            id: ProductTypeId::new(row.try_get("id")?),
            name: row.try_get("name")?,
        })
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<RawOrderLine>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = $1 ORDER BY position ASC"
        ))
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_line).collect()
    }
}

fn revision_to_i64(revision: Revision) -> Result<i64> {
    i64::try_from(revision.as_u64())
        .map_err(|_| StoreError::InvalidRow(format!("revision {revision} out of range")))
}

#[async_trait]
impl Catalog for PostgresStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, person_id, role, username, status_id FROM users WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_person(&self, id: PersonId) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, first_name, last_name FROM persons WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Person {
                id: PersonId::new(row.try_get("id")?),
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
            })),
            None => Ok(None),
        }
    }

    async fn find_table(&self, id: TableId) -> Result<Option<Table>> {
        let row = sqlx::query("SELECT id, label FROM dining_tables WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_table).transpose()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, type_id, name, price_cents, status_id FROM products WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn find_product_type(&self, id: ProductTypeId) -> Result<Option<ProductType>> {
        let row = sqlx::query("SELECT id, name FROM product_types WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product_type).transpose()
    }

    async fn list_tables(&self) -> Result<Vec<Table>> {
        let rows = sqlx::query("SELECT id, label FROM dining_tables ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_table).collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, type_id, name, price_cents, status_id FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn list_product_types(&self) -> Result<Vec<ProductType>> {
        let rows = sqlx::query("SELECT id, name FROM product_types ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product_type).collect()
    }

    async fn list_statuses(&self) -> Result<Vec<StatusRow>> {
        let rows = sqlx::query("SELECT id, name FROM statuses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(StatusRow {
                    id: StatusId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn persist_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> Result<OrderId> {
        validate_new_order(&lines)?;

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (creator_id, table_id, status_id, created_at, revision)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(order.creator_id.as_i64())
        .bind(order.table_id.as_i64())
        .bind(order.status_id.as_i64())
        .bind(order.created_at)
        .bind(revision_to_i64(Revision::first())?)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                StoreError::InvalidOrder(format!("quantity {} is too large", line.quantity))
            })?;

            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, product_id, quantity, notes, unit_price_cents, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id)
            .bind(line.product_id.as_i64())
            .bind(quantity)
            .bind(&line.notes)
            .bind(line.unit_price.cents())
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(OrderId::new(id))
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status_id: StatusId,
        expected_revision: Option<Revision>,
    ) -> Result<Revision> {
        let expected = expected_revision.map(revision_to_i64).transpose()?;

        let updated: Option<PgRow> = sqlx::query(
            r#"
            UPDATE orders
            SET status_id = $2, revision = revision + 1
            WHERE id = $1 AND ($3::BIGINT IS NULL OR revision = $3)
            RETURNING revision
            "#,
        )
        .bind(order_id.as_i64())
        .bind(status_id.as_i64())
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Self::row_to_revision(&row);
        }

        // Nothing matched: either the order is gone or the revision moved on
        let current: Option<PgRow> = sqlx::query("SELECT revision FROM orders WHERE id = $1")
            .bind(order_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match current {
            None => Err(StoreError::OrderNotFound(order_id)),
            Some(row) => {
                let actual = Self::row_to_revision(&row)?;
                Err(StoreError::Conflict {
                    order_id,
                    expected: expected_revision.unwrap_or(actual),
                    actual,
                })
            }
        }
    }

    async fn delete_order_cascade(&self, order_id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order_id));
        }
        Ok(())
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<RawOrder>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut order = Self::row_to_order(&row)?;
        order.lines = self.lines_for(order_id).await?;
        Ok(Some(order))
    }

    async fn fetch_all_orders(&self) -> Result<Vec<RawOrder>> {
        // Both reads in one transaction so lines match their orders
        let mut tx = self.pool.begin().await?;

        let order_rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&mut *tx)
        .await?;

        let line_rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines ORDER BY order_id ASC, position ASC"
        ))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut lines: HashMap<OrderId, Vec<RawOrderLine>> = HashMap::new();
        for row in &line_rows {
            let line = Self::row_to_line(row)?;
            lines.entry(line.order_id).or_default().push(line);
        }

        order_rows
            .iter()
            .map(|row| {
                let mut order = Self::row_to_order(row)?;
                order.lines = lines.remove(&order.id).unwrap_or_default();
                Ok(order)
            })
            .collect()
    }
}
