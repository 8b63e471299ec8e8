//! Assembles persisted orders into the denormalized view every dashboard
//! reads.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, ProductTypeId, Revision, Role, StatusId, TableId, UserId};
use order_store::{Catalog, Product, ProductType, RawOrder, RawOrderLine, Table};
use serde::Serialize;

use super::{OrderStatus, StatusVocabulary};
use crate::error::DomainError;

/// The user who placed an order, resolved down to the person's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreator {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

/// A line item with its product resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_type_id: ProductTypeId,
    pub product_type: String,
    pub quantity: u32,
    pub notes: Option<String>,
    /// Price per unit, frozen when the order was placed.
    pub unit_price: Money,
}

impl ResolvedLine {
    /// Returns `unit_price * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// The read-only, fully resolved view of an order.
///
/// Rebuilt from the store on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedOrder {
    pub id: OrderId,
    pub status: OrderStatus,
    pub status_id: StatusId,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
    pub table: Table,
    pub creator: OrderCreator,
    pub lines: Vec<ResolvedLine>,
}

impl CompletedOrder {
    /// Sum over the lines of `unit_price * quantity`.
    pub fn total(&self) -> Money {
        self.lines.iter().map(ResolvedLine::line_total).sum()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn table_id(&self) -> TableId {
        self.table.id
    }
}

/// Resolves [`RawOrder`]s against the catalog.
///
/// A builder memoizes the catalog rows it has already looked up, so building
/// a whole list costs one lookup per distinct user, table and product. It is
/// meant to live for a single request; create a fresh one for each.
pub struct AggregateBuilder<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    vocabulary: &'a StatusVocabulary,
    creators: HashMap<UserId, OrderCreator>,
    tables: HashMap<TableId, Table>,
    products: HashMap<ProductId, (Product, ProductType)>,
}

impl<'a, C: Catalog + ?Sized> AggregateBuilder<'a, C> {
    pub fn new(catalog: &'a C, vocabulary: &'a StatusVocabulary) -> Self {
        Self {
            catalog,
            vocabulary,
            creators: HashMap::new(),
            tables: HashMap::new(),
            products: HashMap::new(),
        }
    }

    /// Builds the view of a single order.
    ///
    /// Fails with [`DomainError::Integrity`] if the order references a user,
    /// person, table, product, product type or status that no longer exists,
    /// or if the stored order breaks the line invariants.
    pub async fn build(&mut self, raw: RawOrder) -> Result<CompletedOrder, DomainError> {
        let status = self.vocabulary.order_status(raw.status_id).ok_or_else(|| {
            integrity(raw.id, format!("status {} is not an order status", raw.status_id))
        })?;

        if raw.lines.is_empty() {
            return Err(integrity(raw.id, "order has no lines".to_string()));
        }

        let creator = self.creator(raw.id, raw.creator_id).await?;
        let table = self.table(raw.id, raw.table_id).await?;

        let mut lines = Vec::with_capacity(raw.lines.len());
        for line in raw.lines {
            lines.push(self.line(raw.id, line).await?);
        }

        Ok(CompletedOrder {
            id: raw.id,
            status,
            status_id: raw.status_id,
            revision: raw.revision,
            created_at: raw.created_at,
            table,
            creator,
            lines,
        })
    }

    /// Builds the views of many orders, preserving their order.
    pub async fn build_all(
        &mut self,
        raws: Vec<RawOrder>,
    ) -> Result<Vec<CompletedOrder>, DomainError> {
        let start = Instant::now();

        let mut orders = Vec::with_capacity(raws.len());
        for raw in raws {
            orders.push(self.build(raw).await?);
        }

        metrics::histogram!("order_build_duration_seconds").record(start.elapsed().as_secs_f64());
        Ok(orders)
    }

    async fn creator(
        &mut self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<OrderCreator, DomainError> {
        if let Some(creator) = self.creators.get(&user_id) {
            return Ok(creator.clone());
        }

        let user = self
            .catalog
            .find_user(user_id)
            .await?
            .ok_or_else(|| integrity(order_id, format!("creator {user_id} does not exist")))?;
        let person = self
            .catalog
            .find_person(user.person_id)
            .await?
            .ok_or_else(|| {
                integrity(
                    order_id,
                    format!("person {} of user {user_id} does not exist", user.person_id),
                )
            })?;

        let creator = OrderCreator {
            id: user.id,
            username: user.username,
            display_name: person.display_name(),
            role: user.role,
        };
        self.creators.insert(user_id, creator.clone());
        Ok(creator)
    }

    async fn table(&mut self, order_id: OrderId, table_id: TableId) -> Result<Table, DomainError> {
        if let Some(table) = self.tables.get(&table_id) {
            return Ok(table.clone());
        }

        let table = self
            .catalog
            .find_table(table_id)
            .await?
            .ok_or_else(|| integrity(order_id, format!("table {table_id} does not exist")))?;
        self.tables.insert(table_id, table.clone());
        Ok(table)
    }

    async fn line(
        &mut self,
        order_id: OrderId,
        line: RawOrderLine,
    ) -> Result<ResolvedLine, DomainError> {
        if line.quantity == 0 {
            return Err(integrity(
                order_id,
                format!("line for product {} has quantity 0", line.product_id),
            ));
        }

        let (product, product_type) = match self.products.get(&line.product_id) {
            Some(resolved) => resolved.clone(),
            None => {
                let product = self
                    .catalog
                    .find_product(line.product_id)
                    .await?
                    .ok_or_else(|| {
                        integrity(
                            order_id,
                            format!("product {} does not exist", line.product_id),
                        )
                    })?;
                let product_type = self
                    .catalog
                    .find_product_type(product.type_id)
                    .await?
                    .ok_or_else(|| {
                        integrity(
                            order_id,
                            format!(
                                "type {} of product {} does not exist",
                                product.type_id, product.id
                            ),
                        )
                    })?;
                self.products
                    .insert(line.product_id, (product.clone(), product_type.clone()));
                (product, product_type)
            }
        };

        Ok(ResolvedLine {
            product_id: product.id,
            product_name: product.name,
            product_type_id: product_type.id,
            product_type: product_type.name,
            quantity: line.quantity,
            notes: line.notes,
            unit_price: line.unit_price,
        })
    }
}

fn integrity(order_id: OrderId, detail: String) -> DomainError {
    tracing::error!(%order_id, %detail, "order references inconsistent data");
    DomainError::Integrity(format!("order {order_id}: {detail}"))
}
