//! Order service: the sole writer of order state.

use std::collections::HashSet;

use chrono::Utc;
use common::{OrderId, Role};
use order_store::{Catalog, MAX_LINE_QUANTITY, NewOrder, NewOrderLine, OrderStore};

use super::{
    AggregateBuilder, CompletedOrder, CreateOrder, DeleteOrder, StatusVocabulary,
    TransitionDecision, TransitionStatus, check_transition,
};
use crate::error::{DomainError, ValidationError};

/// Service for managing orders.
///
/// Validates every mutation against the catalog and the lifecycle before
/// handing it to the store, and returns the rebuilt [`CompletedOrder`] after
/// each write so callers never depend on a cached copy.
pub struct OrderService<S> {
    store: S,
}

impl<S: Catalog + OrderStore> OrderService<S> {
    /// Creates a new order service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the status vocabulary from the catalog.
    pub async fn vocabulary(&self) -> Result<StatusVocabulary, DomainError> {
        let rows = self.store.list_statuses().await?;
        StatusVocabulary::from_rows(&rows)
    }

    /// Creates an order with all of its lines.
    ///
    /// The order starts as `Pending`, or `Created` for drafts. Every line's
    /// unit price is copied from the catalog at this moment.
    #[tracing::instrument(skip(self, cmd), fields(creator_id = %cmd.creator_id, table_id = %cmd.table_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<CompletedOrder, DomainError> {
        validate_lines(&cmd)?;
        let vocabulary = self.vocabulary().await?;

        let creator = self
            .store
            .find_user(cmd.creator_id)
            .await?
            .ok_or(ValidationError::UnknownCreator {
                user_id: cmd.creator_id,
            })?;
        if !vocabulary.is_active(creator.status_id) {
            return Err(ValidationError::InactiveCreator {
                user_id: creator.id,
            }
            .into());
        }
        if creator.role == Role::Kitchen {
            return Err(DomainError::InsufficientRole {
                role: creator.role,
                action: "create orders",
            });
        }

        if self.store.find_table(cmd.table_id).await?.is_none() {
            return Err(ValidationError::UnknownTable {
                table_id: cmd.table_id,
            }
            .into());
        }

        let mut lines = Vec::with_capacity(cmd.lines.len());
        for request in &cmd.lines {
            let product = self
                .store
                .find_product(request.product_id)
                .await?
                .ok_or(ValidationError::UnknownProduct {
                    product_id: request.product_id,
                })?;
            if !vocabulary.is_active(product.status_id) {
                return Err(ValidationError::InactiveProduct {
                    product_id: product.id,
                }
                .into());
            }
            lines.push(NewOrderLine {
                product_id: product.id,
                quantity: request.quantity,
                notes: request.notes.clone(),
                unit_price: product.price,
            });
        }

        let status = cmd.initial_status();
        let order_id = self
            .store
            .persist_order(
                NewOrder {
                    creator_id: creator.id,
                    table_id: cmd.table_id,
                    status_id: vocabulary.id_of(status),
                    created_at: Utc::now(),
                },
                lines,
            )
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, %status, line_count = cmd.lines.len(), "order created");

        self.load(&vocabulary, order_id).await
    }

    /// Moves an order to `cmd.target` if the lifecycle allows it for
    /// `cmd.acting_role`.
    ///
    /// The current status is re-read right before validation, and the write
    /// is conditional on the revision that was read, so two racing calls
    /// cannot both succeed from the same starting point.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id, target = %cmd.target, role = %cmd.acting_role))]
    pub async fn transition_status(
        &self,
        cmd: TransitionStatus,
    ) -> Result<CompletedOrder, DomainError> {
        let vocabulary = self.vocabulary().await?;

        let raw = self
            .store
            .fetch_order(cmd.order_id)
            .await?
            .ok_or_else(|| DomainError::order_not_found(cmd.order_id))?;

        if let Some(expected) = cmd.expected_revision
            && expected != raw.revision
        {
            metrics::counter!("order_conflicts_total").increment(1);
            tracing::warn!(%expected, actual = %raw.revision, "stale revision");
            return Err(DomainError::Conflict {
                order_id: cmd.order_id,
                expected,
                actual: raw.revision,
            });
        }

        let current = vocabulary.order_status(raw.status_id).ok_or_else(|| {
            DomainError::Integrity(format!(
                "order {}: status {} is not an order status",
                raw.id, raw.status_id
            ))
        })?;

        if let TransitionDecision::Denied(reason) =
            check_transition(current, cmd.target, cmd.acting_role)
        {
            metrics::counter!("order_transitions_denied_total", "reason" => reason.kind())
                .increment(1);
            tracing::warn!(%current, %reason, "transition denied");
            return Err(DomainError::TransitionDenied(reason));
        }

        self.store
            .update_order_status(
                cmd.order_id,
                vocabulary.id_of(cmd.target),
                Some(raw.revision),
            )
            .await
            .inspect_err(|e| {
                if matches!(e, order_store::StoreError::Conflict { .. }) {
                    metrics::counter!("order_conflicts_total").increment(1);
                    tracing::warn!(error = %e, "order changed during transition");
                }
            })?;

        metrics::counter!("order_transitions_total", "to" => cmd.target.as_str()).increment(1);
        tracing::info!(from = %current, "order status changed");

        self.load(&vocabulary, cmd.order_id).await
    }

    /// Deletes an order and its lines. Admin only.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id, role = %cmd.acting_role))]
    pub async fn delete_order(&self, cmd: DeleteOrder) -> Result<(), DomainError> {
        if cmd.acting_role != Role::Admin {
            tracing::warn!("order deletion refused");
            return Err(DomainError::InsufficientRole {
                role: cmd.acting_role,
                action: "delete orders",
            });
        }

        self.store.delete_order_cascade(cmd.order_id).await?;

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!("order deleted");
        Ok(())
    }

    /// Loads one order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<CompletedOrder, DomainError> {
        let vocabulary = self.vocabulary().await?;
        self.load(&vocabulary, order_id).await
    }

    /// Loads every order, newest first. No role filtering happens here.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<CompletedOrder>, DomainError> {
        let vocabulary = self.vocabulary().await?;
        let raws = self.store.fetch_all_orders().await?;
        AggregateBuilder::new(&self.store, &vocabulary)
            .build_all(raws)
            .await
    }

    async fn load(
        &self,
        vocabulary: &StatusVocabulary,
        order_id: OrderId,
    ) -> Result<CompletedOrder, DomainError> {
        let raw = self
            .store
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| DomainError::order_not_found(order_id))?;
        AggregateBuilder::new(&self.store, vocabulary)
            .build(raw)
            .await
    }
}

fn validate_lines(cmd: &CreateOrder) -> Result<(), ValidationError> {
    if cmd.lines.is_empty() {
        return Err(ValidationError::NoLines);
    }

    let mut seen = HashSet::with_capacity(cmd.lines.len());
    for line in &cmd.lines {
        if line.quantity == 0 {
            return Err(ValidationError::ZeroQuantity {
                product_id: line.product_id,
            });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::QuantityTooLarge {
                product_id: line.product_id,
                quantity: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if !seen.insert(line.product_id) {
            return Err(ValidationError::DuplicateProduct {
                product_id: line.product_id,
            });
        }
    }

    Ok(())
}
