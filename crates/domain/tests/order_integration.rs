//! Integration tests for the order service.
//!
//! These tests drive orders through their whole lifecycle against the
//! in-memory store, including validation, role checks, deletion and
//! concurrent status changes.

use common::{Money, OrderId, ProductId, Revision, Role, StatusId, TableId, UserId};
use domain::{
    CompletedOrder, CreateOrder, DeleteOrder, DenyReason, DomainError, OrderLineRequest,
    OrderService, OrderStatus, TransitionStatus, ValidationError,
};
use order_store::{Catalog, CatalogSeed, InMemoryStore, OrderStore, StoreError};

const WAITER: UserId = UserId::new(2);
const KITCHEN: UserId = UserId::new(4);
const ADMIN: UserId = UserId::new(1);
const INACTIVE: StatusId = StatusId::new(8);

/// Helper to create a test order service
fn create_service() -> OrderService<InMemoryStore> {
    OrderService::new(InMemoryStore::with_catalog(CatalogSeed::demo()))
}

async fn price_of(service: &OrderService<InMemoryStore>, id: i64) -> Money {
    service
        .store()
        .find_product(ProductId::new(id))
        .await
        .unwrap()
        .unwrap()
        .price
}

async fn place(service: &OrderService<InMemoryStore>, products: &[i64]) -> CompletedOrder {
    let lines = products
        .iter()
        .map(|id| OrderLineRequest::new(ProductId::new(*id), 1))
        .collect();
    service
        .create_order(CreateOrder::new(WAITER, TableId::new(5), lines))
        .await
        .unwrap()
}

async fn advance(
    service: &OrderService<InMemoryStore>,
    order_id: OrderId,
    steps: &[(OrderStatus, Role)],
) -> CompletedOrder {
    let mut last = None;
    for (target, role) in steps {
        last = Some(
            service
                .transition_status(TransitionStatus::new(order_id, *target, *role))
                .await
                .unwrap(),
        );
    }
    last.expect("at least one step")
}

const TO_DELIVERED: [(OrderStatus, Role); 3] = [
    (OrderStatus::InPreparation, Role::Kitchen),
    (OrderStatus::Ready, Role::Kitchen),
    (OrderStatus::Delivered, Role::Waiter),
];

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn waiter_creates_order_with_expected_total() {
        let service = create_service();

        let order = service
            .create_order(CreateOrder::new(
                WAITER,
                TableId::new(5),
                vec![
                    OrderLineRequest::new(ProductId::new(3), 2),
                    OrderLineRequest::new(ProductId::new(7), 1),
                ],
            ))
            .await
            .unwrap();

        let expected = price_of(&service, 3).await.multiply(2) + price_of(&service, 7).await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total(), expected);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.revision, Revision::first());
    }

    #[tokio::test]
    async fn complete_order_lifecycle() {
        let service = create_service();
        let order = service
            .create_order(
                CreateOrder::new(
                    WAITER,
                    TableId::new(2),
                    vec![OrderLineRequest::new(ProductId::new(1), 1)],
                )
                .as_draft(),
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Created);

        let order = advance(
            &service,
            order.id,
            &[(OrderStatus::Pending, Role::Waiter)],
        )
        .await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.revision, Revision::new(2));

        let order = advance(&service, order.id, &TO_DELIVERED).await;
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.revision, Revision::new(5));
        assert!(order.status.is_terminal());
    }

    #[tokio::test]
    async fn admin_cancels_from_any_open_status() {
        let service = create_service();

        for steps in [
            &[][..],
            &[(OrderStatus::InPreparation, Role::Kitchen)][..],
            &TO_DELIVERED[..2],
        ] {
            let order = place(&service, &[1]).await;
            if !steps.is_empty() {
                advance(&service, order.id, steps).await;
            }
            let cancelled = service
                .transition_status(TransitionStatus::new(
                    order.id,
                    OrderStatus::Cancelled,
                    Role::Admin,
                ))
                .await
                .unwrap();
            assert_eq!(cancelled.status, OrderStatus::Cancelled);
        }
    }

    #[tokio::test]
    async fn transition_returns_fresh_order() {
        let service = create_service();
        let order = place(&service, &[1, 13]).await;

        let updated = advance(
            &service,
            order.id,
            &[(OrderStatus::InPreparation, Role::Kitchen)],
        )
        .await;
        let reloaded = service.get_order(order.id).await.unwrap();

        assert_eq!(updated, reloaded);
        assert_eq!(updated.lines, order.lines);
    }
}

mod denials {
    use super::*;

    #[tokio::test]
    async fn delivered_order_rejects_kitchen_step() {
        let service = create_service();
        let order = place(&service, &[1]).await;
        let delivered = advance(&service, order.id, &TO_DELIVERED).await;

        let result = service
            .transition_status(TransitionStatus::new(
                order.id,
                OrderStatus::Ready,
                Role::Kitchen,
            ))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::TransitionDenied(DenyReason::TerminalState {
                status: OrderStatus::Delivered
            }))
        ));
        assert_eq!(service.get_order(order.id).await.unwrap(), delivered);
    }

    #[tokio::test]
    async fn waiter_cannot_cancel() {
        let service = create_service();
        let order = place(&service, &[1]).await;

        let result = service
            .transition_status(TransitionStatus::new(
                order.id,
                OrderStatus::Cancelled,
                Role::Waiter,
            ))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::TransitionDenied(
                DenyReason::InsufficientRole { .. }
            ))
        ));
        assert_eq!(service.get_order(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn repeating_a_transition_is_illegal() {
        let service = create_service();
        let order = place(&service, &[1]).await;

        let first = advance(
            &service,
            order.id,
            &[(OrderStatus::InPreparation, Role::Kitchen)],
        )
        .await;
        let second = service
            .transition_status(TransitionStatus::new(
                order.id,
                OrderStatus::InPreparation,
                Role::Kitchen,
            ))
            .await;

        assert!(matches!(
            second,
            Err(DomainError::TransitionDenied(
                DenyReason::IllegalProgression { .. }
            ))
        ));
        let current = service.get_order(order.id).await.unwrap();
        assert_eq!(current.status, OrderStatus::InPreparation);
        assert_eq!(current.revision, first.revision);
    }

    #[tokio::test]
    async fn transition_on_missing_order() {
        let service = create_service();
        let result = service
            .transition_status(TransitionStatus::new(
                OrderId::new(404),
                OrderStatus::Ready,
                Role::Admin,
            ))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}

mod creation_validation {
    use super::*;

    #[tokio::test]
    async fn inactive_product_is_rejected() {
        let service = create_service();
        let mut product = service
            .store()
            .find_product(ProductId::new(16))
            .await
            .unwrap()
            .unwrap();
        product.status_id = INACTIVE;
        service.store().upsert_product(product).await;

        let result = service
            .create_order(CreateOrder::new(
                WAITER,
                TableId::new(1),
                vec![OrderLineRequest::new(ProductId::new(16), 1)],
            ))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::InactiveProduct { .. }))
        ));
        assert_eq!(service.store().order_count().await, 0);
    }

    #[tokio::test]
    async fn inactive_creator_is_rejected() {
        let service = create_service();
        let mut user = service.store().find_user(WAITER).await.unwrap().unwrap();
        user.status_id = INACTIVE;
        service.store().upsert_user(user).await;

        let result = service
            .create_order(CreateOrder::new(
                WAITER,
                TableId::new(1),
                vec![OrderLineRequest::new(ProductId::new(1), 1)],
            ))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::InactiveCreator { .. }))
        ));
    }

    #[tokio::test]
    async fn duplicate_product_lines_are_rejected() {
        let service = create_service();

        let result = service
            .create_order(CreateOrder::new(
                ADMIN,
                TableId::new(1),
                vec![
                    OrderLineRequest::new(ProductId::new(1), 1),
                    OrderLineRequest::new(ProductId::new(1), 2),
                ],
            ))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::DuplicateProduct { .. }))
        ));
    }

    #[tokio::test]
    async fn kitchen_user_cannot_place_orders() {
        let service = create_service();

        let result = service
            .create_order(CreateOrder::new(
                KITCHEN,
                TableId::new(1),
                vec![OrderLineRequest::new(ProductId::new(1), 1)],
            ))
            .await;

        assert!(matches!(result, Err(DomainError::InsufficientRole { .. })));
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn built_order_matches_what_was_placed() {
        let service = create_service();

        let order = service
            .create_order(CreateOrder::new(
                WAITER,
                TableId::new(9),
                vec![
                    OrderLineRequest::new(ProductId::new(2), 3).with_notes("extra cheese"),
                    OrderLineRequest::new(ProductId::new(15), 2),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(order.table.id, TableId::new(9));
        assert_eq!(order.table.label, "Table 9");
        assert_eq!(order.creator.id, WAITER);
        assert_eq!(order.creator.display_name, "Maria Gonzalez");

        let shape: Vec<_> = order
            .lines
            .iter()
            .map(|l| (l.product_id, l.quantity, l.notes.as_deref()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (ProductId::new(2), 3, Some("extra cheese")),
                (ProductId::new(15), 2, None),
            ]
        );
    }

    #[tokio::test]
    async fn price_is_frozen_at_creation() {
        let service = create_service();
        let order = place(&service, &[1]).await;
        let original_total = order.total();

        let mut product = service
            .store()
            .find_product(ProductId::new(1))
            .await
            .unwrap()
            .unwrap();
        product.price = product.price + Money::from_cents(99_900);
        service.store().upsert_product(product).await;

        let reloaded = service.get_order(order.id).await.unwrap();
        assert_eq!(reloaded.total(), original_total);

        let newer = place(&service, &[1]).await;
        assert_ne!(newer.total(), original_total);
    }

    #[tokio::test]
    async fn list_orders_is_newest_first() {
        let service = create_service();
        let first = place(&service, &[1]).await;
        let second = place(&service, &[2]).await;
        let third = place(&service, &[3]).await;

        let ids: Vec<_> = service
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();

        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn admin_delete_removes_order_and_lines() {
        let service = create_service();
        let keep = place(&service, &[4]).await;
        let doomed = place(&service, &[1, 2, 3]).await;
        assert_eq!(service.store().line_count().await, 4);

        service
            .delete_order(DeleteOrder::new(doomed.id, Role::Admin))
            .await
            .unwrap();

        let remaining = service.list_orders().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
        assert_eq!(service.store().line_count().await, 1);
        assert!(matches!(
            service.get_order(doomed.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn dangling_product_is_an_integrity_error() {
        let service = create_service();
        let order = place(&service, &[5]).await;

        service.store().remove_product(ProductId::new(5)).await;

        assert!(matches!(
            service.get_order(order.id).await,
            Err(DomainError::Integrity(_))
        ));
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn racing_transitions_from_same_revision() {
        let service = create_service();
        let order = place(&service, &[1]).await;

        let start = TransitionStatus::new(order.id, OrderStatus::InPreparation, Role::Kitchen)
            .expecting(order.revision);
        let cancel = TransitionStatus::new(order.id, OrderStatus::Cancelled, Role::Admin)
            .expecting(order.revision);

        let (a, b) = futures_util::future::join(
            service.transition_status(start),
            service.transition_status(cancel),
        )
        .await;

        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(DomainError::Conflict { .. })))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);

        let current = service.get_order(order.id).await.unwrap();
        assert_eq!(current.revision, Revision::new(2));
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let service = create_service();
        let order = place(&service, &[1]).await;
        advance(
            &service,
            order.id,
            &[(OrderStatus::InPreparation, Role::Kitchen)],
        )
        .await;

        let result = service
            .transition_status(
                TransitionStatus::new(order.id, OrderStatus::Ready, Role::Kitchen)
                    .expecting(order.revision),
            )
            .await;

        match result {
            Err(DomainError::Conflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Revision::first());
                assert_eq!(actual, Revision::new(2));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_rejects_write_at_old_revision() {
        let service = create_service();
        let order = place(&service, &[1]).await;
        let vocabulary = service.vocabulary().await.unwrap();
        let in_prep = vocabulary.id_of(OrderStatus::InPreparation);

        let next = service
            .store()
            .update_order_status(order.id, in_prep, Some(order.revision))
            .await
            .unwrap();
        assert_eq!(next, Revision::new(2));

        let stale = service
            .store()
            .update_order_status(order.id, in_prep, Some(order.revision))
            .await;
        assert!(matches!(stale, Err(StoreError::Conflict { .. })));
    }
}
