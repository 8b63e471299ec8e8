//! Domain layer for the restaurant order tracking system.
//!
//! This crate provides:
//! - The order status lifecycle and its role permission table
//! - The status vocabulary that maps catalog status ids to meanings
//! - Assembly of persisted orders into [`CompletedOrder`] views
//! - [`OrderService`], the only component that writes order state

pub mod error;
pub mod order;

pub use error::{DomainError, ValidationError};
pub use order::{
    AggregateBuilder, CompletedOrder, CreateOrder, DeleteOrder, DenyReason, OrderCreator,
    OrderLineRequest, OrderService, OrderStatus, ResolvedLine, StatusMeaning, StatusVocabulary,
    TransitionDecision, TransitionStatus, allowed_targets, check_transition,
};
