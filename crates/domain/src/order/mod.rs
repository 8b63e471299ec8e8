//! Orders: statuses, lifecycle, assembly and the service that mutates them.

mod builder;
mod commands;
mod lifecycle;
mod service;
mod status;

pub use builder::{AggregateBuilder, CompletedOrder, OrderCreator, ResolvedLine};
pub use commands::*;
pub use lifecycle::{DenyReason, TransitionDecision, allowed_targets, check_transition};
pub use service::OrderService;
pub use status::{OrderStatus, StatusMeaning, StatusVocabulary};
