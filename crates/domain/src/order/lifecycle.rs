//! Order lifecycle: which status transitions are legal for which role.
//!
//! The permission table below is the single source of truth. It is written
//! out explicitly rather than derived from the status ordering, since which
//! role may perform which step is business policy.

use common::Role;
use serde::Serialize;
use thiserror::Error;

use super::OrderStatus::{self, Cancelled, Created, Delivered, InPreparation, Pending, Ready};

/// One legal edge of the lifecycle and the roles allowed to take it.
#[derive(Debug, Clone, Copy)]
struct Rule {
    from: OrderStatus,
    to: OrderStatus,
    kitchen: bool,
    waiter: bool,
    admin: bool,
}

impl Rule {
    const fn new(
        from: OrderStatus,
        to: OrderStatus,
        kitchen: bool,
        waiter: bool,
        admin: bool,
    ) -> Self {
        Self {
            from,
            to,
            kitchen,
            waiter,
            admin,
        }
    }

    fn allows(&self, role: Role) -> bool {
        match role {
            Role::Kitchen => self.kitchen,
            Role::Waiter => self.waiter,
            Role::Admin => self.admin,
        }
    }
}

#[rustfmt::skip]
const RULES: [Rule; 8] = [
    //        from           to             kitchen waiter admin
    Rule::new(Created,       Pending,       false, true,  true),
    Rule::new(Pending,       InPreparation, true,  false, true),
    Rule::new(InPreparation, Ready,         true,  false, true),
    Rule::new(Ready,         Delivered,     false, true,  true),
    Rule::new(Created,       Cancelled,     false, false, true),
    Rule::new(Pending,       Cancelled,     false, false, true),
    Rule::new(InPreparation, Cancelled,     false, false, true),
    Rule::new(Ready,         Cancelled,     false, false, true),
];

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum DenyReason {
    /// The target cannot be reached from the current status.
    #[error("cannot move an order from {from} to {to}")]
    IllegalProgression { from: OrderStatus, to: OrderStatus },

    /// The step exists, but not for this role.
    #[error("role {role} may not move an order from {from} to {to}")]
    InsufficientRole {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order is delivered or cancelled.
    #[error("order is {status}, which is terminal")]
    TerminalState { status: OrderStatus },
}

impl DenyReason {
    /// Short machine-readable name, used as a metrics label and in API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DenyReason::IllegalProgression { .. } => "IllegalProgression",
            DenyReason::InsufficientRole { .. } => "InsufficientRole",
            DenyReason::TerminalState { .. } => "TerminalState",
        }
    }
}

/// Outcome of [`check_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    Allowed,
    Denied(DenyReason),
}

impl TransitionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TransitionDecision::Allowed)
    }
}

/// Decides whether `role` may move an order from `current` to `target`.
///
/// Checks run in a fixed order: a terminal current status is reported first,
/// then a missing edge, then a missing permission. Moving to the current
/// status is never legal, since the table has no self-edges.
pub fn check_transition(
    current: OrderStatus,
    target: OrderStatus,
    role: Role,
) -> TransitionDecision {
    if current.is_terminal() {
        return TransitionDecision::Denied(DenyReason::TerminalState { status: current });
    }

    let Some(rule) = RULES.iter().find(|r| r.from == current && r.to == target) else {
        return TransitionDecision::Denied(DenyReason::IllegalProgression {
            from: current,
            to: target,
        });
    };

    if rule.allows(role) {
        TransitionDecision::Allowed
    } else {
        TransitionDecision::Denied(DenyReason::InsufficientRole {
            role,
            from: current,
            to: target,
        })
    }
}

/// Every status `role` may move an order to from `current`.
pub fn allowed_targets(current: OrderStatus, role: Role) -> Vec<OrderStatus> {
    RULES
        .iter()
        .filter(|r| r.from == current && r.allows(role))
        .map(|r| r.to)
        .collect()
}
