//! Order lifecycle state machine
//!
//! ```text
//! Placed(0) -> Preparing(1) -> Baking(2) -> OutForDelivery(3) -> Delivered(4)
//!     \______________\_____________\_______________\
//!                                                   -> Cancelled(-1)
//! ```
//!
//! Delivered and Cancelled are terminal. Stages only move forward; whether
//! an administrator may skip stages is decided by [`TransitionPolicy`].

use chrono::{DateTime, Utc};
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, Stage, StatusEntry};
use thiserror::Error;

use crate::auth::RequesterContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    /// Require `target == current + 1` (cancellation excepted)
    pub strict_stepping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Stage {0} is not a valid order stage")]
    InvalidStage(i64),

    #[error("Order is already {0}")]
    AlreadyTerminal(Stage),

    #[error("Order is already at stage {0}")]
    AlreadyAtStage(Stage),

    #[error("Cannot move order back from {from} to {to}")]
    BackwardTransition { from: Stage, to: Stage },

    #[error("Cannot skip from {from} to {to}")]
    StageSkipped { from: Stage, to: Stage },

    #[error("Order can only be cancelled before preparation starts (currently {0})")]
    CannotCancelAfterPreparation(Stage),

    #[error("Order belongs to another customer")]
    NotOwner,
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::InvalidStage(stage) => {
                AppError::with_message(ErrorCode::OrderInvalidStage, message)
                    .with_detail("stage", stage)
            }
            LifecycleError::AlreadyTerminal(stage) => {
                AppError::with_message(ErrorCode::OrderAlreadyTerminal, message)
                    .with_detail("currentStage", stage.value())
            }
            LifecycleError::AlreadyAtStage(stage) => {
                AppError::with_message(ErrorCode::OrderAlreadyAtStage, message)
                    .with_detail("currentStage", stage.value())
            }
            LifecycleError::BackwardTransition { from, to } => {
                AppError::with_message(ErrorCode::OrderBackwardTransition, message)
                    .with_detail("from", from.value())
                    .with_detail("to", to.value())
            }
            LifecycleError::StageSkipped { from, to } => {
                AppError::with_message(ErrorCode::OrderStageSkipped, message)
                    .with_detail("from", from.value())
                    .with_detail("to", to.value())
            }
            LifecycleError::CannotCancelAfterPreparation(stage) => {
                AppError::with_message(ErrorCode::OrderCannotCancel, message)
                    .with_detail("currentStage", stage.value())
            }
            LifecycleError::NotOwner => AppError::permission_denied(message),
        }
    }
}

/// Move `order` to `target`
///
/// Appends a history entry on every committed transition, stamps
/// `actual_delivery_time` on delivery and `cancelled_at` on cancellation.
pub fn advance(
    order: &mut Order,
    target: i64,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    let target = Stage::try_from(target).map_err(|e| LifecycleError::InvalidStage(e.0))?;
    let current = order.current_stage;

    if current.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal(current));
    }
    if target == current {
        return Err(LifecycleError::AlreadyAtStage(current));
    }
    if target != Stage::Cancelled {
        if target < current {
            return Err(LifecycleError::BackwardTransition {
                from: current,
                to: target,
            });
        }
        if policy.strict_stepping && current.next() != Some(target) {
            return Err(LifecycleError::StageSkipped {
                from: current,
                to: target,
            });
        }
    }

    order.current_stage = target;
    order.status = target.name().to_string();
    order.status_history.push(StatusEntry::new(target, now));

    match target {
        Stage::Delivered if order.actual_delivery_time.is_none() => {
            order.actual_delivery_time = Some(now);
        }
        Stage::Cancelled => order.cancelled_at = Some(now),
        _ => {}
    }
    Ok(())
}

/// Customer-initiated cancel
///
/// Only the owner (or an admin) may cancel, and only while the order is
/// still `Placed`. Guest orders are cancellable by guest requesters holding
/// the order id.
pub fn cancel_by_customer(
    order: &mut Order,
    ctx: &RequesterContext,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if !ctx.is_admin && !order.is_owned_by(ctx.user_id()) {
        return Err(LifecycleError::NotOwner);
    }
    if order.current_stage != Stage::Placed || order.status == Stage::Cancelled.name() {
        return Err(LifecycleError::CannotCancelAfterPreparation(
            order.current_stage,
        ));
    }
    advance(
        order,
        Stage::Cancelled.value().into(),
        TransitionPolicy::default(),
        now,
    )
}
