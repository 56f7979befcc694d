//! Order fulfillment state machine
//!
//! Lifecycle: processando -> confirmado -> enviado -> entregue, with
//! cancelado reachable from any non-terminal state. `entregue` and
//! `cancelado` are terminal.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

use crate::db;
use crate::error::{AppError, ErrorCode, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Processando,
    Confirmado,
    Enviado,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processando => "processando",
            Self::Confirmado => "confirmado",
            Self::Enviado => "enviado",
            Self::Entregue => "entregue",
            Self::Cancelado => "cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Entregue | Self::Cancelado)
    }

    /// Whether an order may move from `self` to `next`.
    pub fn can_transition(&self, next: OrderStatus) -> bool {
        if next == Self::Cancelado {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Self::Processando, Self::Confirmado)
                | (Self::Confirmado, Self::Enviado)
                | (Self::Enviado, Self::Entregue)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processando" => Ok(Self::Processando),
            "confirmado" => Ok(Self::Confirmado),
            "enviado" => Ok(Self::Enviado),
            "entregue" => Ok(Self::Entregue),
            "cancelado" => Ok(Self::Cancelado),
            other => Err(AppError::new(ErrorCode::InvalidStatus).with_detail("status", other)),
        }
    }
}

/// Advance an order's status on behalf of a seller.
///
/// Authorization goes through the order line / product join: the seller must
/// own at least one line of the order. Ownership is checked before the
/// transition so an unrelated seller gets PermissionDenied, not a state error.
pub async fn set_status(
    pool: &SqlitePool,
    order_id: i64,
    seller_id: i64,
    next: OrderStatus,
) -> Result<db::orders::Order, ServiceError> {
    let order = db::orders::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if !db::orders::seller_owns_line(pool, order_id, seller_id).await? {
        return Err(AppError::permission_denied("Order does not contain your products").into());
    }

    if !order.status.can_transition(next) {
        return Err(AppError::new(ErrorCode::InvalidStatusTransition)
            .with_detail("from", order.status.as_str())
            .with_detail("to", next.as_str())
            .into());
    }

    let updated = db::orders::set_status_guarded(pool, order_id, order.status, next).await?;
    if updated == 0 {
        // Lost a race with a concurrent transition
        return Err(AppError::new(ErrorCode::InvalidStatusTransition)
            .with_detail("to", next.as_str())
            .into());
    }

    tracing::info!(order_id, from = %order.status, to = %next, "Order status updated");

    let order = db::orders::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(order)
}

/// Apply a payment gateway outcome to an order.
///
/// Only acts on orders still in `processando`; repeated notifications for the
/// same charge are no-ops.
pub async fn apply_gateway_status(
    pool: &SqlitePool,
    order_id: i64,
    next: OrderStatus,
) -> Result<(), ServiceError> {
    let Some(order) = db::orders::find_by_id(pool, order_id).await? else {
        tracing::warn!(order_id, "Gateway notification for unknown order");
        return Ok(());
    };

    if order.status != OrderStatus::Processando || !order.status.can_transition(next) {
        tracing::debug!(order_id, status = %order.status, "Gateway notification ignored");
        return Ok(());
    }

    db::orders::set_status_guarded(pool, order_id, order.status, next).await?;
    tracing::info!(order_id, to = %next, "Order status updated from gateway notification");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        use OrderStatus::*;
        assert!(Processando.can_transition(Confirmado));
        assert!(Confirmado.can_transition(Enviado));
        assert!(Enviado.can_transition(Entregue));
    }

    #[test]
    fn test_no_skipping_or_rewinding() {
        use OrderStatus::*;
        assert!(!Processando.can_transition(Enviado));
        assert!(!Processando.can_transition(Entregue));
        assert!(!Confirmado.can_transition(Processando));
        assert!(!Entregue.can_transition(Enviado));
        assert!(!Enviado.can_transition(Confirmado));
    }

    #[test]
    fn test_cancel_from_non_terminal() {
        use OrderStatus::*;
        assert!(Processando.can_transition(Cancelado));
        assert!(Confirmado.can_transition(Cancelado));
        assert!(Enviado.can_transition(Cancelado));
    }

    #[test]
    fn test_terminal_states() {
        use OrderStatus::*;
        assert!(Entregue.is_terminal());
        assert!(Cancelado.is_terminal());
        assert!(!Entregue.can_transition(Cancelado));
        assert!(!Cancelado.can_transition(Confirmado));
        assert!(!Cancelado.can_transition(Cancelado));
    }

    #[test]
    fn test_self_transition_rejected() {
        use OrderStatus::*;
        for s in [Processando, Confirmado, Enviado, Entregue, Cancelado] {
            assert!(!s.can_transition(s));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            OrderStatus::from_str("enviado").unwrap(),
            OrderStatus::Enviado
        );
        let err = OrderStatus::from_str("despachado").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
    }

    #[test]
    fn test_serde_wire_values() {
        let json = serde_json::to_string(&OrderStatus::Processando).unwrap();
        assert_eq!(json, "\"processando\"");
        let status: OrderStatus = serde_json::from_str("\"cancelado\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelado);
    }
}
