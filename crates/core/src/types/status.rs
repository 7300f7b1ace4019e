//! Status and role enums.
//!
//! [`OrderStatus`] carries the order lifecycle rules. Admins move orders
//! forward along `Pending -> Processing -> Shipped -> Delivered` (skipping
//! steps is fine) or cancel them before they ship. Owners can only cancel
//! while the order is still `Pending`.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_status", rename_all = "PascalCase")
)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// A status change the lifecycle rules do not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Position along the fulfillment chain. `None` for `Cancelled`.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Validate an admin-initiated change from `self` to `next`.
    ///
    /// Setting the current status again is accepted as a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` for backwards moves, moves out of a
    /// terminal state and cancelling an order that has already shipped.
    pub fn admin_transition(self, next: Self) -> Result<Self, TransitionError> {
        if self == next {
            return Ok(next);
        }

        let allowed = match (self.rank(), next.rank()) {
            _ if self.is_terminal() => false,
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => matches!(self, Self::Pending | Self::Processing),
            (None, _) => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }

    /// Validate a cancellation requested by the order's owner.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` unless the order is still `Pending`.
    pub const fn cancel_by_owner(self) -> Result<Self, TransitionError> {
        match self {
            Self::Pending => Ok(Self::Cancelled),
            from => Err(TransitionError {
                from,
                to: Self::Cancelled,
            }),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    User,
    /// Manages catalog, orders and accounts.
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};
    use super::*;

    #[test]
    fn test_admin_moves_forward_and_may_skip() {
        assert_eq!(Pending.admin_transition(Processing), Ok(Processing));
        assert_eq!(Pending.admin_transition(Shipped), Ok(Shipped));
        assert_eq!(Processing.admin_transition(Delivered), Ok(Delivered));
        assert_eq!(Shipped.admin_transition(Delivered), Ok(Delivered));
    }

    #[test]
    fn test_admin_cannot_move_backwards() {
        assert!(Shipped.admin_transition(Pending).is_err());
        assert!(Processing.admin_transition(Pending).is_err());
        assert!(Delivered.admin_transition(Shipped).is_err());
    }

    #[test]
    fn test_admin_cancel_only_before_shipping() {
        assert_eq!(Pending.admin_transition(Cancelled), Ok(Cancelled));
        assert_eq!(Processing.admin_transition(Cancelled), Ok(Cancelled));
        assert_eq!(
            Shipped.admin_transition(Cancelled),
            Err(TransitionError {
                from: Shipped,
                to: Cancelled
            })
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [Pending, Processing, Shipped] {
            assert!(Cancelled.admin_transition(next).is_err());
            assert!(Delivered.admin_transition(next).is_err());
        }
        assert!(Delivered.admin_transition(Cancelled).is_err());
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        for status in [Pending, Processing, Shipped, Delivered, Cancelled] {
            assert_eq!(status.admin_transition(status), Ok(status));
        }
    }

    #[test]
    fn test_owner_cancel_only_from_pending() {
        assert_eq!(Pending.cancel_by_owner(), Ok(Cancelled));
        for status in [Processing, Shipped, Delivered, Cancelled] {
            assert!(status.cancel_by_owner().is_err());
        }
    }

    #[test]
    fn test_status_serializes_with_exact_names() {
        let json = serde_json::to_string(&Processing).unwrap_or_default();
        assert_eq!(json, "\"Processing\"");
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(Shipped));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }
}
