use uuid::Uuid;

use crate::models::OrderStatus;

/// Order domain policy violations. All of these surface as 400s at the API
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Unknown dish in cart: {0}")]
    UnknownDish(Uuid),

    #[error("Invalid quantity {quantity} for dish {dish_id}")]
    InvalidQuantity { dish_id: Uuid, quantity: i32 },

    #[error("Order in status {0} cannot be paid")]
    NotPayable(OrderStatus),

    #[error("Ticket is only available once the order is served (status {0})")]
    TicketUnavailable(OrderStatus),

    #[error("Invalid status: {0}")]
    UnknownStatus(String),
}

/// Parses a staff-supplied target status; only the five canonical statuses
/// are accepted.
pub fn parse_status(s: &str) -> Result<OrderStatus, OrderError> {
    OrderStatus::parse(s).ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
}

/// Kitchen variant of [`parse_status`]. Kitchen screens send `delivered`
/// when a tray is handed to the counter; the stored status for that is
/// `ready`, never `served`.
pub fn parse_kitchen_status(s: &str) -> Result<OrderStatus, OrderError> {
    if s == "delivered" {
        return Ok(OrderStatus::Ready);
    }
    parse_status(s)
}

/// An order can be settled once the kitchen is done with it. A served order
/// stays payable so a re-sent payment regenerates its ticket.
pub fn is_payable(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Ready | OrderStatus::Served)
}

pub fn ensure_payable(status: OrderStatus) -> Result<(), OrderError> {
    if is_payable(status) {
        Ok(())
    } else {
        Err(OrderError::NotPayable(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_maps_to_ready_not_served() {
        let status = parse_kitchen_status("delivered").unwrap();
        assert_eq!(status, OrderStatus::Ready);
        assert_ne!(status, OrderStatus::Served);
    }

    #[test]
    fn kitchen_accepts_every_canonical_status() {
        for s in ["pending", "preparing", "ready", "served", "cancelled"] {
            assert!(parse_kitchen_status(s).is_ok(), "kitchen rejected {s}");
        }
    }

    #[test]
    fn unknown_statuses_are_rejected() {
        assert!(matches!(
            parse_status("delivered"),
            Err(OrderError::UnknownStatus(_))
        ));
        assert!(matches!(
            parse_kitchen_status("ARCHIVED"),
            Err(OrderError::UnknownStatus(_))
        ));
    }

    #[test]
    fn only_ready_and_served_orders_are_payable() {
        assert!(is_payable(OrderStatus::Ready));
        assert!(is_payable(OrderStatus::Served));
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Cancelled,
        ] {
            assert!(!is_payable(status));
            assert!(matches!(
                ensure_payable(status),
                Err(OrderError::NotPayable(_))
            ));
        }
    }
}
