use brigade_core::ticket::{TicketLine, TicketPayment, TicketSnapshot};

use crate::models::{LineDetail, Order, PaymentMethod, PaymentStatus};
use crate::numbering;

/// Build the snapshot sent to the PDF service for a settled order.
///
/// Snapshots only exist for settled orders, so the embedded payment status
/// is always `paid`.
pub fn build_ticket(order: &Order, lines: &[LineDetail], method: PaymentMethod) -> TicketSnapshot {
    TicketSnapshot {
        ticket_number: numbering::ticket_number(order.created_at),
        order_id: order.id,
        order_number: numbering::order_number(order.created_at),
        created_at: order.created_at,
        order_status: order.status.as_str().to_string(),
        order_type: order.order_type.as_str().to_string(),
        table_number: order.table_number.clone(),
        total: order.total_cents,
        payment: TicketPayment {
            method: method.as_str().to_string(),
            status: PaymentStatus::Paid.as_str().to_string(),
        },
        lines: lines
            .iter()
            .map(|line| TicketLine {
                quantity: line.quantity,
                dish_name: line.dish_name.clone(),
                notes: line.notes.clone(),
                unit_price: line.unit_price_cents,
                line_total: line.line_total_cents,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, OrderType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn served_order() -> Order {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        Order {
            id: Uuid::new_v4(),
            number: numbering::order_number(created),
            user_id: Some(Uuid::new_v4()),
            status: OrderStatus::Served,
            total_cents: 3500,
            order_type: OrderType::OnSite,
            table_number: Some("12".to_string()),
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn lines() -> Vec<LineDetail> {
        vec![
            LineDetail {
                dish_id: Some(Uuid::new_v4()),
                dish_name: Some("Margherita".to_string()),
                quantity: 2,
                unit_price_cents: 1000,
                line_total_cents: 2000,
                notes: None,
            },
            LineDetail {
                dish_id: Some(Uuid::new_v4()),
                dish_name: Some("Lasagna".to_string()),
                quantity: 1,
                unit_price_cents: 1500,
                line_total_cents: 1500,
                notes: Some("extra cheese".to_string()),
            },
        ]
    }

    #[test]
    fn snapshot_uses_the_pinned_wire_keys() {
        let order = served_order();
        let ticket = build_ticket(&order, &lines(), PaymentMethod::Cash);
        let value = serde_json::to_value(&ticket).unwrap();

        assert_eq!(value["ticket_number"], "TCKT-632800-240305");
        assert_eq!(value["commande_numero"], "CMD-050324-32800");
        assert_eq!(value["statut_commande"], "served");
        assert_eq!(value["type_commande"], "on-site");
        assert_eq!(value["numero_table"], "12");
        assert_eq!(value["total"], 3500);
        assert_eq!(value["paiement"]["methode"], "cash");
        assert_eq!(value["paiement"]["statut"], "paid");
        assert_eq!(value["lignes"][0]["nomPlat"], "Margherita");
        assert_eq!(value["lignes"][0]["quantite"], 2);
        assert_eq!(value["lignes"][0]["prixUnitaire"], 1000);
        assert_eq!(value["lignes"][0]["totalLigne"], 2000);
        assert_eq!(value["lignes"][1]["commentaire"], "extra cheese");

        // The Rust-side names must never leak onto the wire.
        assert!(value.get("order_number").is_none());
        assert!(value.get("lines").is_none());
        assert!(value["lignes"][0].get("dish_name").is_none());
    }

    #[test]
    fn snapshot_carries_the_order_creation_date() {
        let order = served_order();
        let ticket = build_ticket(&order, &[], PaymentMethod::Cash);
        assert_eq!(ticket.created_at, order.created_at);
        assert_eq!(ticket.order_id, order.id);
        assert!(ticket.lines.is_empty());
    }
}
