use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the service lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "served" => Some(OrderStatus::Served),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order leaves the restaurant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    OnSite,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::OnSite => "on-site",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "on-site" => Some(OrderType::OnSite),
            "takeaway" => Some(OrderType::Takeaway),
            "delivery" => Some(OrderType::Delivery),
            _ => None,
        }
    }

    /// Anything unrecognized from a client payload becomes an on-site order.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or(OrderType::OnSite)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile-money",
            PaymentMethod::Online => "online",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "mobile-money" => Some(PaymentMethod::MobileMoney),
            "online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's order; the single source of truth for what was sold.
///
/// `number` is not stored: it is derived from `created_at` on load (see
/// [`crate::numbering`]) and rides along in every order response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub user_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line joined with its dish, for detail views, the kitchen queue
/// and ticket building. `dish_name` is `None` when the dish was deleted
/// after the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDetail {
    pub dish_id: Option<Uuid>,
    pub dish_name: Option<String>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub notes: Option<String>,
}

/// A settlement record for an order, including the generated ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub external_reference: Option<String>,
    pub ticket_number: Option<String>,
    pub ticket_json: Option<serde_json::Value>,
    pub ticket_pdf_path: Option<String>,
    pub ticket_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact payment view embedded in order responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub ticket_number: Option<String>,
}

impl From<&Payment> for PaymentSummary {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            status: payment.status,
            method: payment.method,
            ticket_number: payment.ticket_number.clone(),
        }
    }
}

/// An order expanded with its lines, for detail views.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<LineDetail>,
}

/// Kitchen queue entry: the order, who it is for and what to cook.
#[derive(Debug, Clone, Serialize)]
pub struct KitchenOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: Option<String>,
    pub lines: Vec<LineDetail>,
}

/// Result of the pay-and-ticket flow.
#[derive(Debug, Clone, Serialize)]
pub struct PaidOrder {
    #[serde(flatten)]
    pub order: Order,
    pub payment: PaymentSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_use_lowercase_db_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn order_types_use_kebab_case_strings() {
        assert_eq!(OrderType::OnSite.as_str(), "on-site");
        assert_eq!(
            serde_json::to_string(&OrderType::OnSite).unwrap(),
            "\"on-site\""
        );
        assert_eq!(OrderType::parse("delivery"), Some(OrderType::Delivery));
    }

    #[test]
    fn unrecognized_order_type_falls_back_to_on_site() {
        assert_eq!(OrderType::parse_or_default("drive-through"), OrderType::OnSite);
        assert_eq!(OrderType::parse_or_default(""), OrderType::OnSite);
        assert_eq!(OrderType::parse_or_default("takeaway"), OrderType::Takeaway);
    }

    #[test]
    fn payment_method_round_trips_mobile_money() {
        assert_eq!(PaymentMethod::MobileMoney.as_str(), "mobile-money");
        assert_eq!(
            PaymentMethod::parse("mobile-money"),
            Some(PaymentMethod::MobileMoney)
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::MobileMoney).unwrap(),
            "\"mobile-money\""
        );
    }
}
