use std::collections::HashMap;

use brigade_order::{
    lifecycle, numbering, ticket, KitchenOrder, LineDetail, Order, OrderError, OrderStatus,
    OrderType, OrderWithLines, PaidOrder, Payment, PaymentMethod, PaymentStatus, PaymentSummary,
    PricedCart,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::tickets::TicketService;

pub struct OrderRepository {
    pool: PgPool,
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    status: String,
    total_cents: i64,
    order_type: String,
    table_number: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, StoreError> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Decode(format!("order status '{}'", self.status)))?;
        let order_type = OrderType::parse(&self.order_type)
            .ok_or_else(|| StoreError::Decode(format!("order type '{}'", self.order_type)))?;

        Ok(Order {
            id: self.id,
            number: numbering::order_number(self.created_at),
            user_id: self.user_id,
            status,
            total_cents: self.total_cents,
            order_type,
            table_number: self.table_number,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    order_id: Uuid,
    dish_id: Option<Uuid>,
    dish_name: Option<String>,
    quantity: i32,
    unit_price_cents: i64,
    line_total_cents: i64,
    notes: Option<String>,
}

impl From<LineRow> for LineDetail {
    fn from(row: LineRow) -> Self {
        LineDetail {
            dish_id: row.dish_id,
            dish_name: row.dish_name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            line_total_cents: row.line_total_cents,
            notes: row.notes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct KitchenRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RecentRow {
    #[sqlx(flatten)]
    order: OrderRow,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount_cents: i64,
    method: String,
    status: String,
    transaction_id: Option<String>,
    external_reference: Option<String>,
    ticket_number: Option<String>,
    ticket_json: Option<serde_json::Value>,
    ticket_pdf_path: Option<String>,
    ticket_generated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, StoreError> {
        let method = PaymentMethod::parse(&self.method)
            .ok_or_else(|| StoreError::Decode(format!("payment method '{}'", self.method)))?;
        let status = PaymentStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Decode(format!("payment status '{}'", self.status)))?;

        Ok(Payment {
            id: self.id,
            order_id: self.order_id,
            amount_cents: self.amount_cents,
            method,
            status,
            transaction_id: self.transaction_id,
            external_reference: self.external_reference,
            ticket_number: self.ticket_number,
            ticket_json: self.ticket_json,
            ticket_pdf_path: self.ticket_pdf_path,
            ticket_generated_at: self.ticket_generated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    revenue_today_cents: i64,
    orders_today: i64,
    orders_in_progress: i64,
    clients_today: i64,
}

// ============================================================================
// Reporting types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub revenue_today_cents: i64,
    pub orders_today: i64,
    pub orders_in_progress: i64,
    pub active_dishes: i64,
    pub clients_today: i64,
}

/// Dashboard row for the latest orders, with a human label for who the
/// order is for.
#[derive(Debug, Clone, Serialize)]
pub struct RecentOrder {
    pub id: Uuid,
    pub number: String,
    pub date: DateTime<Utc>,
    pub customer_label: String,
    pub amount_cents: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<RecentOrder>,
}

const ORDER_COLUMNS: &str =
    "id, user_id, status, total_cents, order_type, table_number, notes, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, order_id, amount_cents, method, status, transaction_id, \
     external_reference, ticket_number, ticket_json, ticket_pdf_path, ticket_generated_at, \
     created_at, updated_at";

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the order and its lines in one transaction. The cart is
    /// already validated and priced; nothing is written on failure.
    pub async fn create_from_cart(
        &self,
        user_id: Option<Uuid>,
        cart: &PricedCart,
        order_type: OrderType,
        table_number: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, status, total_cents, order_type, table_number, notes)
             VALUES ($1, 'pending', $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(cart.total_cents)
        .bind(order_type.as_str())
        .bind(table_number)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        for line in &cart.lines {
            sqlx::query(
                "INSERT INTO order_lines (order_id, dish_id, quantity, unit_price_cents, line_total_cents, notes)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(line.dish_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents)
            .bind(&line.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.into_order()
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    pub async fn get_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<OrderWithLines, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Order"))?;

        let lines = self.lines_for(order_id).await?;
        Ok(OrderWithLines {
            order: row.into_order()?,
            lines,
        })
    }

    /// Pending orders, oldest first, with lines and customer names.
    pub async fn kitchen_queue(&self) -> Result<Vec<KitchenOrder>, StoreError> {
        let rows = sqlx::query_as::<_, KitchenRow>(
            "SELECT o.id, o.user_id, o.status, o.total_cents, o.order_type, o.table_number,
                    o.notes, o.created_at, o.updated_at,
                    u.last_name || ' ' || u.first_name AS customer_name
             FROM orders o
             LEFT JOIN users u ON o.user_id = u.id
             WHERE o.status = 'pending'
             ORDER BY o.created_at ASC
             LIMIT 100",
        )
        .fetch_all(&self.pool)
        .await?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.order.id).collect();
        let mut lines_by_order = self.lines_for_many(&order_ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_order.remove(&row.order.id).unwrap_or_default();
                Ok(KitchenOrder {
                    order: row.order.into_order()?,
                    customer_name: row.customer_name,
                    lines,
                })
            })
            .collect()
    }

    /// Today's orders for the cash register, newest first.
    pub async fn today_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE created_at::date = CURRENT_DATE
             ORDER BY created_at DESC
             LIMIT 200"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Latest orders across all users, optionally filtered by status.
    pub async fn list_recent(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Order"))?;

        row.into_order()
    }

    /// The pay-and-ticket flow. The order row stays locked for the whole
    /// transaction, and the commit happens only after the PDF has been
    /// rendered and written. A ticket failure rolls back the status change
    /// and the payment together.
    pub async fn pay_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        tickets: &TicketService,
    ) -> Result<PaidOrder, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE id = $1 AND user_id = $2
             FOR UPDATE"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Order"))?;

        let mut order = row.into_order()?;
        lifecycle::ensure_payable(order.status)?;

        // Self-service settles in cash at the counter.
        let method = PaymentMethod::Cash;

        sqlx::query("UPDATE orders SET status = 'served', updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        order.status = OrderStatus::Served;

        let existing_payment_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM payments WHERE order_id = $1 AND status = 'paid' LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let line_rows = sqlx::query_as::<_, LineRow>(
            "SELECT l.order_id, l.dish_id, d.name AS dish_name, l.quantity,
                    l.unit_price_cents, l.line_total_cents, l.notes
             FROM order_lines l
             LEFT JOIN dishes d ON l.dish_id = d.id
             WHERE l.order_id = $1
             ORDER BY l.created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;
        let lines: Vec<LineDetail> = line_rows.into_iter().map(LineDetail::from).collect();

        let snapshot = ticket::build_ticket(&order, &lines, method);
        let pdf_path = tickets.generate(&snapshot).await?;
        let ticket_json =
            serde_json::to_value(&snapshot).map_err(|e| StoreError::Decode(e.to_string()))?;

        let payment_row = match existing_payment_id {
            Some(payment_id) => {
                sqlx::query_as::<_, PaymentRow>(&format!(
                    "UPDATE payments
                     SET amount_cents = $2, method = $3, status = 'paid',
                         ticket_number = $4, ticket_json = $5, ticket_pdf_path = $6,
                         ticket_generated_at = NOW(), updated_at = NOW()
                     WHERE id = $1
                     RETURNING {PAYMENT_COLUMNS}"
                ))
                .bind(payment_id)
                .bind(order.total_cents)
                .bind(method.as_str())
                .bind(&snapshot.ticket_number)
                .bind(&ticket_json)
                .bind(&pdf_path)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, PaymentRow>(&format!(
                    "INSERT INTO payments (order_id, amount_cents, method, status, ticket_number,
                                           ticket_json, ticket_pdf_path, ticket_generated_at)
                     VALUES ($1, $2, $3, 'paid', $4, $5, $6, NOW())
                     RETURNING {PAYMENT_COLUMNS}"
                ))
                .bind(order_id)
                .bind(order.total_cents)
                .bind(method.as_str())
                .bind(&snapshot.ticket_number)
                .bind(&ticket_json)
                .bind(&pdf_path)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        let payment = payment_row.into_payment()?;
        Ok(PaidOrder {
            payment: PaymentSummary::from(&payment),
            order,
        })
    }

    /// Locate the stored ticket PDF for a served, settled order.
    pub async fn ticket_pdf_path(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<String, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Order"))?;

        let order = row.into_order()?;
        if order.status != OrderStatus::Served {
            return Err(StoreError::Domain(OrderError::TicketUnavailable(
                order.status,
            )));
        }

        let path: Option<String> = sqlx::query_scalar(
            "SELECT ticket_pdf_path FROM payments
             WHERE order_id = $1 AND status = 'paid' AND ticket_pdf_path IS NOT NULL
             LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        path.ok_or(StoreError::NotFound("Ticket"))
    }

    pub async fn dashboard(&self) -> Result<Dashboard, StoreError> {
        let stats_row = sqlx::query_as::<_, StatsRow>(
            "SELECT
                COALESCE(SUM(CASE WHEN created_at::date = CURRENT_DATE AND status = 'served'
                                  THEN total_cents ELSE 0 END), 0)::BIGINT AS revenue_today_cents,
                COUNT(CASE WHEN created_at::date = CURRENT_DATE THEN 1 END) AS orders_today,
                COUNT(CASE WHEN status IN ('pending', 'preparing', 'ready') THEN 1 END) AS orders_in_progress,
                COUNT(DISTINCT CASE WHEN created_at::date = CURRENT_DATE AND status = 'served'
                                    THEN user_id END) AS clients_today
             FROM orders",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_dishes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dishes WHERE available = TRUE")
                .fetch_one(&self.pool)
                .await?;

        let recent_rows = sqlx::query_as::<_, RecentRow>(
            "SELECT o.id, o.user_id, o.status, o.total_cents, o.order_type, o.table_number,
                    o.notes, o.created_at, o.updated_at,
                    u.first_name, u.last_name
             FROM orders o
             LEFT JOIN users u ON o.user_id = u.id
             ORDER BY o.created_at DESC
             LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        let recent_orders = recent_rows
            .into_iter()
            .map(|row| {
                let RecentRow {
                    order,
                    first_name,
                    last_name,
                } = row;
                let order = order.into_order()?;
                let label = customer_label(
                    order.order_type,
                    order.table_number.as_deref(),
                    first_name.as_deref(),
                    last_name.as_deref(),
                );
                Ok(RecentOrder {
                    id: order.id,
                    number: order.number,
                    date: order.created_at,
                    customer_label: label,
                    amount_cents: order.total_cents,
                    status: order.status,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Dashboard {
            stats: DashboardStats {
                revenue_today_cents: stats_row.revenue_today_cents,
                orders_today: stats_row.orders_today,
                orders_in_progress: stats_row.orders_in_progress,
                active_dishes,
                clients_today: stats_row.clients_today,
            },
            recent_orders,
        })
    }

    async fn lines_for(&self, order_id: Uuid) -> Result<Vec<LineDetail>, StoreError> {
        let rows = sqlx::query_as::<_, LineRow>(
            "SELECT l.order_id, l.dish_id, d.name AS dish_name, l.quantity,
                    l.unit_price_cents, l.line_total_cents, l.notes
             FROM order_lines l
             LEFT JOIN dishes d ON l.dish_id = d.id
             WHERE l.order_id = $1
             ORDER BY l.created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineDetail::from).collect())
    }

    async fn lines_for_many(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LineDetail>>, StoreError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LineRow>(
            "SELECT l.order_id, l.dish_id, d.name AS dish_name, l.quantity,
                    l.unit_price_cents, l.line_total_cents, l.notes
             FROM order_lines l
             LEFT JOIN dishes d ON l.dish_id = d.id
             WHERE l.order_id = ANY($1)
             ORDER BY l.created_at ASC",
        )
        .bind(order_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LineDetail>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

/// Display label the dashboard shows for an order: table service wins, then
/// the order type, then the customer's name, then a placeholder.
fn customer_label(
    order_type: OrderType,
    table_number: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> String {
    match (order_type, table_number) {
        (OrderType::OnSite, Some(table)) if !table.is_empty() => format!("Table {}", table),
        (OrderType::Takeaway, _) => "Takeaway".to_string(),
        (OrderType::Delivery, _) => "Delivery".to_string(),
        _ => {
            let name = format!(
                "{} {}",
                first_name.unwrap_or_default(),
                last_name.unwrap_or_default()
            );
            let name = name.trim();
            if name.is_empty() {
                "—".to_string()
            } else {
                name.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn table_service_label_wins_over_the_customer_name() {
        let label = customer_label(
            OrderType::OnSite,
            Some("7"),
            Some("Nadia"),
            Some("Okonkwo"),
        );
        assert_eq!(label, "Table 7");
    }

    #[test]
    fn order_type_labels_apply_without_a_table() {
        assert_eq!(
            customer_label(OrderType::Takeaway, None, Some("Nadia"), None),
            "Takeaway"
        );
        assert_eq!(
            customer_label(OrderType::Delivery, Some("3"), None, None),
            "Delivery"
        );
    }

    #[test]
    fn on_site_without_a_table_falls_back_to_the_name() {
        assert_eq!(
            customer_label(OrderType::OnSite, None, Some("Nadia"), Some("Okonkwo")),
            "Nadia Okonkwo"
        );
        assert_eq!(
            customer_label(OrderType::OnSite, Some(""), None, Some("Okonkwo")),
            "Okonkwo"
        );
        assert_eq!(customer_label(OrderType::OnSite, None, None, None), "—");
    }

    #[test]
    fn order_rows_decode_statuses_and_derive_numbers() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        let row = OrderRow {
            id: Uuid::new_v4(),
            user_id: None,
            status: "preparing".to_string(),
            total_cents: 1800,
            order_type: "takeaway".to_string(),
            table_number: None,
            notes: None,
            created_at: created,
            updated_at: created,
        };

        let order = row.into_order().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.order_type, OrderType::Takeaway);
        assert_eq!(order.number, "CMD-050324-32800");
    }

    #[test]
    fn corrupt_status_strings_surface_as_decode_errors() {
        let created = Utc::now();
        let row = OrderRow {
            id: Uuid::new_v4(),
            user_id: None,
            status: "en_attente".to_string(),
            total_cents: 0,
            order_type: "on-site".to_string(),
            table_number: None,
            notes: None,
            created_at: created,
            updated_at: created,
        };

        assert!(matches!(row.into_order(), Err(StoreError::Decode(_))));
    }
}
