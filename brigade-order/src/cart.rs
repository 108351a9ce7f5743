use std::collections::HashMap;

use brigade_menu::Dish;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::OrderError;

/// One cart entry as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub dish_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A cart line priced against the menu at order time.
#[derive(Debug, Clone, Serialize)]
pub struct PricedLine {
    pub dish_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub notes: Option<String>,
}

/// A fully validated cart, ready to persist in one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total_cents: i64,
}

/// Price a cart against the dishes it references.
///
/// Unit prices are captured here; later menu edits never change an existing
/// order. Dish availability is not part of cart validation.
pub fn price_cart(
    items: &[CartItem],
    dishes: &HashMap<Uuid, Dish>,
) -> Result<PricedCart, OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut total_cents = 0i64;

    for item in items {
        let dish = dishes
            .get(&item.dish_id)
            .ok_or(OrderError::UnknownDish(item.dish_id))?;
        if item.quantity < 1 {
            return Err(OrderError::InvalidQuantity {
                dish_id: item.dish_id,
                quantity: item.quantity,
            });
        }

        let line_total_cents = dish.price_cents * i64::from(item.quantity);
        total_cents += line_total_cents;
        lines.push(PricedLine {
            dish_id: item.dish_id,
            quantity: item.quantity,
            unit_price_cents: dish.price_cents,
            line_total_cents,
            notes: item.notes.clone(),
        });
    }

    Ok(PricedCart { lines, total_cents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dish(name: &str, price_cents: i64) -> Dish {
        let now = Utc::now();
        Dish {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price_cents,
            category_id: None,
            image_url: None,
            available: true,
            popularity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn index(dishes: &[Dish]) -> HashMap<Uuid, Dish> {
        dishes.iter().cloned().map(|d| (d.id, d)).collect()
    }

    #[test]
    fn totals_a_cart_at_order_time_prices() {
        let margherita = dish("Margherita", 1000);
        let lasagna = dish("Lasagna", 1500);
        let dishes = index(&[margherita.clone(), lasagna.clone()]);

        let items = vec![
            CartItem {
                dish_id: margherita.id,
                quantity: 2,
                notes: None,
            },
            CartItem {
                dish_id: lasagna.id,
                quantity: 1,
                notes: Some("extra cheese".to_string()),
            },
        ];

        let cart = price_cart(&items, &dishes).unwrap();
        assert_eq!(cart.total_cents, 3500);
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].line_total_cents, 2000);
        assert_eq!(cart.lines[1].unit_price_cents, 1500);
        assert_eq!(cart.lines[1].notes.as_deref(), Some("extra cheese"));
    }

    #[test]
    fn rejects_an_empty_cart() {
        let dishes = HashMap::new();
        let result = price_cart(&[], &dishes);
        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn rejects_a_dish_missing_from_the_menu() {
        let margherita = dish("Margherita", 1000);
        let dishes = index(&[margherita]);
        let ghost = Uuid::new_v4();

        let items = vec![CartItem {
            dish_id: ghost,
            quantity: 1,
            notes: None,
        }];
        let result = price_cart(&items, &dishes);
        assert!(matches!(result, Err(OrderError::UnknownDish(id)) if id == ghost));
    }

    #[test]
    fn rejects_non_positive_quantities() {
        let margherita = dish("Margherita", 1000);
        let dishes = index(&[margherita.clone()]);

        for quantity in [0, -3] {
            let items = vec![CartItem {
                dish_id: margherita.id,
                quantity,
                notes: None,
            }];
            let result = price_cart(&items, &dishes);
            assert!(matches!(
                result,
                Err(OrderError::InvalidQuantity { .. })
            ));
        }
    }
}
