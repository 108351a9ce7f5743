//! Cache key composition for the menu read path.
//!
//! Every menu listing key lives under the `menu:` prefix so a single pattern
//! delete invalidates the whole read path after any category or dish write.
//! Keys encode the listing filters, so differently-filtered reads never share
//! an entry.

use uuid::Uuid;

/// Pattern matching every menu cache key; used for write invalidation.
pub const MENU_PATTERN: &str = "menu:*";

pub fn categories() -> String {
    "menu:categories".to_string()
}

pub fn dishes(category_id: Option<Uuid>, available: Option<bool>) -> String {
    let category = category_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "all".to_string());
    let availability = match available {
        Some(true) => "available",
        Some(false) => "unavailable",
        None => "all",
    };
    format!("menu:dishes:{}:{}", category, availability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_keys_encode_both_filters() {
        let id = Uuid::new_v4();
        let keys = [
            dishes(None, None),
            dishes(None, Some(true)),
            dishes(None, Some(false)),
            dishes(Some(id), None),
            dishes(Some(id), Some(true)),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b, "filters must never collide on one key");
            }
        }
    }

    #[test]
    fn every_menu_key_is_covered_by_the_invalidation_pattern() {
        let prefix = MENU_PATTERN.trim_end_matches('*');
        assert!(categories().starts_with(prefix));
        assert!(dishes(None, None).starts_with(prefix));
        assert!(dishes(Some(Uuid::new_v4()), Some(true)).starts_with(prefix));
    }
}
