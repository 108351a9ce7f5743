//! Human-facing order and ticket numbers.
//!
//! Both numbers are derived from the order's creation timestamp: the epoch
//! second is the seed, reduced modulo a fixed width. Two orders created in
//! the same second share a number.

use chrono::{DateTime, Utc};

/// `CMD-DDMMYY-NNNNN` where NNNNN is the creation epoch second mod 100000.
pub fn order_number(created_at: DateTime<Utc>) -> String {
    let seed = created_at.timestamp().unsigned_abs() % 100_000;
    format!("CMD-{}-{:05}", created_at.format("%d%m%y"), seed)
}

/// `TCKT-NNNNNN-YYMMDD` where NNNNNN is the creation epoch second mod 1000000.
pub fn ticket_number(created_at: DateTime<Utc>) -> String {
    let seed = created_at.timestamp().unsigned_abs() % 1_000_000;
    format!("TCKT-{:06}-{}", seed, created_at.format("%y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_number_is_deterministic_for_a_creation_time() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(created.timestamp(), 1_709_632_800);
        assert_eq!(order_number(created), "CMD-050324-32800");
        assert_eq!(order_number(created), order_number(created));
    }

    #[test]
    fn ticket_number_is_deterministic_for_a_creation_time() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(ticket_number(created), "TCKT-632800-240305");
    }

    #[test]
    fn short_seeds_are_zero_padded() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(created.timestamp() % 100_000, 0);
        assert_eq!(order_number(created), "CMD-010624-00000");
        assert_eq!(ticket_number(created), "TCKT-200000-240601");
    }
}
