use brigade_order::OrderError;

/// Errors crossing the store boundary. Domain policy failures pass through
/// untouched so the API layer can map them to 400s; everything else is an
/// infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Domain(#[from] OrderError),

    #[error("Ticket service error: {0}")]
    Ticket(String),

    #[error("Ticket file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad row data: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(StoreError::NotFound("Order").to_string(), "Order not found");
        assert_eq!(StoreError::NotFound("Dish").to_string(), "Dish not found");
    }

    #[test]
    fn domain_errors_keep_their_own_message() {
        let err = StoreError::Domain(OrderError::EmptyCart);
        assert_eq!(err.to_string(), "Cart is empty");
    }
}
