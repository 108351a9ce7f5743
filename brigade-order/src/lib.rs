pub mod cart;
pub mod lifecycle;
pub mod models;
pub mod numbering;
pub mod ticket;

pub use cart::{price_cart, CartItem, PricedCart, PricedLine};
pub use lifecycle::OrderError;
pub use models::{
    KitchenOrder, LineDetail, Order, OrderStatus, OrderType, OrderWithLines, PaidOrder, Payment,
    PaymentMethod, PaymentStatus, PaymentSummary,
};
