pub mod identity;
pub mod pii;
pub mod ticket;

pub use identity::{NewUser, Role, User, UserProfile};
pub use pii::Masked;
pub use ticket::{StaticTicketRenderer, TicketLine, TicketPayment, TicketRenderer, TicketSnapshot};
