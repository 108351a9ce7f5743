pub mod cache_keys;
pub mod category;
pub mod dish;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use dish::{Dish, DishOption, DishUpdate, DishWithOptions, NewDish, NewDishOption};
