pub mod jwt;
pub mod order_number;

pub use jwt::*;
pub use order_number::{generate_order_number, generate_unique_order_number};
