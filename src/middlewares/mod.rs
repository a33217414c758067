pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, AuthUser, Role, current_user};
pub use cors::create_cors;
