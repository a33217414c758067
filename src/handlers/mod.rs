pub mod admin;
pub mod order;
pub mod subscription;
pub mod wallet;
pub mod webhook;

pub use admin::admin_config;
pub use order::order_config;
pub use subscription::subscription_config;
pub use wallet::wallet_config;
pub use webhook::webhook_config;
