pub mod order_service;
pub mod payment_log_service;
pub mod subscription_service;
pub mod topup_service;
pub mod wallet_service;

pub use order_service::*;
pub use payment_log_service::*;
pub use subscription_service::*;
pub use topup_service::*;
pub use wallet_service::*;
