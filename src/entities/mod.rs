pub mod orders;
pub mod payment_logs;
pub mod subscription_plans;
pub mod topup_requests;
pub mod user_subscriptions;
pub mod user_wallets;
pub mod wallet_transactions;

pub use orders as order_entity;
pub use payment_logs as payment_log_entity;
pub use subscription_plans as subscription_plan_entity;
pub use topup_requests as topup_request_entity;
pub use user_subscriptions as user_subscription_entity;
pub use user_wallets as user_wallet_entity;
pub use wallet_transactions as wallet_transaction_entity;

pub use orders::{LicenseType, PaymentMethod, PaymentStatus};
pub use payment_logs::PaymentLogType;
pub use subscription_plans::QuotaType;
pub use topup_requests::TopupStatus;
pub use user_subscriptions::SubscriptionStatus;
pub use wallet_transactions::TransactionType;
