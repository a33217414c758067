pub mod common;
pub mod order;
pub mod pagination;
pub mod payment_log;
pub mod subscription;
pub mod topup;
pub mod wallet;

pub use common::*;
pub use order::*;
pub use pagination::*;
pub use payment_log::*;
pub use subscription::*;
pub use topup::*;
pub use wallet::*;
