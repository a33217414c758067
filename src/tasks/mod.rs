//! Background scheduled tasks for the application.
//!
//! The only recurring job today is the subscription expiry sweep. Call
//! `spawn_all` once during startup to launch it.

use crate::services::SubscriptionService;

/// Spawn all background tasks.
///
/// Notes
/// - Each task is idempotent as implemented in its service and runs on its own schedule.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(subscription_service: SubscriptionService) {
    // Hourly: flip lapsed active subscriptions to expired
    {
        let svc = subscription_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.expire_overdue().await {
                    Ok(n) if n > 0 => log::info!("Expired subscriptions processed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire subscriptions: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
        });
    }
}
