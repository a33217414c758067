use crate::entities::order_entity;
use crate::error::AppResult;
use chrono::Utc;
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

/// ORD-<UTC timestamp>-<6 uppercase alphanumerics>.
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = (0..6)
        .map(|_| {
            let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("ORD-{timestamp}-{suffix}")
}

/// Regenerate until the number is free. Collisions need the same second
/// and the same random suffix, so a second round is already rare.
pub async fn generate_unique_order_number<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    loop {
        let candidate = generate_order_number();
        let taken = order_entity::Entity::find()
            .filter(order_entity::Column::OrderNumber.eq(candidate.as_str()))
            .count(conn)
            .await?;

        if taken == 0 {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_has_expected_shape() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn suffixes_vary_between_calls() {
        // same second gives the same timestamp, suffixes still differ
        let numbers: Vec<String> = (0..8).map(|_| generate_order_number()).collect();
        let suffixes: std::collections::HashSet<&str> =
            numbers.iter().map(|n| &n[n.len() - 6..]).collect();
        assert!(suffixes.len() > 1);
    }
}
