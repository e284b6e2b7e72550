//! Promo Code Repository
//!
//! The storage seam promo codes are read through. Lookups are synchronous:
//! the surrounding application resolves documents before pricing runs.

use rustc_hash::FxHashMap;

use crate::promotions::{PromoCode, normalize_code};

/// Read access to promo code documents and redemption history.
pub trait PromoRepository {
    /// Find a promo by customer-entered code.
    fn find_by_code(&self, code: &str) -> Option<&PromoCode>;

    /// Every active promo, in a stable order.
    fn list_active(&self) -> Vec<&PromoCode>;

    /// How often `user_id` has redeemed `code`.
    fn count_user_usage(&self, user_id: &str, code: &str) -> u32;
}

/// Promo repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPromoRepository {
    promo_codes: FxHashMap<String, PromoCode>,
    usage: FxHashMap<(String, String), u32>,
}

impl InMemoryPromoRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a promo, returning the promo previously stored under its code.
    pub fn insert(&mut self, promo: PromoCode) -> Option<PromoCode> {
        self.promo_codes.insert(normalize_code(&promo.code), promo)
    }

    /// Record that `user_id` redeemed `code` `count` more times.
    pub fn record_usage(&mut self, user_id: &str, code: &str, count: u32) {
        let entry = self
            .usage
            .entry((user_id.to_string(), normalize_code(code)))
            .or_default();

        *entry = entry.saturating_add(count);
    }

    /// Number of stored promos.
    pub fn len(&self) -> usize {
        self.promo_codes.len()
    }

    /// Whether the repository holds no promos.
    pub fn is_empty(&self) -> bool {
        self.promo_codes.is_empty()
    }
}

impl PromoRepository for InMemoryPromoRepository {
    fn find_by_code(&self, code: &str) -> Option<&PromoCode> {
        self.promo_codes.get(&normalize_code(code))
    }

    fn list_active(&self) -> Vec<&PromoCode> {
        let mut active: Vec<&PromoCode> = self
            .promo_codes
            .values()
            .filter(|promo| promo.is_active)
            .collect();

        active.sort_by(|a, b| a.code.cmp(&b.code));

        active
    }

    fn count_user_usage(&self, user_id: &str, code: &str) -> u32 {
        self.usage
            .get(&(user_id.to_string(), normalize_code(code)))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::promotions::DiscountType;

    use super::*;

    fn repository() -> InMemoryPromoRepository {
        let mut repository = InMemoryPromoRepository::new();

        repository.insert(PromoCode::new("1", "Save10", DiscountType::Percentage, dec!(10)));
        repository.insert(PromoCode::new("2", "FLAT50", DiscountType::Fixed, dec!(50)));
        repository.insert(PromoCode {
            is_active: false,
            ..PromoCode::new("3", "OLD", DiscountType::Fixed, dec!(75))
        });

        repository
    }

    #[test]
    fn find_by_code_ignores_case_and_whitespace() {
        let repository = repository();

        assert!(
            repository
                .find_by_code(" save10")
                .is_some_and(|promo| promo.id == "1")
        );
        assert!(repository.find_by_code("NOPE").is_none());
    }

    #[test]
    fn list_active_skips_inactive_and_is_sorted() {
        let repository = repository();
        let codes: Vec<&str> = repository
            .list_active()
            .iter()
            .map(|promo| promo.code.as_str())
            .collect();

        assert_eq!(codes, ["FLAT50", "Save10"]);
    }

    #[test]
    fn usage_is_counted_per_user_and_code() {
        let mut repository = repository();

        repository.record_usage("user-1", "save10", 1);
        repository.record_usage("user-1", "SAVE10", 1);
        repository.record_usage("user-2", "SAVE10", 1);

        assert_eq!(repository.count_user_usage("user-1", "Save10"), 2);
        assert_eq!(repository.count_user_usage("user-2", "SAVE10"), 1);
        assert_eq!(repository.count_user_usage("user-3", "SAVE10"), 0);
        assert_eq!(repository.count_user_usage("user-1", "FLAT50"), 0);
    }

    #[test]
    fn insert_replaces_same_code() {
        let mut repository = repository();

        let previous =
            repository.insert(PromoCode::new("9", "SAVE10", DiscountType::Percentage, dec!(15)));

        assert!(previous.is_some_and(|promo| promo.id == "1"));
        assert_eq!(repository.len(), 3);
    }
}
