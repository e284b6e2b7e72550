//! Cart Fixtures

use serde::Deserialize;

use crate::cart::CartEntry;

/// Cart from YAML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartFixture {
    /// Signed-in customer
    #[serde(default)]
    pub user_id: Option<String>,

    /// Promo code the customer entered
    #[serde(default)]
    pub promo_code: Option<String>,

    /// Booked services
    pub entries: Vec<CartEntry>,
}
