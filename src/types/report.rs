//! Aggregation output types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Origin;

/// Round a monetary value to 2 decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid emitting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Render a monetary value with thousands separators and 2 decimals
/// (e.g. `1234.5` → `"1,234.50"`).
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", round2(value).abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3 + 4);
    if value < 0.0 && round2(value) != 0.0 {
        grouped.push('-');
    }
    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in int_part.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch as char);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}

/// Due/not-due classification of one obligation relative to the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liability {
    Due,
    NotDue,
}

/// Per-product accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRollup {
    pub product: String,
    pub count: u64,
    pub total: f64,
}

/// One record's contribution to a user rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: String,
    pub amount: f64,
    pub end_date_raw: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub start: Option<String>,
    pub daily_return: Option<f64>,
    pub status: Option<String>,
    pub extra: Option<f64>,
    pub origin: Origin,
    pub liability: Liability,
}

/// Per-user accumulator with product detail in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRollup {
    pub user: String,
    pub address: Option<String>,
    pub count: u64,
    pub total: f64,
    pub total_refunded: f64,
    pub due_not_refunded: f64,
    pub not_due_total: f64,
    pub products: Vec<ProductDetail>,
}

impl UserRollup {
    pub fn new(user: String) -> Self {
        Self {
            user,
            address: None,
            count: 0,
            total: 0.0,
            total_refunded: 0.0,
            due_not_refunded: 0.0,
            not_due_total: 0.0,
            products: Vec::new(),
        }
    }
}

/// The four global totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct OverviewTotals {
    pub total_subscribed: f64,
    /// Always 0: the feeds carry no refund events
    pub total_refunded: f64,
    pub due_not_refunded: f64,
    pub not_due_total: f64,
}

/// Frozen result of one aggregation run.
///
/// Users are stored once, in insertion order, with a keyed index built during
/// the pass; `top_users` refers to them by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub totals: OverviewTotals,
    pub reference_date: DateTime<Utc>,
    pub record_count: u64,
    pub products: Vec<ProductRollup>,
    pub users: Vec<UserRollup>,
    pub top_users: Vec<String>,
    #[serde(skip)]
    pub(crate) user_index: HashMap<String, usize>,
}

impl OverviewReport {
    /// Exact-key user lookup against the index built during aggregation
    pub fn user(&self, id: &str) -> Option<&UserRollup> {
        self.user_index.get(id).map(|&idx| &self.users[idx])
    }

    /// Top users in ranking order
    pub fn top_users(&self) -> impl Iterator<Item = &UserRollup> {
        self.top_users.iter().filter_map(|id| self.user(id))
    }
}

/// Product row as expected by display layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub name: String,
    pub amount: f64,
    pub start: Option<String>,
    pub end: Option<String>,
    pub daily_return: Option<f64>,
    pub status: Option<String>,
    pub extra: Option<f64>,
}

/// User lookup response shape for display layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub phone: String,
    pub address: Option<String>,
    pub product_count: u64,
    pub total_subscribed: f64,
    pub total_refunded: f64,
    pub due_not_refunded: f64,
    pub not_due_total: f64,
    pub products: Vec<ProductView>,
}

impl From<&UserRollup> for UserView {
    fn from(rollup: &UserRollup) -> Self {
        Self {
            phone: rollup.user.clone(),
            address: rollup.address.clone(),
            product_count: rollup.count,
            total_subscribed: rollup.total,
            total_refunded: rollup.total_refunded,
            due_not_refunded: rollup.due_not_refunded,
            not_due_total: rollup.not_due_total,
            products: rollup
                .products
                .iter()
                .map(|p| ProductView {
                    name: p.product.clone(),
                    amount: p.amount,
                    start: p.start.clone(),
                    end: p.end_date_raw.clone(),
                    daily_return: p.daily_return,
                    status: p.status.clone(),
                    extra: p.extra,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== round2 ==========

    #[test]
    fn test_round2_basic() {
        assert_eq!(round2(1234.567), 1234.57);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_round2_negative_zero() {
        let r = round2(-0.001);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
    }

    // ========== format_amount ==========

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(99.5), "99.50");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1_000_000.0), "1,000,000.00");
        assert_eq!(format_amount(-2200.456), "-2,200.46");
    }

    // ========== UserView ==========

    #[test]
    fn test_user_view_from_rollup() {
        let mut rollup = UserRollup::new("13392776413".into());
        rollup.address = Some("Shenzhen".into());
        rollup.count = 1;
        rollup.total = 500.0;
        rollup.not_due_total = 500.0;
        rollup.products.push(ProductDetail {
            product: "USDT45".into(),
            amount: 500.0,
            end_date_raw: Some("3月1日".into()),
            end_date: None,
            start: Some("1月1日".into()),
            daily_return: Some(2.5),
            status: Some("进行中".into()),
            extra: None,
            origin: Origin::Usdt45,
            liability: Liability::NotDue,
        });

        let view = UserView::from(&rollup);
        assert_eq!(view.phone, "13392776413");
        assert_eq!(view.product_count, 1);
        assert_eq!(view.total_refunded, 0.0);
        assert_eq!(view.products[0].name, "USDT45");
        assert_eq!(view.products[0].end.as_deref(), Some("3月1日"));
        assert_eq!(view.products[0].daily_return, Some(2.5));
    }

    #[test]
    fn test_liability_serialization() {
        assert_eq!(serde_json::to_string(&Liability::NotDue).unwrap(), "\"not_due\"");
        assert_eq!(serde_json::to_string(&Liability::Due).unwrap(), "\"due\"");
    }
}
