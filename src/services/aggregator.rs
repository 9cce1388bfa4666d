//! Aggregator service for computing ledger rollups
//!
//! One linear pass over normalized records builds the global totals, the
//! per-product rollup and the per-user rollup at the same time, and classifies
//! every obligation as due or not due against a fixed reference date.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    round2, Liability, NormalizedRecord, OverviewReport, OverviewTotals, ProductDetail,
    ProductRollup, UserRollup,
};

/// Default size of the top-user ranking
pub const DEFAULT_TOP_N: usize = 50;

/// How to classify a record whose end date is missing or unparseable
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownEndDatePolicy {
    /// Treat unmatched obligations as not yet due
    #[default]
    NotDue,
    /// Treat unmatched obligations as due
    Due,
}

/// Aggregator for computing ledger rollups
#[derive(Debug, Clone)]
pub struct Aggregator {
    reference_date: DateTime<Utc>,
    top_n: usize,
    unknown_end_date: UnknownEndDatePolicy,
}

/// Mutable per-run state, owned by a single pass
#[derive(Default)]
struct RunState {
    total: f64,
    due: f64,
    not_due: f64,
    count: u64,
    products: Vec<ProductRollup>,
    product_index: HashMap<String, usize>,
    users: Vec<UserRollup>,
    user_index: HashMap<String, usize>,
}

impl Aggregator {
    pub fn new(reference_date: DateTime<Utc>) -> Self {
        Self {
            reference_date,
            top_n: DEFAULT_TOP_N,
            unknown_end_date: UnknownEndDatePolicy::default(),
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_unknown_end_date(mut self, policy: UnknownEndDatePolicy) -> Self {
        self.unknown_end_date = policy;
        self
    }

    pub fn reference_date(&self) -> DateTime<Utc> {
        self.reference_date
    }

    /// Classify one end date. An end date equal to the reference date is due.
    pub fn classify(&self, end_date: Option<DateTime<Utc>>) -> Liability {
        match end_date {
            Some(end) if end <= self.reference_date => Liability::Due,
            Some(_) => Liability::NotDue,
            None => match self.unknown_end_date {
                UnknownEndDatePolicy::NotDue => Liability::NotDue,
                UnknownEndDatePolicy::Due => Liability::Due,
            },
        }
    }

    /// Aggregate records in a single pass and freeze the result
    pub fn aggregate<I>(&self, records: I) -> OverviewReport
    where
        I: IntoIterator<Item = NormalizedRecord>,
    {
        let mut state = RunState::default();
        for record in records {
            self.accumulate(&mut state, record);
        }
        let report = self.freeze(state);

        tracing::info!(
            records = report.record_count,
            products = report.products.len(),
            users = report.users.len(),
            total = report.totals.total_subscribed,
            "aggregation complete"
        );
        report
    }

    fn accumulate(&self, state: &mut RunState, record: NormalizedRecord) {
        let amount = record.amount;
        let liability = self.classify(record.end_date);

        state.total += amount;
        state.count = state.count.saturating_add(1);
        match liability {
            Liability::Due => state.due += amount,
            Liability::NotDue => state.not_due += amount,
        }

        // Product rollup
        let idx = match state.product_index.get(&record.product) {
            Some(&idx) => idx,
            None => {
                state.products.push(ProductRollup {
                    product: record.product.clone(),
                    count: 0,
                    total: 0.0,
                });
                state
                    .product_index
                    .insert(record.product.clone(), state.products.len() - 1);
                state.products.len() - 1
            }
        };
        let product = &mut state.products[idx];
        product.count = product.count.saturating_add(1);
        product.total += amount;

        // User rollup
        let idx = match state.user_index.get(&record.user) {
            Some(&idx) => idx,
            None => {
                state.users.push(UserRollup::new(record.user.clone()));
                state
                    .user_index
                    .insert(record.user.clone(), state.users.len() - 1);
                state.users.len() - 1
            }
        };
        let user = &mut state.users[idx];
        user.count = user.count.saturating_add(1);
        user.total += amount;
        match liability {
            Liability::Due => user.due_not_refunded += amount,
            Liability::NotDue => user.not_due_total += amount,
        }
        if user.address.is_none() {
            user.address = record.address;
        }
        user.products.push(ProductDetail {
            product: record.product,
            amount,
            end_date_raw: record.end_date_raw,
            end_date: record.end_date,
            start: record.start,
            daily_return: record.daily_return,
            status: record.status,
            extra: record.extra,
            origin: record.origin,
            liability,
        });
    }

    /// Rank, round and seal the per-run state
    fn freeze(&self, state: RunState) -> OverviewReport {
        let RunState {
            total,
            due,
            not_due,
            count,
            mut products,
            mut users,
            user_index,
            ..
        } = state;

        // Rank on unrounded totals; sort_by is stable so ties keep insertion order
        let mut ranking: Vec<usize> = (0..users.len()).collect();
        ranking.sort_by(|&a, &b| {
            users[b]
                .total
                .partial_cmp(&users[a].total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranking.truncate(self.top_n);
        let top_users = ranking.iter().map(|&i| users[i].user.clone()).collect();

        for product in &mut products {
            product.total = round2(product.total);
        }
        for user in &mut users {
            user.total = round2(user.total);
            user.due_not_refunded = round2(user.due_not_refunded);
            user.not_due_total = round2(user.not_due_total);
        }

        OverviewReport {
            totals: OverviewTotals {
                total_subscribed: round2(total),
                total_refunded: 0.0,
                due_not_refunded: round2(due),
                not_due_total: round2(not_due),
            },
            reference_date: self.reference_date,
            record_count: count,
            products,
            users,
            top_users,
            user_index,
        }
    }
}
