//! Read-only query surface over a frozen aggregation report

use std::sync::Arc;

use crate::types::{OverviewReport, OverviewTotals, ProductRollup, UserRollup, UserView};

/// Query service shared by the CLI, HTTP handlers and the dashboard.
///
/// Cloning is cheap; all clones read the same report.
#[derive(Debug, Clone)]
pub struct QueryService {
    report: Arc<OverviewReport>,
}

impl QueryService {
    pub fn new(report: OverviewReport) -> Self {
        Self {
            report: Arc::new(report),
        }
    }

    pub fn report(&self) -> &OverviewReport {
        &self.report
    }

    /// The four global totals
    pub fn overview(&self) -> OverviewTotals {
        self.report.totals
    }

    /// Exact-identifier lookup; `None` means not found
    pub fn user(&self, id: &str) -> Option<&UserRollup> {
        self.report.user(id)
    }

    /// Lookup in the display shape used by the HTTP surface
    pub fn user_view(&self, id: &str) -> Option<UserView> {
        self.user(id).map(UserView::from)
    }

    pub fn products(&self) -> &[ProductRollup] {
        &self.report.products
    }

    /// Top users, optionally limited below the configured ranking size
    pub fn top_users(&self, limit: Option<usize>) -> Vec<&UserRollup> {
        let ranked = self.report.top_users();
        match limit {
            Some(n) => ranked.take(n).collect(),
            None => ranked.collect(),
        }
    }
}
