//! Unified loading pipeline for CLI, HTTP server and dashboard
//!
//! source documents → normalizer → aggregator → frozen [`QueryService`]

use std::path::Path;

use crate::config::RunSettings;
use crate::parsers::{RecordSet, SourceRegistry};
use crate::services::{Aggregator, DateParser, Normalizer, QueryService};
use crate::types::Result;

/// Runs one aggregation over the configured data source
pub struct Pipeline {
    registry: SourceRegistry,
    normalizer: Normalizer,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(settings: &RunSettings) -> Self {
        Self {
            registry: SourceRegistry::new(),
            normalizer: Normalizer::new(
                settings.aliases.clone(),
                DateParser::new(settings.reference_year),
            ),
            aggregator: Aggregator::new(settings.reference_date)
                .with_top_n(settings.top_n)
                .with_unknown_end_date(settings.unknown_end_date),
        }
    }

    /// Load, normalize and aggregate. Source failures are returned, never
    /// turned into an empty report.
    pub fn run(&self, data_path: &Path) -> Result<QueryService> {
        let set = self.registry.load(data_path)?;
        Ok(self.run_records(&set))
    }

    /// Aggregate an already loaded record set
    pub fn run_records(&self, set: &RecordSet) -> QueryService {
        let records = self.normalizer.normalize_all(set.records());
        QueryService::new(self.aggregator.aggregate(records))
    }
}
