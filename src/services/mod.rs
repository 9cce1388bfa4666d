//! Services for normalization, aggregation and querying

pub mod aggregator;
pub mod amount;
pub mod date;
pub mod normalizer;
pub mod pipeline;
pub mod query;

pub use aggregator::{Aggregator, UnknownEndDatePolicy, DEFAULT_TOP_N};
pub use date::DateParser;
pub use normalizer::{AliasTable, Normalizer, UNKNOWN};
pub use pipeline::Pipeline;
pub use query::QueryService;
