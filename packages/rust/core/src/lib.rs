//! Domain logic on top of storage: record ingestion, dashboard filters and
//! chart aggregations.

pub mod filter;
pub mod ingest;
pub mod stats;

pub use filter::{OfficialFilter, PoliticianFilter};
pub use ingest::{
    GovernmentSource, ImportStats, Integrator, JsonFileSource, ProgressReporter, RecordSource,
    ScrapedOfficial, ScrapedPolitician, ScrapedRecords, SilentProgress, collect_records,
    save_records,
};
pub use stats::WesternStats;
