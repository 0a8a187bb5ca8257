//! Shared types, error model, and configuration for EduTrack.
//!
//! This crate is the foundation depended on by all other EduTrack crates.
//! It provides:
//! - [`EdutrackError`], the unified error type
//! - Domain types ([`Official`], [`Politician`], [`FamilyMember`], [`EducationInfo`])
//! - Configuration ([`AppConfig`], config loading, database path resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DatabaseConfig, SourcesConfig, StatsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_db_path,
};
pub use error::{EdutrackError, Result};
pub use types::{
    DEFAULT_LOCATION, Dataset, Educated, EducationInfo, FamilyMember, Listing, NewFamilyMember,
    NewOfficial, NewPolitician, Official, OfficialEntry, ParentKind, Politician, PoliticianEntry,
    UNKNOWN,
};
