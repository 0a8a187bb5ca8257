//! Record ingestion: sources of scraped records and the integrator that
//! hands them to storage.
//!
//! Sources produce loosely-shaped records. Education info is taken as given
//! when present, otherwise inferred from a free-text biography with the
//! extractor, otherwise defaulted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use edutrack_extract::parse_education_info;
use edutrack_shared::{
    EdutrackError, EducationInfo, NewOfficial, NewPolitician, Result, SourcesConfig,
};
use edutrack_storage::Storage;

// ---------------------------------------------------------------------------
// Scraped record shapes
// ---------------------------------------------------------------------------

/// A politician as delivered by a record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPolitician {
    pub name: String,
    pub party: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_info: Option<EducationInfo>,
    /// Free text to run through the extractor when `education_info` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl ScrapedPolitician {
    pub fn into_record(self) -> NewPolitician {
        NewPolitician {
            education: resolve_education(self.education_info, self.biography.as_deref()),
            name: self.name,
            party: self.party,
            position: self.position,
        }
    }
}

/// A civil servant as delivered by a record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedOfficial {
    pub name: String,
    pub department: String,
    pub joining_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_info: Option<EducationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl ScrapedOfficial {
    pub fn into_record(self) -> NewOfficial {
        NewOfficial {
            education: resolve_education(self.education_info, self.biography.as_deref()),
            name: self.name,
            department: self.department,
            joining_year: self.joining_year,
        }
    }
}

fn resolve_education(info: Option<EducationInfo>, biography: Option<&str>) -> EducationInfo {
    match (info, biography) {
        (Some(info), _) => info,
        (None, Some(text)) => parse_education_info(text),
        (None, None) => EducationInfo::default(),
    }
}

/// File format shared by [`JsonFileSource`] and [`save_records`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRecords {
    #[serde(default)]
    pub politicians: Vec<ScrapedPolitician>,
    #[serde(default)]
    pub officials: Vec<ScrapedOfficial>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Anything that can supply politician and civil servant records.
pub trait RecordSource: Send + Sync {
    /// Short label stored with each import run.
    fn name(&self) -> &str;
    fn politicians(&self) -> Result<Vec<ScrapedPolitician>>;
    fn officials(&self) -> Result<Vec<ScrapedOfficial>>;
}

/// Government portal source (Lok Sabha, Rajya Sabha, UPSC).
///
/// Fetching is not implemented: the source returns fixed sample records whose
/// education info comes from the extractor.
pub struct GovernmentSource {
    sources: SourcesConfig,
}

impl GovernmentSource {
    pub fn new(sources: SourcesConfig) -> Self {
        Self { sources }
    }
}

impl RecordSource for GovernmentSource {
    fn name(&self) -> &str {
        "government"
    }

    fn politicians(&self) -> Result<Vec<ScrapedPolitician>> {
        debug!(
            lok_sabha = %self.sources.lok_sabha,
            rajya_sabha = %self.sources.rajya_sabha,
            "returning sample member of parliament records"
        );
        Ok(vec![ScrapedPolitician {
            name: "Sample MP 1".into(),
            party: "Party A".into(),
            position: "MP".into(),
            education_info: Some(parse_education_info(
                "Completed Ph.D. from Delhi University",
            )),
            biography: None,
        }])
    }

    fn officials(&self) -> Result<Vec<ScrapedOfficial>> {
        debug!(upsc = %self.sources.upsc, "returning sample civil servant records");
        Ok(vec![ScrapedOfficial {
            name: "Sample Officer 1".into(),
            department: "IAS".into(),
            joining_year: 2020,
            education_info: Some(parse_education_info("Masters from IIT Delhi")),
            biography: None,
        }])
    }
}

/// Records previously saved with [`save_records`] or written by hand.
pub struct JsonFileSource {
    label: String,
    records: ScrapedRecords,
}

impl JsonFileSource {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EdutrackError::io(path, e))?;
        let records: ScrapedRecords = serde_json::from_str(&content).map_err(|e| {
            EdutrackError::parse(format!("failed to parse {}: {e}", path.display()))
        })?;

        debug!(
            path = %path.display(),
            politicians = records.politicians.len(),
            officials = records.officials.len(),
            "loaded record file"
        );
        Ok(Self {
            label: format!("file:{}", path.display()),
            records,
        })
    }
}

impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn politicians(&self) -> Result<Vec<ScrapedPolitician>> {
        Ok(self.records.politicians.clone())
    }

    fn officials(&self) -> Result<Vec<ScrapedOfficial>> {
        Ok(self.records.officials.clone())
    }
}

/// Collect everything a source offers, e.g. for [`save_records`].
pub fn collect_records(source: &dyn RecordSource) -> Result<ScrapedRecords> {
    Ok(ScrapedRecords {
        politicians: source.politicians()?,
        officials: source.officials()?,
    })
}

/// Write scraped records as pretty-printed JSON.
pub fn save_records(path: &Path, records: &ScrapedRecords) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EdutrackError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| EdutrackError::Ingest(format!("failed to serialize records: {e}")))?;
    std::fs::write(path, json).map_err(|e| EdutrackError::io(path, e))?;
    Ok(path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting import status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each record is handled (added or skipped).
    fn record_handled(&self, name: &str, current: usize, total: usize);
    /// Called when the import completes.
    fn done(&self, stats: &ImportStats);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_handled(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _stats: &ImportStats) {}
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub politicians_added: usize,
    /// Politicians whose (name, party) already existed.
    pub politicians_skipped: usize,
    pub officials_added: usize,
    pub officials_skipped: usize,
}

/// Feeds records from a [`RecordSource`] into [`Storage`].
pub struct Integrator<'a> {
    storage: &'a Storage,
}

impl<'a> Integrator<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import politicians, then officials, recording the run in storage.
    ///
    /// Duplicates are skipped and counted. Any other failure aborts the run;
    /// records inserted before the failure stay committed and the run is left
    /// without a finish time.
    #[instrument(skip_all, fields(source = source.name()))]
    pub async fn run(
        &self,
        source: &dyn RecordSource,
        progress: &dyn ProgressReporter,
    ) -> Result<ImportStats> {
        let run_id = self.storage.start_import_run(source.name()).await?;
        info!(%run_id, "starting import");

        let mut stats = ImportStats::default();

        progress.phase("Importing politicians");
        let (added, skipped) = self.import_politicians(source, progress).await?;
        stats.politicians_added = added;
        stats.politicians_skipped = skipped;

        progress.phase("Importing civil servants");
        let (added, skipped) = self.import_officials(source, progress).await?;
        stats.officials_added = added;
        stats.officials_skipped = skipped;

        let stats_json = serde_json::to_string(&stats)
            .map_err(|e| EdutrackError::Ingest(format!("failed to serialize stats: {e}")))?;
        self.storage.finish_import_run(&run_id, &stats_json).await?;

        info!(
            %run_id,
            politicians = stats.politicians_added,
            officials = stats.officials_added,
            skipped = stats.politicians_skipped + stats.officials_skipped,
            "import finished"
        );
        progress.done(&stats);
        Ok(stats)
    }

    /// Returns `(added, skipped)`. `skipped` counts records already stored
    /// and records without a name or party.
    #[instrument(skip_all, fields(source = source.name()))]
    pub async fn import_politicians(
        &self,
        source: &dyn RecordSource,
        progress: &dyn ProgressReporter,
    ) -> Result<(usize, usize)> {
        let records = source.politicians()?;
        let total = records.len();
        let (mut added, mut skipped) = (0, 0);

        for (i, scraped) in records.into_iter().enumerate() {
            let record = scraped.into_record();
            if let Err(e) = record.validate() {
                warn!(error = %e, "skipping invalid politician record");
                skipped += 1;
                progress.record_handled(&record.name, i + 1, total);
                continue;
            }
            match self.storage.add_politician(&record, &[]).await {
                Ok(p) => {
                    info!(id = p.id, name = %p.name, "added politician");
                    added += 1;
                }
                Err(e) if e.is_duplicate() => {
                    warn!(
                        name = %record.name,
                        party = %record.party,
                        "politician already exists, skipping"
                    );
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
            progress.record_handled(&record.name, i + 1, total);
        }
        Ok((added, skipped))
    }

    /// Returns `(added, skipped)`. Officials have no uniqueness rule, so
    /// `skipped` counts records rejected by validation.
    #[instrument(skip_all, fields(source = source.name()))]
    pub async fn import_officials(
        &self,
        source: &dyn RecordSource,
        progress: &dyn ProgressReporter,
    ) -> Result<(usize, usize)> {
        let records = source.officials()?;
        let total = records.len();
        let (mut added, mut skipped) = (0, 0);

        for (i, scraped) in records.into_iter().enumerate() {
            let record = scraped.into_record();
            if let Err(e) = record.validate() {
                warn!(error = %e, "skipping invalid civil servant record");
                skipped += 1;
                progress.record_handled(&record.name, i + 1, total);
                continue;
            }
            let official = self.storage.add_official(&record, &[]).await?;
            info!(id = official.id, name = %official.name, "added civil servant");
            added += 1;
            progress.record_handled(&record.name, i + 1, total);
        }
        Ok((added, skipped))
    }
}
