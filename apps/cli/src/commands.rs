//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use edutrack_core::ingest::{
    GovernmentSource, ImportStats, Integrator, JsonFileSource, ProgressReporter, RecordSource,
    collect_records, save_records,
};
use edutrack_core::filter::distinct;
use edutrack_core::{OfficialFilter, PoliticianFilter, stats};
use edutrack_extract::parse_education_info;
use edutrack_shared::{
    AppConfig, Dataset, EdutrackError, EducationInfo, NewFamilyMember, NewOfficial,
    NewPolitician, Official, Politician, init_config, load_config, resolve_db_path,
};
use edutrack_storage::Storage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// EduTrack: education records of public officials, politicians and their families.
#[derive(Parser)]
#[command(
    name = "edutrack",
    version,
    about = "Track and analyse the education of public officials, politicians and their families.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Database file (overrides `[database] path` from the config file).
    #[arg(long, env = "EDUTRACK_DB", global = true)]
    pub db: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load a JSON dataset into an empty database.
    Seed {
        /// Dataset file: `{"officials": [...], "politicians": [...]}`.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Manage civil servants.
    Officials {
        #[command(subcommand)]
        action: OfficialAction,
    },

    /// Manage politicians.
    Politicians {
        #[command(subcommand)]
        action: PoliticianAction,
    },

    /// Import records from a source, skipping politicians already stored.
    Import {
        /// Read records from a JSON file instead of the government portals.
        #[arg(long)]
        from: Option<PathBuf>,

        /// Also save the collected records to this file.
        #[arg(long)]
        save_to: Option<PathBuf>,
    },

    /// Show recent import runs.
    Runs {
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Extract education info from free text and print it as JSON.
    Parse {
        /// Biography text, e.g. "Completed Ph.D. from Delhi University".
        text: String,
    },

    /// Print education statistics.
    Stats {
        /// Restrict to one record kind.
        #[arg(long)]
        kind: Option<StatsKind>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum StatsKind {
    Officials,
    Politicians,
}

/// Education fields shared by every add command.
#[derive(Args)]
pub(crate) struct EducationArgs {
    #[arg(long, default_value = "Unknown")]
    pub degree: String,
    #[arg(long, default_value = "Unknown")]
    pub university: String,
    /// Education location (country).
    #[arg(long, default_value = "India")]
    pub location: String,
}

impl From<EducationArgs> for EducationInfo {
    fn from(args: EducationArgs) -> Self {
        EducationInfo::new(args.degree, args.university, args.location)
    }
}

#[derive(Subcommand)]
pub(crate) enum OfficialAction {
    /// List officials and their family members.
    List {
        /// Keep only these departments (repeatable).
        #[arg(long)]
        department: Vec<String>,
        /// Keep only these education locations (repeatable).
        #[arg(long)]
        location: Vec<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Add an official, optionally with family members.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        joining_year: i32,
        #[command(flatten)]
        education: EducationArgs,
        /// JSON file with an array of family members.
        #[arg(long)]
        family: Option<PathBuf>,
    },
    /// Add family members to an existing official.
    AddFamily {
        #[arg(long)]
        id: i64,
        /// JSON file with an array of family members.
        #[arg(long)]
        family: PathBuf,
    },
    /// Delete an official and its family members.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum PoliticianAction {
    /// List politicians and their family members.
    List {
        /// Keep only these parties (repeatable).
        #[arg(long)]
        party: Vec<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Add a politician, optionally with family members.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        party: String,
        #[arg(long, default_value = "MP")]
        position: String,
        #[command(flatten)]
        education: EducationArgs,
        /// JSON file with an array of family members.
        #[arg(long)]
        family: Option<PathBuf>,
    },
    /// Add family members to an existing politician.
    AddFamily {
        #[arg(long)]
        id: i64,
        /// JSON file with an array of family members.
        #[arg(long)]
        family: PathBuf,
    },
    /// Delete a politician and its family members.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "edutrack=info",
        1 => "edutrack=debug",
        _ => "edutrack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let db = cli.db.as_deref();
    match cli.command {
        Command::Seed { file } => cmd_seed(db, &file).await,
        Command::Officials { action } => match action {
            OfficialAction::List {
                department,
                location,
                json,
            } => {
                let filter = OfficialFilter {
                    departments: department,
                    locations: location,
                };
                cmd_officials_list(db, &filter, json).await
            }
            OfficialAction::Add {
                name,
                department,
                joining_year,
                education,
                family,
            } => {
                let record = NewOfficial {
                    name,
                    department,
                    joining_year,
                    education: education.into(),
                };
                cmd_officials_add(db, record, family.as_deref()).await
            }
            OfficialAction::AddFamily { id, family } => {
                cmd_officials_add_family(db, id, &family).await
            }
            OfficialAction::Delete { id } => cmd_officials_delete(db, id).await,
        },
        Command::Politicians { action } => match action {
            PoliticianAction::List { party, json } => {
                let filter = PoliticianFilter { parties: party };
                cmd_politicians_list(db, &filter, json).await
            }
            PoliticianAction::Add {
                name,
                party,
                position,
                education,
                family,
            } => {
                let record = NewPolitician {
                    name,
                    party,
                    position,
                    education: education.into(),
                };
                cmd_politicians_add(db, record, family.as_deref()).await
            }
            PoliticianAction::AddFamily { id, family } => {
                cmd_politicians_add_family(db, id, &family).await
            }
            PoliticianAction::Delete { id } => cmd_politicians_delete(db, id).await,
        },
        Command::Import { from, save_to } => {
            cmd_import(db, from.as_deref(), save_to.as_deref()).await
        }
        Command::Runs { limit } => cmd_runs(db, limit).await,
        Command::Parse { text } => cmd_parse(&text),
        Command::Stats { kind } => cmd_stats(db, kind).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

async fn open_storage(db: Option<&str>) -> Result<Storage> {
    let config = load_config()?;
    let path = resolve_db_path(&config, db)?;
    info!(path = %path.display(), "opening database");
    Ok(Storage::open(&path).await?)
}

/// Read-only when the database already exists; a missing file is created
/// so that listing a fresh install shows an empty store.
async fn open_storage_for_reading(db: Option<&str>) -> Result<Storage> {
    let config = load_config()?;
    let path = resolve_db_path(&config, db)?;
    if path.exists() {
        Ok(Storage::open_readonly(&path).await?)
    } else {
        Ok(Storage::open(&path).await?)
    }
}

/// Load family members from a JSON array, dropping entries without a name.
fn load_family(path: &Path) -> Result<Vec<NewFamilyMember>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read family file {}", path.display()))?;
    let members: Vec<NewFamilyMember> = serde_json::from_str(&content)
        .map_err(|e| EdutrackError::parse(format!("{}: {e}", path.display())))?;

    let total = members.len();
    let members: Vec<NewFamilyMember> = members
        .into_iter()
        .filter(|m| !m.name.trim().is_empty())
        .collect();
    if members.len() < total {
        warn!(dropped = total - members.len(), "ignoring family members without a name");
    }
    Ok(members)
}

/// Turn a storage failure into a user-facing report.
fn write_failed(e: EdutrackError) -> Report {
    match e {
        EdutrackError::Duplicate { .. } | EdutrackError::Validation { .. } => {
            eyre!("{e}. Nothing was saved.")
        }
        other => Report::new(other).wrap_err("failed to save record; no changes were made"),
    }
}

/// Filter values that would match something, shown when a filter matches nothing.
fn official_choices(officials: &[Official]) -> Vec<String> {
    if officials.is_empty() {
        return Vec::new();
    }
    vec![
        format!("Departments: {}", distinct(officials, |o| &o.department).join(", ")),
        format!(
            "Locations:   {}",
            distinct(officials, |o| &o.education.education_location).join(", ")
        ),
    ]
}

fn politician_choices(politicians: &[Politician]) -> Vec<String> {
    if politicians.is_empty() {
        return Vec::new();
    }
    vec![format!("Parties: {}", distinct(politicians, |p| &p.party).join(", "))]
}

fn family_summary(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => " with 1 family member".to_string(),
        n => format!(" with {n} family members"),
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

async fn cmd_seed(db: Option<&str>, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("cannot read dataset {}", file.display()))?;
    let dataset: Dataset = serde_json::from_str(&content)
        .map_err(|e| EdutrackError::parse(format!("{}: {e}", file.display())))?;

    let storage = open_storage(db).await?;
    if storage.seed(&dataset).await.map_err(write_failed)? {
        println!(
            "Seeded {} officials and {} politicians.",
            dataset.officials.len(),
            dataset.politicians.len()
        );
    } else {
        println!("Database already contains records; nothing seeded.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Officials
// ---------------------------------------------------------------------------

async fn cmd_officials_list(db: Option<&str>, filter: &OfficialFilter, json: bool) -> Result<()> {
    let storage = open_storage_for_reading(db).await?;
    let all = storage.list_officials().await?;
    let listing = filter.apply(&all);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.is_empty() {
        println!("No officials found.");
        for line in official_choices(&all.entries) {
            println!("{line}");
        }
        return Ok(());
    }

    println!(
        "{:<5} {:<24} {:<8} {:<6} {:<10} {:<28} {}",
        "ID", "NAME", "DEPT", "YEAR", "DEGREE", "UNIVERSITY", "LOCATION"
    );
    for o in &listing.entries {
        println!(
            "{:<5} {:<24} {:<8} {:<6} {:<10} {:<28} {}",
            o.id,
            o.name,
            o.department,
            o.joining_year,
            o.education.degree_level,
            o.education.university,
            o.education.education_location
        );
        for m in listing.family_of(o.id) {
            println!(
                "      └ {} ({}): {}, {}, {}",
                m.name,
                m.relation_type,
                m.education.degree_level,
                m.education.university,
                m.education.education_location
            );
        }
    }
    Ok(())
}

async fn cmd_officials_add(
    db: Option<&str>,
    record: NewOfficial,
    family: Option<&Path>,
) -> Result<()> {
    record.validate()?;
    let family = family.map(load_family).transpose()?.unwrap_or_default();

    let storage = open_storage(db).await?;
    let official = storage
        .add_official(&record, &family)
        .await
        .map_err(write_failed)?;
    println!(
        "Added official {} (id {}){}.",
        official.name,
        official.id,
        family_summary(family.len())
    );
    Ok(())
}

async fn cmd_officials_add_family(db: Option<&str>, id: i64, family: &Path) -> Result<()> {
    let members = load_family(family)?;
    let storage = open_storage(db).await?;
    let added = storage
        .add_family_members_to_official(id, &members)
        .await
        .map_err(write_failed)?;
    println!("Added {added} family member(s) to official {id}.");
    Ok(())
}

async fn cmd_officials_delete(db: Option<&str>, id: i64) -> Result<()> {
    let storage = open_storage(db).await?;
    if storage.delete_official(id).await? {
        println!("Deleted official {id} and their family members.");
    } else {
        println!("No official with id {id}.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Politicians
// ---------------------------------------------------------------------------

async fn cmd_politicians_list(
    db: Option<&str>,
    filter: &PoliticianFilter,
    json: bool,
) -> Result<()> {
    let storage = open_storage_for_reading(db).await?;
    let all = storage.list_politicians().await?;
    let listing = filter.apply(&all);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.is_empty() {
        println!("No politicians found.");
        for line in politician_choices(&all.entries) {
            println!("{line}");
        }
        return Ok(());
    }

    println!(
        "{:<5} {:<24} {:<16} {:<8} {:<10} {:<28} {}",
        "ID", "NAME", "PARTY", "POSITION", "DEGREE", "UNIVERSITY", "LOCATION"
    );
    for p in &listing.entries {
        println!(
            "{:<5} {:<24} {:<16} {:<8} {:<10} {:<28} {}",
            p.id,
            p.name,
            p.party,
            p.position,
            p.education.degree_level,
            p.education.university,
            p.education.education_location
        );
        for m in listing.family_of(p.id) {
            println!(
                "      └ {} ({}): {}, {}, {}",
                m.name,
                m.relation_type,
                m.education.degree_level,
                m.education.university,
                m.education.education_location
            );
        }
    }
    Ok(())
}

async fn cmd_politicians_add(
    db: Option<&str>,
    record: NewPolitician,
    family: Option<&Path>,
) -> Result<()> {
    record.validate()?;
    let family = family.map(load_family).transpose()?.unwrap_or_default();

    let storage = open_storage(db).await?;
    let politician = storage
        .add_politician(&record, &family)
        .await
        .map_err(write_failed)?;
    println!(
        "Added politician {} of {} (id {}){}.",
        politician.name,
        politician.party,
        politician.id,
        family_summary(family.len())
    );
    Ok(())
}

async fn cmd_politicians_add_family(db: Option<&str>, id: i64, family: &Path) -> Result<()> {
    let members = load_family(family)?;
    let storage = open_storage(db).await?;
    let added = storage
        .add_family_members_to_politician(id, &members)
        .await
        .map_err(write_failed)?;
    println!("Added {added} family member(s) to politician {id}.");
    Ok(())
}

async fn cmd_politicians_delete(db: Option<&str>, id: i64) -> Result<()> {
    let storage = open_storage(db).await?;
    if storage.delete_politician(id).await? {
        println!("Deleted politician {id} and their family members.");
    } else {
        println!("No politician with id {id}.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

async fn cmd_import(db: Option<&str>, from: Option<&Path>, save_to: Option<&Path>) -> Result<()> {
    let source: Box<dyn RecordSource> = match from {
        Some(path) => Box::new(JsonFileSource::load(path)?),
        None => Box::new(GovernmentSource::new(load_config()?.sources)),
    };

    if let Some(path) = save_to {
        let records = collect_records(source.as_ref())?;
        save_records(path, &records)?;
        info!(path = %path.display(), "saved collected records");
    }

    let storage = open_storage(db).await?;
    let reporter = CliProgress::new();
    let stats = Integrator::new(&storage)
        .run(source.as_ref(), &reporter)
        .await?;

    println!();
    println!("  Import finished ({})", source.name());
    println!(
        "  Politicians: {} added, {} skipped",
        stats.politicians_added, stats.politicians_skipped
    );
    println!(
        "  Officials:   {} added, {} skipped",
        stats.officials_added, stats.officials_skipped
    );
    println!();
    Ok(())
}

async fn cmd_runs(db: Option<&str>, limit: u32) -> Result<()> {
    let storage = open_storage_for_reading(db).await?;
    let runs = storage.list_import_runs(limit).await?;
    if runs.is_empty() {
        println!("No import runs recorded.");
        return Ok(());
    }
    for run in runs {
        let finished = run
            .finished_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unfinished".to_string());
        println!(
            "{}  {}  {} → {}  {}",
            run.id,
            run.source,
            run.started_at.to_rfc3339(),
            finished,
            run.stats_json.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_handled(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Importing [{current}/{total}] {name}"));
    }

    fn done(&self, _stats: &ImportStats) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Parse and stats
// ---------------------------------------------------------------------------

fn cmd_parse(text: &str) -> Result<()> {
    let info = parse_education_info(text);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn cmd_stats(db: Option<&str>, kind: Option<StatsKind>) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage_for_reading(db).await?;
    let western = &config.stats.western_countries;

    if kind != Some(StatsKind::Politicians) {
        let officials = storage.list_officials().await?.entries;
        println!("Civil servants ({})", officials.len());
        print_distribution(&stats::location_distribution(&officials));
        print_western(&stats::western_education_stats(&officials, western));

        println!("  By joining year:");
        for (year, locations) in stats::yearly_trends(&officials) {
            println!("    {year}: {}", join_counts(&locations));
        }
        println!("  By department:");
        for (department, locations) in stats::department_location_matrix(&officials) {
            println!("    {department}: {}", join_counts(&locations));
        }
        println!();
    }

    if kind != Some(StatsKind::Officials) {
        let politicians = storage.list_politicians().await?.entries;
        println!("Politicians ({})", politicians.len());
        print_distribution(&stats::location_distribution(&politicians));
        print_western(&stats::western_education_stats(&politicians, western));
        println!();
    }
    Ok(())
}

fn print_distribution(distribution: &[(String, usize)]) {
    println!("  Education locations:");
    for (location, count) in distribution {
        println!("    {location:<12} {count}");
    }
}

fn print_western(summary: &stats::WesternStats) {
    println!(
        "  Western-educated: {} of {} ({:.1}%)",
        summary.western, summary.total, summary.percentage
    );
    println!(
        "  Top Western country: {}",
        summary.top_country.as_deref().unwrap_or("-")
    );
    println!(
        "  Most common Western degree: {}",
        summary.most_common_degree.as_deref().unwrap_or("-")
    );
}

fn join_counts(counts: &std::collections::BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
