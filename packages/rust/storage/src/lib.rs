//! libSQL storage layer (embedded, offline).
//!
//! The [`Storage`] struct wraps a libSQL database holding officials,
//! politicians, their family members and the import run history.
//!
//! **Consistency rules:**
//! - Every write runs inside its own transaction and either commits fully or
//!   rolls back fully. Batch family-member inserts are all-or-nothing.
//! - `(name, party)` is unique per politician, and a family member name is
//!   unique per parent. Violations surface as [`EdutrackError::Duplicate`].
//! - Deleting a parent deletes its family rows in the same transaction.
//!
//! **Access rules:**
//! - CLI write commands: read-write via [`Storage::open`]
//! - CLI listing/statistics: read-only via [`Storage::open_readonly`]

mod migrations;
mod rows;

use std::path::Path;

use chrono::{DateTime, Utc};
use edutrack_shared::{
    Dataset, EdutrackError, FamilyMember, Listing, NewFamilyMember, NewOfficial, NewPolitician,
    Official, ParentKind, Politician, Result,
};
use libsql::{Connection, Database, Transaction, params};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::rows::{
    is_unique_violation, row_to_family_member, row_to_official, row_to_politician, storage_err,
    tables,
};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EdutrackError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .await
            .map_err(storage_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EdutrackError::Storage(format!(
                "database not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        EdutrackError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(EdutrackError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    /// Begin the transaction scoping one write operation.
    async fn begin(&self) -> Result<Transaction> {
        self.check_writable()?;
        self.conn.transaction().await.map_err(storage_err)
    }

    // -----------------------------------------------------------------------
    // Official operations
    // -----------------------------------------------------------------------

    /// Insert an official and, optionally, its family members as one unit.
    ///
    /// If any family member is rejected the official is not stored either.
    pub async fn add_official(
        &self,
        record: &NewOfficial,
        family: &[NewFamilyMember],
    ) -> Result<Official> {
        let tx = self.begin().await?;
        let result = insert_official(&tx, record, family).await;
        let id = finish(tx, result).await?;

        info!(id, name = %record.name, family = family.len(), "added official");
        Ok(Official {
            id,
            name: record.name.clone(),
            department: record.department.clone(),
            joining_year: record.joining_year,
            education: record.education.clone(),
        })
    }

    /// Append family members to an existing official. All-or-nothing.
    pub async fn add_family_members_to_official(
        &self,
        official_id: i64,
        members: &[NewFamilyMember],
    ) -> Result<usize> {
        self.add_family_members(ParentKind::Official, official_id, members)
            .await
    }

    /// Delete an official and all of its family members.
    /// Returns `false` if no official has this id.
    pub async fn delete_official(&self, official_id: i64) -> Result<bool> {
        self.delete_parent(ParentKind::Official, official_id).await
    }

    pub async fn official_exists(&self, official_id: i64) -> Result<bool> {
        parent_exists(&self.conn, ParentKind::Official, official_id).await
    }

    pub async fn official_family_member_exists(
        &self,
        official_id: i64,
        name: &str,
    ) -> Result<bool> {
        family_member_exists(&self.conn, ParentKind::Official, official_id, name).await
    }

    /// All officials with their family rows, ordered by id.
    pub async fn list_officials(&self) -> Result<Listing<Official>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, department, joining_year, education_location, university, degree_level
                 FROM officials ORDER BY id",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            entries.push(row_to_official(&row)?);
        }

        let family = self.list_family(ParentKind::Official).await?;
        Ok(Listing { entries, family })
    }

    pub async fn count_officials(&self) -> Result<u64> {
        count_rows(&self.conn, "officials").await
    }

    // -----------------------------------------------------------------------
    // Politician operations
    // -----------------------------------------------------------------------

    /// Insert a politician and, optionally, its family members as one unit.
    ///
    /// Fails with [`EdutrackError::Duplicate`] if `(name, party)` is taken.
    pub async fn add_politician(
        &self,
        record: &NewPolitician,
        family: &[NewFamilyMember],
    ) -> Result<Politician> {
        let tx = self.begin().await?;
        let result = insert_politician(&tx, record, family).await;
        let id = finish(tx, result).await?;

        info!(
            id,
            name = %record.name,
            party = %record.party,
            family = family.len(),
            "added politician"
        );
        Ok(Politician {
            id,
            name: record.name.clone(),
            party: record.party.clone(),
            position: record.position.clone(),
            education: record.education.clone(),
        })
    }

    /// Append family members to an existing politician. All-or-nothing.
    pub async fn add_family_members_to_politician(
        &self,
        politician_id: i64,
        members: &[NewFamilyMember],
    ) -> Result<usize> {
        self.add_family_members(ParentKind::Politician, politician_id, members)
            .await
    }

    /// Delete a politician and all of its family members.
    /// Returns `false` if no politician has this id.
    pub async fn delete_politician(&self, politician_id: i64) -> Result<bool> {
        self.delete_parent(ParentKind::Politician, politician_id)
            .await
    }

    pub async fn politician_exists(&self, name: &str, party: &str) -> Result<bool> {
        politician_exists(&self.conn, name, party).await
    }

    pub async fn politician_family_member_exists(
        &self,
        politician_id: i64,
        name: &str,
    ) -> Result<bool> {
        family_member_exists(&self.conn, ParentKind::Politician, politician_id, name).await
    }

    /// All politicians with their family rows, ordered by id.
    pub async fn list_politicians(&self) -> Result<Listing<Politician>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, party, position, education_location, university, degree_level
                 FROM politicians ORDER BY id",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            entries.push(row_to_politician(&row)?);
        }

        let family = self.list_family(ParentKind::Politician).await?;
        Ok(Listing { entries, family })
    }

    pub async fn count_politicians(&self) -> Result<u64> {
        count_rows(&self.conn, "politicians").await
    }

    // -----------------------------------------------------------------------
    // Family operations (shared by both parent kinds)
    // -----------------------------------------------------------------------

    async fn add_family_members(
        &self,
        kind: ParentKind,
        parent_id: i64,
        members: &[NewFamilyMember],
    ) -> Result<usize> {
        let tx = self.begin().await?;
        let result: Result<usize> = async {
            if !parent_exists(&tx, kind, parent_id).await? {
                return Err(EdutrackError::validation(format!(
                    "{kind} {parent_id} does not exist"
                )));
            }
            insert_family(&tx, kind, parent_id, members).await
        }
        .await;
        let added = finish(tx, result).await?;

        info!(%kind, parent_id, added, "added family members");
        Ok(added)
    }

    async fn delete_parent(&self, kind: ParentKind, id: i64) -> Result<bool> {
        let tx = self.begin().await?;
        let result = delete_with_family(&tx, kind, id).await;
        let deleted = finish(tx, result).await?;

        if deleted {
            info!(%kind, id, "deleted with family members");
        } else {
            debug!(%kind, id, "nothing to delete");
        }
        Ok(deleted)
    }

    async fn list_family(&self, kind: ParentKind) -> Result<Vec<FamilyMember>> {
        let t = tables(kind);
        let sql = format!(
            "SELECT f.id, f.{fk}, p.name, f.name, f.relation_type,
                    f.education_location, f.university, f.degree_level
             FROM {family} f
             JOIN {parent} p ON p.id = f.{fk}
             ORDER BY f.{fk}, f.id",
            fk = t.foreign_key,
            family = t.family,
            parent = t.parent,
        );
        let mut rows = self
            .conn
            .query(&sql, params![])
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            results.push(row_to_family_member(&row)?);
        }
        Ok(results)
    }

    /// Number of family rows stored under one parent.
    pub async fn count_family_members(&self, kind: ParentKind, parent_id: i64) -> Result<u64> {
        let t = tables(kind);
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            t.family, t.foreign_key
        );
        let rows = self
            .conn
            .query(&sql, params![parent_id])
            .await
            .map_err(storage_err)?;
        first_count(rows).await
    }

    // -----------------------------------------------------------------------
    // Bulk seeding
    // -----------------------------------------------------------------------

    /// Load `dataset` into an empty store in a single transaction.
    ///
    /// Returns `false` without writing anything if officials or politicians
    /// already exist.
    pub async fn seed(&self, dataset: &Dataset) -> Result<bool> {
        let tx = self.begin().await?;
        let result: Result<bool> = async {
            if count_rows(&tx, "officials").await? > 0 || count_rows(&tx, "politicians").await? > 0
            {
                return Ok(false);
            }
            for entry in &dataset.officials {
                insert_official(&tx, &entry.record, &entry.family).await?;
            }
            for entry in &dataset.politicians {
                insert_politician(&tx, &entry.record, &entry.family).await?;
            }
            Ok(true)
        }
        .await;
        let seeded = finish(tx, result).await?;

        if seeded {
            info!(
                officials = dataset.officials.len(),
                politicians = dataset.politicians.len(),
                "seeded database"
            );
        } else {
            debug!("database already populated, seed skipped");
        }
        Ok(seeded)
    }

    // -----------------------------------------------------------------------
    // Import run history
    // -----------------------------------------------------------------------

    /// Record the start of an import from `source`. Returns the run ID.
    pub async fn start_import_run(&self, source: &str) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO import_runs (id, source, started_at) VALUES (?1, ?2, ?3)",
                params![id.as_str(), source, now.as_str()],
            )
            .await
            .map_err(storage_err)?;
        Ok(id)
    }

    /// Mark an import run as finished with its stats.
    pub async fn finish_import_run(&self, run_id: &str, stats_json: &str) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE import_runs SET finished_at = ?1, stats_json = ?2 WHERE id = ?3",
                params![now.as_str(), stats_json, run_id],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Most recent import runs first.
    pub async fn list_import_runs(&self, limit: u32) -> Result<Vec<ImportRun>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, source, started_at, finished_at, stats_json
                 FROM import_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let started: String = row.get(2).map_err(storage_err)?;
            let finished: Option<String> = row.get(3).ok();
            results.push(ImportRun {
                id: row.get(0).map_err(storage_err)?,
                source: row.get(1).map_err(storage_err)?,
                started_at: parse_timestamp(&started)?,
                finished_at: finished.as_deref().map(parse_timestamp).transpose()?,
                stats_json: row.get(4).ok(),
            });
        }
        Ok(results)
    }
}

/// One recorded ingestion run.
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub id: String,
    /// Name of the record source.
    pub source: String,
    pub started_at: DateTime<Utc>,
    /// `None` while the run is still in progress or if it aborted.
    pub finished_at: Option<DateTime<Utc>>,
    pub stats_json: Option<String>,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EdutrackError::Storage(format!("invalid date: {e}")))
}

// ---------------------------------------------------------------------------
// Transaction-scoped helpers
// ---------------------------------------------------------------------------

/// Commit on success, roll back on failure. Every write path ends here.
async fn finish<T>(tx: Transaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(storage_err)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn insert_official(
    conn: &Connection,
    record: &NewOfficial,
    family: &[NewFamilyMember],
) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO officials (name, department, joining_year, education_location, university, degree_level, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.name.as_str(),
            record.department.as_str(),
            i64::from(record.joining_year),
            record.education.education_location.as_str(),
            record.education.university.as_str(),
            record.education.degree_level.as_str(),
            now.as_str(),
        ],
    )
    .await
    .map_err(storage_err)?;

    let id = conn.last_insert_rowid();
    insert_family(conn, ParentKind::Official, id, family).await?;
    Ok(id)
}

async fn insert_politician(
    conn: &Connection,
    record: &NewPolitician,
    family: &[NewFamilyMember],
) -> Result<i64> {
    // The UNIQUE(name, party) constraint backs this check for racing writers.
    if politician_exists(conn, &record.name, &record.party).await? {
        return Err(duplicate_politician(record));
    }

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO politicians (name, party, position, education_location, university, degree_level, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.name.as_str(),
            record.party.as_str(),
            record.position.as_str(),
            record.education.education_location.as_str(),
            record.education.university.as_str(),
            record.education.degree_level.as_str(),
            now.as_str(),
        ],
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_politician(record)
        } else {
            storage_err(e)
        }
    })?;

    let id = conn.last_insert_rowid();
    insert_family(conn, ParentKind::Politician, id, family).await?;
    Ok(id)
}

/// Insert `members` under `parent_id`, stopping at the first duplicate name.
/// The caller's rollback discards any rows already written by this call.
async fn insert_family(
    conn: &Connection,
    kind: ParentKind,
    parent_id: i64,
    members: &[NewFamilyMember],
) -> Result<usize> {
    if members.is_empty() {
        return Ok(0);
    }

    let t = tables(kind);
    let sql = format!(
        "INSERT INTO {} ({}, name, relation_type, education_location, university, degree_level, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        t.family, t.foreign_key
    );
    let now = Utc::now().to_rfc3339();

    for member in members {
        if family_member_exists(conn, kind, parent_id, &member.name).await? {
            return Err(duplicate_member(kind, &member.name));
        }
        conn.execute(
            &sql,
            params![
                parent_id,
                member.name.as_str(),
                member.relation_type.as_str(),
                member.education.education_location.as_str(),
                member.education.university.as_str(),
                member.education.degree_level.as_str(),
                now.as_str(),
            ],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_member(kind, &member.name)
            } else {
                storage_err(e)
            }
        })?;
    }
    Ok(members.len())
}

async fn delete_with_family(conn: &Connection, kind: ParentKind, id: i64) -> Result<bool> {
    if !parent_exists(conn, kind, id).await? {
        return Ok(false);
    }

    let t = tables(kind);
    let removed = conn
        .execute(
            &format!("DELETE FROM {} WHERE {} = ?1", t.family, t.foreign_key),
            params![id],
        )
        .await
        .map_err(storage_err)?;
    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", t.parent), params![id])
        .await
        .map_err(storage_err)?;

    debug!(%kind, id, family_removed = removed, "cascade delete");
    Ok(true)
}

async fn parent_exists(conn: &Connection, kind: ParentKind, id: i64) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", tables(kind).parent);
    let rows = conn.query(&sql, params![id]).await.map_err(storage_err)?;
    has_row(rows).await
}

async fn politician_exists(conn: &Connection, name: &str, party: &str) -> Result<bool> {
    let rows = conn
        .query(
            "SELECT 1 FROM politicians WHERE name = ?1 AND party = ?2 LIMIT 1",
            params![name, party],
        )
        .await
        .map_err(storage_err)?;
    has_row(rows).await
}

async fn family_member_exists(
    conn: &Connection,
    kind: ParentKind,
    parent_id: i64,
    name: &str,
) -> Result<bool> {
    let t = tables(kind);
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?1 AND name = ?2 LIMIT 1",
        t.family, t.foreign_key
    );
    let rows = conn
        .query(&sql, params![parent_id, name])
        .await
        .map_err(storage_err)?;
    has_row(rows).await
}

async fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let rows = conn
        .query(&format!("SELECT COUNT(*) FROM {table}"), params![])
        .await
        .map_err(storage_err)?;
    first_count(rows).await
}

async fn has_row(mut rows: libsql::Rows) -> Result<bool> {
    Ok(rows.next().await.map_err(storage_err)?.is_some())
}

async fn first_count(mut rows: libsql::Rows) -> Result<u64> {
    match rows.next().await.map_err(storage_err)? {
        Some(row) => {
            let n = row.get::<i64>(0).map_err(storage_err)?;
            Ok(u64::try_from(n).unwrap_or(0))
        }
        None => Ok(0),
    }
}

fn duplicate_politician(record: &NewPolitician) -> EdutrackError {
    EdutrackError::duplicate(format!(
        "politician '{}' from party '{}' already exists",
        record.name, record.party
    ))
}

fn duplicate_member(kind: ParentKind, name: &str) -> EdutrackError {
    EdutrackError::duplicate(format!("family member '{name}' already exists for this {kind}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edutrack_shared::{EducationInfo, OfficialEntry, PoliticianEntry};
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("edutrack_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn official(name: &str) -> NewOfficial {
        NewOfficial {
            name: name.into(),
            department: "IAS".into(),
            joining_year: 2015,
            education: EducationInfo::new("Masters", "Harvard University", "USA"),
        }
    }

    fn politician(name: &str, party: &str) -> NewPolitician {
        NewPolitician {
            name: name.into(),
            party: party.into(),
            position: "MP".into(),
            education: EducationInfo::new("PhD", "Delhi University", "India"),
        }
    }

    fn member(name: &str) -> NewFamilyMember {
        NewFamilyMember {
            name: name.into(),
            relation_type: "Daughter".into(),
            education: EducationInfo::new("Bachelors", "McGill University", "Canada"),
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 2);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("edutrack_test_{}.db", Uuid::now_v7()));
        let _s1 = Storage::open(&tmp).await.expect("first open");
        drop(_s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 2);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let storage = test_storage().await;
        let officials = storage.list_officials().await.expect("list officials");
        assert!(officials.is_empty());
        assert!(officials.family.is_empty());
        let politicians = storage.list_politicians().await.expect("list politicians");
        assert!(politicians.is_empty());
        assert_eq!(storage.count_politicians().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn add_politician_then_exists() {
        let storage = test_storage().await;
        assert!(!storage.politician_exists("Politician 1", "Party A").await.unwrap());

        let created = storage
            .add_politician(&politician("Politician 1", "Party A"), &[])
            .await
            .expect("add politician");
        assert!(created.id > 0);
        assert_eq!(created.party, "Party A");

        assert!(storage.politician_exists("Politician 1", "Party A").await.unwrap());
        assert!(!storage.politician_exists("Politician 1", "Party B").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_politician_rejected() {
        let storage = test_storage().await;
        storage
            .add_politician(&politician("Politician 1", "Party A"), &[])
            .await
            .unwrap();
        let before = storage.count_politicians().await.unwrap();

        let err = storage
            .add_politician(&politician("Politician 1", "Party A"), &[member("Meera")])
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("Party A"));
        assert_eq!(storage.count_politicians().await.unwrap(), before);

        // Same name under another party is a different politician.
        storage
            .add_politician(&politician("Politician 1", "Party B"), &[])
            .await
            .expect("same name, other party");
        assert_eq!(storage.count_politicians().await.unwrap(), before + 1);
    }

    #[tokio::test]
    async fn unique_constraint_backs_politician_check() {
        let storage = test_storage().await;
        storage
            .add_politician(&politician("Politician 1", "Party A"), &[])
            .await
            .unwrap();

        let err = storage
            .conn
            .execute(
                "INSERT INTO politicians (name, party, position, created_at) VALUES (?1, ?2, ?3, ?4)",
                params!["Politician 1", "Party A", "MLA", "2024-01-01T00:00:00Z"],
            )
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn add_official_with_family() {
        let storage = test_storage().await;
        let created = storage
            .add_official(&official("Officer 1"), &[member("Rohan"), member("Asha")])
            .await
            .expect("add official");

        assert!(storage.official_exists(created.id).await.unwrap());
        assert!(
            storage
                .official_family_member_exists(created.id, "Rohan")
                .await
                .unwrap()
        );

        let listing = storage.list_officials().await.unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0], created);
        assert_eq!(listing.family.len(), 2);
        assert!(listing.family.iter().all(|m| m.parent_id == created.id));
        assert!(listing.family.iter().all(|m| m.parent_name == "Officer 1"));
        assert_eq!(listing.family[0].name, "Rohan");
        assert_eq!(listing.family[0].education.education_location, "Canada");
    }

    #[tokio::test]
    async fn officials_have_no_uniqueness_rule() {
        let storage = test_storage().await;
        storage.add_official(&official("Officer 1"), &[]).await.unwrap();
        storage.add_official(&official("Officer 1"), &[]).await.unwrap();
        assert_eq!(storage.count_officials().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_politician_cascades() {
        let storage = test_storage().await;
        let p = storage
            .add_politician(&politician("Politician 1", "Party A"), &[member("Meera"), member("Arjun")])
            .await
            .unwrap();
        assert_eq!(
            storage
                .count_family_members(ParentKind::Politician, p.id)
                .await
                .unwrap(),
            2
        );

        assert!(storage.delete_politician(p.id).await.expect("delete"));
        assert_eq!(
            storage
                .count_family_members(ParentKind::Politician, p.id)
                .await
                .unwrap(),
            0
        );
        assert!(!storage.politician_exists("Politician 1", "Party A").await.unwrap());

        // Second delete finds nothing.
        assert!(!storage.delete_politician(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_official_cascades() {
        let storage = test_storage().await;
        let kept = storage
            .add_official(&official("Officer 1"), &[member("Rohan")])
            .await
            .unwrap();
        let removed = storage
            .add_official(&official("Officer 2"), &[member("Rohan"), member("Asha")])
            .await
            .unwrap();

        assert!(storage.delete_official(removed.id).await.unwrap());
        assert_eq!(
            storage
                .count_family_members(ParentKind::Official, removed.id)
                .await
                .unwrap(),
            0
        );
        assert!(!storage.official_exists(removed.id).await.unwrap());

        let listing = storage.list_officials().await.unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.family.len(), 1);
        assert_eq!(listing.family[0].parent_id, kept.id);
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let storage = test_storage().await;
        assert!(!storage.delete_official(42).await.expect("no error"));
        assert!(!storage.delete_politician(42).await.expect("no error"));
    }

    #[tokio::test]
    async fn batch_with_existing_duplicate_applies_nothing() {
        let storage = test_storage().await;
        let p = storage
            .add_politician(&politician("Politician 1", "Party A"), &[member("Meera")])
            .await
            .unwrap();
        let before = storage.list_politicians().await.unwrap();

        let err = storage
            .add_family_members_to_politician(
                p.id,
                &[member("Kabir"), member("Meera"), member("Tara")],
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("Meera"));

        let after = storage.list_politicians().await.unwrap();
        assert_eq!(before, after);
        assert!(
            !storage
                .politician_family_member_exists(p.id, "Kabir")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn batch_with_repeated_name_applies_nothing() {
        let storage = test_storage().await;
        let o = storage.add_official(&official("Officer 1"), &[]).await.unwrap();

        let err = storage
            .add_family_members_to_official(o.id, &[member("Rohan"), member("Rohan")])
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(
            storage
                .count_family_members(ParentKind::Official, o.id)
                .await
                .unwrap(),
            0
        );
    }

    /// Abort any family insert for `name` with a non-constraint error.
    async fn fail_family_insert(storage: &Storage, table: &str, name: &str) {
        storage
            .conn
            .execute_batch(&format!(
                "CREATE TRIGGER fail_{table} BEFORE INSERT ON {table}
                 WHEN NEW.name = '{name}'
                 BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;"
            ))
            .await
            .expect("create trigger");
    }

    #[tokio::test]
    async fn storage_failure_mid_batch_applies_nothing() {
        let storage = test_storage().await;
        let p = storage
            .add_politician(&politician("Politician 1", "Party A"), &[member("Meera")])
            .await
            .unwrap();
        fail_family_insert(&storage, "politician_family", "Tara").await;
        let before = storage.list_politicians().await.unwrap();

        let err = storage
            .add_family_members_to_politician(p.id, &[member("Kabir"), member("Tara")])
            .await
            .unwrap_err();
        assert!(matches!(err, EdutrackError::Storage(_)));
        assert!(!err.is_duplicate());

        assert_eq!(storage.list_politicians().await.unwrap(), before);
        assert_eq!(
            storage
                .count_family_members(ParentKind::Politician, p.id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_new_parent() {
        let storage = test_storage().await;
        fail_family_insert(&storage, "official_family", "Dev").await;

        let err = storage
            .add_official(&official("Officer 1"), &[member("Asha"), member("Dev")])
            .await
            .unwrap_err();
        assert!(matches!(err, EdutrackError::Storage(_)));
        assert_eq!(storage.count_officials().await.unwrap(), 0);

        // The connection is usable again after the rollback.
        storage
            .add_official(&official("Officer 2"), &[member("Asha")])
            .await
            .expect("insert after rollback");
        assert_eq!(storage.count_officials().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn batch_append_succeeds() {
        let storage = test_storage().await;
        let o = storage
            .add_official(&official("Officer 1"), &[member("Rohan")])
            .await
            .unwrap();

        let added = storage
            .add_family_members_to_official(o.id, &[member("Asha"), member("Dev")])
            .await
            .expect("append");
        assert_eq!(added, 2);
        assert_eq!(
            storage
                .count_family_members(ParentKind::Official, o.id)
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn family_names_are_scoped_per_parent() {
        let storage = test_storage().await;
        let a = storage.add_official(&official("Officer 1"), &[member("Rohan")]).await.unwrap();
        let b = storage.add_official(&official("Officer 2"), &[]).await.unwrap();

        storage
            .add_family_members_to_official(b.id, &[member("Rohan")])
            .await
            .expect("same name under another parent");
        assert!(storage.official_family_member_exists(a.id, "Rohan").await.unwrap());
        assert!(storage.official_family_member_exists(b.id, "Rohan").await.unwrap());

        // Official and politician family tables are independent.
        let p = storage
            .add_politician(&politician("Politician 1", "Party A"), &[])
            .await
            .unwrap();
        assert!(
            !storage
                .politician_family_member_exists(p.id, "Rohan")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn duplicate_family_rolls_back_new_parent() {
        let storage = test_storage().await;
        let err = storage
            .add_politician(&politician("Politician 1", "Party A"), &[member("Meera"), member("Meera")])
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert!(!storage.politician_exists("Politician 1", "Party A").await.unwrap());
        assert_eq!(storage.count_politicians().await.unwrap(), 0);

        let err = storage
            .add_official(&official("Officer 1"), &[member("Asha"), member("Asha")])
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(storage.count_officials().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn family_for_missing_parent_is_rejected() {
        let storage = test_storage().await;
        let err = storage
            .add_family_members_to_politician(99, &[member("Meera")])
            .await
            .unwrap_err();
        assert!(!err.is_duplicate());
        assert!(err.to_string().contains("politician 99 does not exist"));
    }

    #[tokio::test]
    async fn seed_only_fills_empty_store() {
        let storage = test_storage().await;
        let dataset = Dataset {
            officials: vec![OfficialEntry {
                record: official("Officer 1"),
                family: vec![member("Rohan")],
            }],
            politicians: vec![
                PoliticianEntry {
                    record: politician("Politician 1", "Party A"),
                    family: vec![member("Meera"), member("Arjun")],
                },
                PoliticianEntry {
                    record: politician("Politician 2", "Party B"),
                    family: vec![],
                },
            ],
        };

        assert!(storage.seed(&dataset).await.expect("seed"));
        assert_eq!(storage.count_officials().await.unwrap(), 1);
        assert_eq!(storage.count_politicians().await.unwrap(), 2);
        assert_eq!(storage.list_politicians().await.unwrap().family.len(), 2);

        assert!(!storage.seed(&dataset).await.expect("second seed"));
        assert_eq!(storage.count_politicians().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn seed_with_duplicate_writes_nothing() {
        let storage = test_storage().await;
        let entry = PoliticianEntry {
            record: politician("Politician 1", "Party A"),
            family: vec![],
        };
        let dataset = Dataset {
            officials: vec![OfficialEntry {
                record: official("Officer 1"),
                family: vec![],
            }],
            politicians: vec![entry.clone(), entry],
        };

        let err = storage.seed(&dataset).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(storage.count_officials().await.unwrap(), 0);
        assert_eq!(storage.count_politicians().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn import_run_lifecycle() {
        let storage = test_storage().await;
        let run_id = storage.start_import_run("government").await.expect("start run");
        assert!(!run_id.is_empty());

        let runs = storage.list_import_runs(10).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].finished_at.is_none());

        let stats = serde_json::json!({"added": 1, "skipped": 0}).to_string();
        storage
            .finish_import_run(&run_id, &stats)
            .await
            .expect("finish run");

        let runs = storage.list_import_runs(10).await.unwrap();
        assert_eq!(runs[0].id, run_id);
        assert_eq!(runs[0].source, "government");
        assert!(runs[0].finished_at.is_some());
        assert!(runs[0].stats_json.as_deref().unwrap().contains("added"));
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("edutrack_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.add_politician(&politician("Politician 1", "Party A"), &[])
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        assert_eq!(ro.list_politicians().await.unwrap().entries.len(), 1);

        let result = ro
            .add_politician(&politician("Politician 2", "Party A"), &[])
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));
        assert!(ro.delete_politician(1).await.is_err());
    }

    #[tokio::test]
    async fn readonly_requires_existing_file() {
        let tmp = std::env::temp_dir().join(format!("edutrack_missing_{}.db", Uuid::now_v7()));
        let result = Storage::open_readonly(&tmp).await;
        assert!(result.is_err());
    }
}
