//! SQL migration definitions for the EduTrack database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: officials, politicians, family tables",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Public officials (civil servants)
CREATE TABLE IF NOT EXISTS officials (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    name               TEXT NOT NULL,
    department         TEXT NOT NULL,
    joining_year       INTEGER NOT NULL,
    education_location TEXT NOT NULL DEFAULT 'India',
    university         TEXT NOT NULL DEFAULT 'Unknown',
    degree_level       TEXT NOT NULL DEFAULT 'Unknown',
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_officials_name ON officials(name);

-- Politicians, unique by (name, party)
CREATE TABLE IF NOT EXISTS politicians (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    name               TEXT NOT NULL,
    party              TEXT NOT NULL,
    position           TEXT NOT NULL,
    education_location TEXT NOT NULL DEFAULT 'India',
    university         TEXT NOT NULL DEFAULT 'Unknown',
    degree_level       TEXT NOT NULL DEFAULT 'Unknown',
    created_at         TEXT NOT NULL,
    UNIQUE(name, party)
);

CREATE INDEX IF NOT EXISTS idx_politicians_name ON politicians(name);

-- Family members of officials
CREATE TABLE IF NOT EXISTS official_family (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    official_id        INTEGER NOT NULL REFERENCES officials(id) ON DELETE CASCADE,
    name               TEXT NOT NULL,
    relation_type      TEXT NOT NULL,
    education_location TEXT NOT NULL DEFAULT 'India',
    university         TEXT NOT NULL DEFAULT 'Unknown',
    degree_level       TEXT NOT NULL DEFAULT 'Unknown',
    created_at         TEXT NOT NULL,
    UNIQUE(official_id, name)
);

CREATE INDEX IF NOT EXISTS idx_official_family_parent ON official_family(official_id);

-- Family members of politicians
CREATE TABLE IF NOT EXISTS politician_family (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    politician_id      INTEGER NOT NULL REFERENCES politicians(id) ON DELETE CASCADE,
    name               TEXT NOT NULL,
    relation_type      TEXT NOT NULL,
    education_location TEXT NOT NULL DEFAULT 'India',
    university         TEXT NOT NULL DEFAULT 'Unknown',
    degree_level       TEXT NOT NULL DEFAULT 'Unknown',
    created_at         TEXT NOT NULL,
    UNIQUE(politician_id, name)
);

CREATE INDEX IF NOT EXISTS idx_politician_family_parent ON politician_family(politician_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Import run history",
            sql: r#"
CREATE TABLE IF NOT EXISTS import_runs (
    id          TEXT PRIMARY KEY,
    source      TEXT NOT NULL,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    stats_json  TEXT
);

CREATE INDEX IF NOT EXISTS idx_import_runs_started ON import_runs(started_at);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}
