// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Per-repository file-version bookkeeping (spec §6).
//!
//! Independent of the code graph store: a file's version history outlives
//! any particular translation, and an ephemeral (uncommitted, e.g. an
//! editor buffer) version needs to be cleanly discardable without touching
//! graph data at all. One SQLite table per repository, named after the
//! repository so that multiple repos can share one database file.

use std::path::Path;

use cpg_core::CpgError;
use rusqlite::{params, Connection, OptionalExtension};

pub type Result<T> = std::result::Result<T, CpgError>;

fn driver_error(context: &str, source: rusqlite::Error) -> CpgError {
    CpgError::Driver {
        context: context.to_string(),
        source: anyhow::Error::new(source),
    }
}

/// A file version's lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Active,
    Deleted,
    Renamed,
}

impl FileStatus {
    fn as_str(self) -> &'static str {
        match self {
            FileStatus::Active => "active",
            FileStatus::Deleted => "deleted",
            FileStatus::Renamed => "renamed",
        }
    }

    fn parse(s: &str) -> FileStatus {
        match s {
            "deleted" => FileStatus::Deleted,
            "renamed" => FileStatus::Renamed,
            _ => FileStatus::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
    pub file_id: u32,
    pub file_sha: String,
    pub relative_path: String,
    pub ephemeral: bool,
    pub commit_id: Option<String>,
    pub status: FileStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepoStats {
    pub total: u64,
    pub ephemeral: u64,
    pub active: u64,
    pub deleted: u64,
}

/// A repository name sanitized into a valid SQLite identifier fragment:
/// any byte outside `[A-Za-z0-9_]` becomes `_`. Collisions between distinct
/// repo names that sanitize to the same fragment are out of scope (spec
/// Non-goals: no cross-repo namespace arbitration).
fn table_name(repo: &str) -> String {
    let sanitized: String = repo
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("files_{sanitized}")
}

pub struct FileVersionStore {
    conn: Connection,
}

impl FileVersionStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| driver_error("open file version db", e))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| driver_error("set pragmas", e))?;
        Ok(FileVersionStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| driver_error("open in-memory file version db", e))?;
        Ok(FileVersionStore { conn })
    }

    /// Create `repo`'s table if it doesn't exist yet. Idempotent, and cheap
    /// enough to call before every operation rather than requiring callers
    /// to remember a separate registration step.
    fn ensure_table(&self, repo: &str) -> Result<()> {
        let table = table_name(repo);
        let schema = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                file_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                file_sha       TEXT NOT NULL,
                relative_path  TEXT NOT NULL,
                ephemeral      INTEGER NOT NULL,
                commit_id      TEXT,
                status         TEXT NOT NULL,
                created_at     INTEGER NOT NULL,
                updated_at     INTEGER NOT NULL,
                UNIQUE(file_sha, relative_path, commit_id)
            )"
        );
        self.conn.execute(&schema, []).map_err(|e| driver_error("create file version table", e))?;
        Ok(())
    }

    /// Look up an existing version by `(file_sha, relative_path, commit_id)`,
    /// or insert a fresh one. Returns the file id either way — this is the
    /// only way a caller obtains the id a translation's nodes will be
    /// composed under.
    pub fn get_or_create_file_id(
        &self,
        repo: &str,
        relative_path: &str,
        file_sha: &str,
        ephemeral: bool,
        commit_id: Option<&str>,
        now_unix: i64,
    ) -> Result<u32> {
        self.ensure_table(repo)?;
        let table = table_name(repo);

        let existing: Option<i64> = self
            .conn
            .query_row(
                &format!(
                    "SELECT file_id FROM {table}
                     WHERE file_sha = ?1 AND relative_path = ?2 AND commit_id IS ?3"
                ),
                params![file_sha, relative_path, commit_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| driver_error("lookup file version", e))?;

        if let Some(id) = existing {
            return Ok(id as u32);
        }

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {table}
                     (file_sha, relative_path, ephemeral, commit_id, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"
                ),
                params![
                    file_sha,
                    relative_path,
                    ephemeral as i64,
                    commit_id,
                    FileStatus::Active.as_str(),
                    now_unix,
                ],
            )
            .map_err(|e| driver_error("insert file version", e))?;
        Ok(self.conn.last_insert_rowid() as u32)
    }

    pub fn update_status(&self, repo: &str, file_id: u32, status: FileStatus, now_unix: i64) -> Result<()> {
        self.ensure_table(repo)?;
        let table = table_name(repo);
        self.conn
            .execute(
                &format!("UPDATE {table} SET status = ?1, updated_at = ?2 WHERE file_id = ?3"),
                params![status.as_str(), now_unix, file_id],
            )
            .map_err(|e| driver_error("update file version status", e))?;
        Ok(())
    }

    /// Remove every ephemeral version in `repo`, returning the count deleted.
    /// Ephemeral versions never carry a `commit_id`, so this never touches
    /// committed history.
    pub fn delete_ephemeral(&self, repo: &str) -> Result<usize> {
        self.ensure_table(repo)?;
        let table = table_name(repo);
        let n = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE ephemeral = 1"), [])
            .map_err(|e| driver_error("delete ephemeral file versions", e))?;
        Ok(n)
    }

    pub fn get(&self, repo: &str, file_id: u32) -> Result<Option<FileRecord>> {
        self.ensure_table(repo)?;
        let table = table_name(repo);
        self.conn
            .query_row(
                &format!(
                    "SELECT file_id,file_sha,relative_path,ephemeral,commit_id,status,created_at,updated_at
                     FROM {table} WHERE file_id = ?1"
                ),
                params![file_id],
                row_to_record,
            )
            .optional()
            .map_err(|e| driver_error("read file version", e))
    }

    pub fn stats(&self, repo: &str) -> Result<RepoStats> {
        self.ensure_table(repo)?;
        let table = table_name(repo);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT ephemeral, status FROM {table}"))
            .map_err(|e| driver_error("prepare stats query", e))?;
        let rows = stmt
            .query_map([], |row| {
                let ephemeral: i64 = row.get(0)?;
                let status: String = row.get(1)?;
                Ok((ephemeral != 0, FileStatus::parse(&status)))
            })
            .map_err(|e| driver_error("run stats query", e))?;

        let mut stats = RepoStats::default();
        for row in rows {
            let (ephemeral, status) = row.map_err(|e| driver_error("read stats row", e))?;
            stats.total += 1;
            if ephemeral {
                stats.ephemeral += 1;
            }
            match status {
                FileStatus::Active => stats.active += 1,
                FileStatus::Deleted => stats.deleted += 1,
                FileStatus::Renamed => {}
            }
        }
        Ok(stats)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let file_id: i64 = row.get(0)?;
    let status: String = row.get(5)?;
    Ok(FileRecord {
        file_id: file_id as u32,
        file_sha: row.get(1)?,
        relative_path: row.get(2)?,
        ephemeral: row.get::<_, i64>(3)? != 0,
        commit_id: row.get(4)?,
        status: FileStatus::parse(&status),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_and_looks_up_by_identity() {
        let store = FileVersionStore::open_in_memory().unwrap();
        let id = store.get_or_create_file_id("demo-repo", "src/main.rs", "sha1", false, None, 100).unwrap();
        let again = store.get_or_create_file_id("demo-repo", "src/main.rs", "sha1", false, None, 200).unwrap();
        assert_eq!(id, again);

        let record = store.get("demo-repo", id).unwrap().unwrap();
        assert_eq!(record.relative_path, "src/main.rs");
        assert_eq!(record.status, FileStatus::Active);
    }

    #[test]
    fn distinct_commits_get_distinct_ids() {
        let store = FileVersionStore::open_in_memory().unwrap();
        let a = store.get_or_create_file_id("repo", "f.rs", "sha", false, Some("c1"), 0).unwrap();
        let b = store.get_or_create_file_id("repo", "f.rs", "sha", false, Some("c2"), 0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn delete_ephemeral_leaves_committed_versions() {
        let store = FileVersionStore::open_in_memory().unwrap();
        let committed = store.get_or_create_file_id("repo", "f.rs", "sha", false, Some("c1"), 0).unwrap();
        store.get_or_create_file_id("repo", "scratch.rs", "sha2", true, None, 0).unwrap();

        let deleted = store.delete_ephemeral("repo").unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get("repo", committed).unwrap().is_some());
    }

    #[test]
    fn stats_reflect_status_and_ephemerality() {
        let store = FileVersionStore::open_in_memory().unwrap();
        let id = store.get_or_create_file_id("repo", "f.rs", "sha", false, None, 0).unwrap();
        store.update_status("repo", id, FileStatus::Deleted, 10).unwrap();
        store.get_or_create_file_id("repo", "g.rs", "sha2", true, None, 0).unwrap();

        let stats = store.stats("repo").unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.ephemeral, 1);
        assert_eq!(stats.deleted, 1);
    }
}
