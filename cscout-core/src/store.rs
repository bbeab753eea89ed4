//! Finding store: records analyzed samples, their findings, and proposed fixes.
//!
//! The engine only writes here; detection never consults stored results. The
//! recorded samples double as a training corpus for the learned classifier.

use crate::category::BugCategory;
use crate::error::StoreError;
use crate::finding::{DetectorKind, Finding, Fix};
use crate::sample::TrainingExample;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// Persistence collaborator consumed by the recording pipeline.
pub trait FindingStore: Send + Sync {
    /// Record an analyzed source text, returning its id.
    fn store_sample(&self, name: &str, text: &str, has_bugs: bool) -> Result<i64, StoreError>;

    /// Record a finding against a sample, returning its id.
    fn store_finding(&self, sample_id: i64, finding: &Finding) -> Result<i64, StoreError>;

    /// Record the fix proposed for a finding.
    fn store_fix(&self, finding_id: i64, fix: &Fix) -> Result<(), StoreError>;

    /// Stored findings with their fix, optionally restricted to one category.
    fn query_findings(
        &self,
        category: Option<BugCategory>,
    ) -> Result<Vec<(Finding, Option<Fix>)>, StoreError>;

    /// Every recorded sample labelled with the categories found in it.
    ///
    /// Classifier and engine findings are excluded so the model never trains
    /// on its own predictions.
    fn training_examples(&self) -> Result<Vec<TrainingExample>, StoreError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS code_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name TEXT NOT NULL,
    code_content TEXT NOT NULL,
    has_bugs INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bugs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code_sample_id INTEGER NOT NULL REFERENCES code_samples(id),
    bug_type TEXT NOT NULL,
    description TEXT NOT NULL,
    line_number INTEGER NOT NULL,
    severity TEXT NOT NULL,
    confidence REAL,
    detector TEXT NOT NULL,
    fingerprint TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS fixes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bug_id INTEGER NOT NULL REFERENCES bugs(id),
    line_number INTEGER NOT NULL,
    original_code TEXT NOT NULL,
    fixed_code TEXT NOT NULL,
    edit_kind TEXT NOT NULL,
    fix_description TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_bugs_type ON bugs(bug_type);
CREATE INDEX IF NOT EXISTS idx_fixes_bug ON fixes(bug_id);
";

/// SQLite-backed [`FindingStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Number of recorded samples.
    pub fn sample_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM code_samples", [], |row| row.get(0))?;
        to_usize("code_samples", count)
    }
}

/// Raw columns of a bugs ⟕ fixes row before validation.
struct FindingRow {
    bug_type: String,
    description: String,
    line_number: i64,
    severity: String,
    confidence: Option<f64>,
    detector: String,
    fix: Option<FixRow>,
}

struct FixRow {
    line_number: i64,
    original_code: String,
    fixed_code: String,
    edit_kind: String,
    fix_description: String,
}

impl FindingRow {
    fn into_pair(self) -> Result<(Finding, Option<Fix>), StoreError> {
        let category: BugCategory = self
            .bug_type
            .parse()
            .map_err(|e| StoreError::corrupt("bugs", e))?;
        let finding = Finding::restore(
            category,
            to_usize("bugs", self.line_number)?,
            self.description,
            self.severity
                .parse()
                .map_err(|e| StoreError::corrupt("bugs", e))?,
            self.confidence,
            self.detector
                .parse::<DetectorKind>()
                .map_err(|e| StoreError::corrupt("bugs", e))?,
        );

        let fix = match self.fix {
            Some(row) => Some(Fix {
                category,
                applies_to_line: to_usize("fixes", row.line_number)?,
                original_text: row.original_code,
                replacement_text: row.fixed_code,
                edit: row
                    .edit_kind
                    .parse()
                    .map_err(|e| StoreError::corrupt("fixes", e))?,
                note: row.fix_description,
            }),
            None => None,
        };

        Ok((finding, fix))
    }
}

fn to_usize(table: &str, value: i64) -> Result<usize, StoreError> {
    usize::try_from(value).map_err(|_| StoreError::corrupt(table, format!("negative value {value}")))
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl FindingStore for SqliteStore {
    fn store_sample(&self, name: &str, text: &str, has_bugs: bool) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO code_samples (file_name, code_content, has_bugs, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, text, has_bugs, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn store_finding(&self, sample_id: i64, finding: &Finding) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO bugs (code_sample_id, bug_type, description, line_number, severity, confidence, detector, fingerprint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                sample_id,
                finding.category().as_str(),
                finding.description(),
                to_i64(finding.line()),
                finding.severity().as_str(),
                finding.confidence(),
                finding.detector().as_str(),
                finding.fingerprint(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn store_fix(&self, finding_id: i64, fix: &Fix) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO fixes (bug_id, line_number, original_code, fixed_code, edit_kind, fix_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                finding_id,
                to_i64(fix.applies_to_line),
                fix.original_text,
                fix.replacement_text,
                fix.edit.as_str(),
                fix.note,
            ],
        )?;
        Ok(())
    }

    fn query_findings(
        &self,
        category: Option<BugCategory>,
    ) -> Result<Vec<(Finding, Option<Fix>)>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT b.bug_type, b.description, b.line_number, b.severity, b.confidence, b.detector,
                    f.line_number, f.original_code, f.fixed_code, f.edit_kind, f.fix_description
             FROM bugs b
             LEFT JOIN fixes f ON f.bug_id = b.id
             WHERE ?1 IS NULL OR b.bug_type = ?1
             ORDER BY b.id, f.id",
        )?;

        let rows = stmt
            .query_map(params![category.map(|c| c.as_str())], |row| {
                let fix_line: Option<i64> = row.get(6)?;
                let fix = match fix_line {
                    Some(line_number) => Some(FixRow {
                        line_number,
                        original_code: row.get(7)?,
                        fixed_code: row.get(8)?,
                        edit_kind: row.get(9)?,
                        fix_description: row.get(10)?,
                    }),
                    None => None,
                };
                Ok(FindingRow {
                    bug_type: row.get(0)?,
                    description: row.get(1)?,
                    line_number: row.get(2)?,
                    severity: row.get(3)?,
                    confidence: row.get(4)?,
                    detector: row.get(5)?,
                    fix,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(FindingRow::into_pair).collect()
    }

    fn training_examples(&self) -> Result<Vec<TrainingExample>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT cs.id, cs.code_content, b.bug_type
             FROM code_samples cs
             LEFT JOIN bugs b
               ON b.code_sample_id = cs.id AND b.detector NOT IN ('classifier', 'engine')
             ORDER BY cs.id, b.id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut examples: BTreeMap<i64, TrainingExample> = BTreeMap::new();
        for (id, content, bug_type) in rows {
            let example = examples
                .entry(id)
                .or_insert_with(|| TrainingExample::clean(content));
            if let Some(bug_type) = bug_type {
                let category: BugCategory = bug_type
                    .parse()
                    .map_err(|e| StoreError::corrupt("bugs", e))?;
                example.labels.insert(category);
            }
        }

        Ok(examples.into_values().collect())
    }
}
