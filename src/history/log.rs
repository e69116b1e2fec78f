//! Histórico persistente em SQLite.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use crate::cache::{parse_timestamp, timestamp};
use crate::types::responses::HistoryEntry;
use crate::{RadarError, RadarResult};

/// Histórico de avaliações.
pub struct HistoryLog {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("conn", &"<sqlite>")
            .finish()
    }
}

impl HistoryLog {
    /// Abre (ou cria) o banco do histórico.
    pub fn open(path: &Path) -> RadarResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Cria um histórico em memória.
    pub fn in_memory() -> RadarResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RadarResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS assessment_history (
                id TEXT PRIMARY KEY,
                product_name TEXT NOT NULL,
                trust_score INTEGER,
                risk_level TEXT,
                assessment_data TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_created ON assessment_history(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_history_product ON assessment_history(product_name);
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> RadarResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RadarError::other("conexão do histórico envenenada"))
    }

    /// Grava uma avaliação, substituindo qualquer registro com o mesmo ID.
    ///
    /// O `created_at` é sempre renovado.
    pub fn save(
        &self,
        id: &str,
        product_name: &str,
        trust_score: i64,
        risk_level: &str,
        document: &Value,
    ) -> RadarResult<()> {
        let data = serde_json::to_string(document)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO assessment_history
                (id, product_name, trust_score, risk_level, assessment_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                product_name,
                trust_score,
                risk_level,
                data,
                timestamp(Utc::now())
            ],
        )?;

        tracing::debug!(id = %id, product = %product_name, "History entry saved");
        Ok(())
    }

    /// Lista o histórico, mais recentes primeiro.
    pub fn list(&self, limit: usize, offset: usize) -> RadarResult<Vec<HistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, product_name, trust_score, risk_level, assessment_data, created_at
             FROM assessment_history
             ORDER BY created_at DESC, id ASC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt
            .query_map(
                params![
                    i64::try_from(limit).unwrap_or(i64::MAX),
                    i64::try_from(offset).unwrap_or(i64::MAX)
                ],
                raw_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawEntry::into_entry).collect()
    }

    /// Busca uma avaliação pelo ID.
    pub fn get(&self, id: &str) -> RadarResult<Option<HistoryEntry>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT id, product_name, trust_score, risk_level, assessment_data, created_at
                 FROM assessment_history WHERE id = ?1",
                params![id],
                raw_from_row,
            )
            .optional()?;

        raw.map(RawEntry::into_entry).transpose()
    }

    /// Remove uma avaliação. Retorna `true` se ela existia.
    pub fn delete(&self, id: &str) -> RadarResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM assessment_history WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Remove todo o histórico. Retorna quantas entradas foram removidas.
    pub fn clear(&self) -> RadarResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM assessment_history", [])?;
        tracing::info!(removed, "History cleared");
        Ok(removed)
    }

    /// Número de entradas no histórico.
    pub fn count(&self) -> RadarResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM assessment_history", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Linha crua; a conversão do JSON e do timestamp fica fora do callback do rusqlite.
struct RawEntry {
    id: String,
    product_name: String,
    trust_score: Option<i64>,
    risk_level: Option<String>,
    assessment_data: String,
    created_at: String,
}

impl RawEntry {
    fn into_entry(self) -> RadarResult<HistoryEntry> {
        Ok(HistoryEntry {
            id: self.id,
            product_name: self.product_name,
            trust_score: self.trust_score.unwrap_or_default(),
            risk_level: self.risk_level.unwrap_or_default(),
            assessment_data: serde_json::from_str(&self.assessment_data)?,
            timestamp: parse_timestamp(&self.created_at)?,
        })
    }
}

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        id: row.get(0)?,
        product_name: row.get(1)?,
        trust_score: row.get(2)?,
        risk_level: row.get(3)?,
        assessment_data: row.get(4)?,
        created_at: row.get(5)?,
    })
}
