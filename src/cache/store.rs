//! Cache persistente de avaliações, endereçado por fingerprint.
//!
//! Cada linha guarda o documento da avaliação, os campos de indexação,
//! os timestamps de criação/acesso e o contador de acessos. Todas as
//! operações são unidades atômicas sobre o SQLite; a conexão fica atrás
//! de um `Mutex` para que o store possa ser compartilhado via `Arc`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use crate::types::requests::IndexFields;
use crate::types::responses::{CacheMetadata, CacheStats, CacheSummary, CachedAssessment};
use crate::{RadarError, RadarResult};

const SUMMARY_COLUMNS: &str = "cache_key, product_name, company_name, sha1, url,
                               created_at, accessed_at, access_count";

/// Store de resultados de avaliação.
pub struct ResultStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("conn", &"<sqlite>")
            .finish()
    }
}

impl ResultStore {
    /// Abre (ou cria) o banco do cache.
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

    /// Cria um store em memória (útil para testes e execuções efêmeras).
    pub fn in_memory() -> RadarResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RadarResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS assessments (
                cache_key TEXT PRIMARY KEY,
                product_name TEXT NOT NULL,
                product_key TEXT NOT NULL,
                company_name TEXT,
                sha1 TEXT,
                url TEXT,
                assessment_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                accessed_at TEXT NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_assessments_product ON assessments(product_key);
            CREATE INDEX IF NOT EXISTS idx_assessments_created ON assessments(created_at);
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> RadarResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RadarError::other("conexão do cache envenenada"))
    }

    /// Grava (ou substitui) a entrada em `key`.
    ///
    /// Substituição completa: documento, timestamps e contador de acessos
    /// (que volta a 0) são reescritos.
    pub fn put(&self, key: &str, payload: &Value, index: &IndexFields) -> RadarResult<()> {
        self.put_at(key, payload, index, Utc::now())
    }

    pub(crate) fn put_at(
        &self,
        key: &str,
        payload: &Value,
        index: &IndexFields,
        created_at: DateTime<Utc>,
    ) -> RadarResult<()> {
        let data = serde_json::to_string(payload)?;
        let created = timestamp(created_at);

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO assessments
                (cache_key, product_name, product_key, company_name, sha1, url,
                 assessment_data, created_at, accessed_at, access_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, 0)",
            params![
                key,
                &index.product_name,
                product_key(&index.product_name),
                &index.company_name,
                &index.sha1,
                &index.url,
                data,
                created,
            ],
        )?;

        tracing::debug!(cache_key = %key, product = %index.product_name, "Cache entry stored");
        Ok(())
    }

    /// Lê uma entrada, incrementando o contador e o `accessed_at`.
    ///
    /// O incremento e a leitura acontecem na mesma transação, então
    /// leitores concorrentes nunca observam o mesmo contador.
    pub fn get(&self, key: &str) -> RadarResult<Option<CachedAssessment>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE assessments
             SET accessed_at = ?1,
                 access_count = access_count + 1
             WHERE cache_key = ?2",
            params![timestamp(Utc::now()), key],
        )?;

        if updated == 0 {
            return Ok(None);
        }

        let (data, created_at, access_count): (String, String, i64) = tx.query_row(
            "SELECT assessment_data, created_at, access_count
             FROM assessments WHERE cache_key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        tx.commit()?;

        let payload: Value = serde_json::from_str(&data)?;

        Ok(Some(CachedAssessment {
            payload,
            metadata: CacheMetadata {
                cached_at: parse_timestamp(&created_at)?,
                access_count: count(access_count),
            },
        }))
    }

    /// Resumo de uma entrada sem mexer no contador de acessos.
    pub fn peek(&self, key: &str) -> RadarResult<Option<CacheSummary>> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                &format!("SELECT {} FROM assessments WHERE cache_key = ?1", SUMMARY_COLUMNS),
                params![key],
                summary_from_row,
            )
            .optional()?;
        Ok(summary)
    }

    /// Lista resumos, mais recentes primeiro.
    pub fn list(&self, limit: usize, offset: usize) -> RadarResult<Vec<CacheSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assessments
             ORDER BY created_at DESC, cache_key ASC
             LIMIT ?1 OFFSET ?2",
            SUMMARY_COLUMNS
        ))?;

        let summaries = stmt
            .query_map(params![to_sql_int(limit), to_sql_int(offset)], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Busca por substring do nome do produto, sem diferenciar maiúsculas.
    pub fn search_by_product(&self, query: &str) -> RadarResult<Vec<CacheSummary>> {
        let needle = product_key(query);

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assessments
             WHERE instr(product_key, ?1) > 0
             ORDER BY created_at DESC, cache_key ASC",
            SUMMARY_COLUMNS
        ))?;

        let summaries = stmt
            .query_map(params![needle], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Remove uma entrada. Retorna `true` se ela existia.
    pub fn delete(&self, key: &str) -> RadarResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM assessments WHERE cache_key = ?1", params![key])?;
        Ok(removed > 0)
    }

    /// Remove entradas criadas há mais de `retention`.
    ///
    /// Com janela zero, toda entrada não datada no futuro é removida. Uma
    /// janela além do calendário suportado não remove nada.
    pub fn purge_older_than(&self, retention: chrono::Duration) -> RadarResult<usize> {
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            tracing::info!(
                retention_days = retention.num_days(),
                "Retention window exceeds calendar, nothing to purge"
            );
            return Ok(0);
        };
        let cutoff = timestamp(cutoff);

        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM assessments WHERE created_at <= ?1",
            params![cutoff],
        )?;

        tracing::info!(removed, cutoff = %cutoff, "Cache purge finished");
        Ok(removed)
    }

    /// Estatísticas agregadas.
    pub fn stats(&self) -> RadarResult<CacheStats> {
        let conn = self.lock()?;
        let (total, accesses, oldest, newest): (i64, i64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(access_count), 0),
                        MIN(created_at), MAX(created_at)
                 FROM assessments",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        Ok(CacheStats {
            total_entries: count(total),
            total_accesses: count(accesses),
            oldest_entry: oldest.as_deref().map(parse_timestamp).transpose()?,
            newest_entry: newest.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

#[cfg(test)]
impl ResultStore {
    /// Remove a tabela para simular falhas de armazenamento.
    pub(crate) fn break_storage(&self) {
        if let Ok(conn) = self.conn.lock() {
            let _ = conn.execute_batch("DROP TABLE assessments");
        }
    }
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<CacheSummary> {
    Ok(CacheSummary {
        cache_key: row.get(0)?,
        product_name: row.get(1)?,
        company_name: row.get(2)?,
        sha1: row.get(3)?,
        url: row.get(4)?,
        cached_at: column_timestamp(row, 5)?,
        last_accessed: column_timestamp(row, 6)?,
        access_count: count(row.get(7)?),
    })
}

fn column_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Timestamps com largura fixa (microssegundos, sufixo `Z`), para que a
/// ordem lexicográfica no SQLite seja a ordem cronológica.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> RadarResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RadarError::other(format!("timestamp inválido '{}': {}", raw, e)))
}

fn product_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fingerprint;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn index(product: &str) -> IndexFields {
        IndexFields {
            product_name: product.to_string(),
            company_name: Some("Acme Corp".to_string()),
            ..IndexFields::default()
        }
    }

    fn seeded_store(n: usize) -> ResultStore {
        let store = ResultStore::in_memory().unwrap();
        let base = Utc::now() - chrono::Duration::hours(1);
        for i in 0..n {
            let product = format!("Product {}", i);
            store
                .put_at(
                    &fingerprint(&product, None, None, None),
                    &json!({"n": i}),
                    &index(&product),
                    base + chrono::Duration::seconds(i as i64),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_get_miss_returns_none() {
        let store = ResultStore::in_memory().unwrap();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get() {
        let store = ResultStore::in_memory().unwrap();
        let payload = json!({"product_name": "FileZilla", "trust_score": {"score": 65}});

        store.put("k1", &payload, &index("FileZilla")).unwrap();

        let cached = store.get("k1").unwrap().unwrap();
        assert_eq!(cached.payload, payload);
        assert_eq!(cached.metadata.access_count, 1);
    }

    #[test]
    fn test_access_count_is_monotonic() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({}), &index("Acme")).unwrap();

        for expected in 1..=5 {
            let cached = store.get("k1").unwrap().unwrap();
            assert_eq!(cached.metadata.access_count, expected);
        }

        assert_eq!(store.peek("k1").unwrap().unwrap().access_count, 5);
    }

    #[test]
    fn test_repeated_put_does_not_count_as_access() {
        let store = ResultStore::in_memory().unwrap();
        let payload = json!({"v": 1});

        store.put("k1", &payload, &index("Acme")).unwrap();
        store.put("k1", &payload, &index("Acme")).unwrap();

        let cached = store.get("k1").unwrap().unwrap();
        assert_eq!(cached.payload, payload);
        assert_eq!(cached.metadata.access_count, 1);
    }

    #[test]
    fn test_put_replaces_row_and_resets_counter() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({"v": 1}), &index("Acme")).unwrap();
        store.get("k1").unwrap();
        store.get("k1").unwrap();

        store.put("k1", &json!({"v": 2}), &index("Acme")).unwrap();

        let cached = store.get("k1").unwrap().unwrap();
        assert_eq!(cached.payload, json!({"v": 2}));
        assert_eq!(cached.metadata.access_count, 1);
    }

    #[test]
    fn test_peek_does_not_touch_counter() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({}), &index("Acme")).unwrap();

        let summary = store.peek("k1").unwrap().unwrap();
        assert_eq!(summary.access_count, 0);
        assert_eq!(summary.company_name.as_deref(), Some("Acme Corp"));
        assert!(store.peek("other").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_gets_never_share_a_count() {
        let dir = tempdir().unwrap();
        let store = Arc::new(ResultStore::open(&dir.path().join("cache.db")).unwrap());
        store.put("hot", &json!({}), &index("Acme")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.get("hot").unwrap().unwrap().metadata.access_count)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=200).collect::<Vec<u64>>());
    }

    #[test]
    fn test_list_newest_first() {
        let store = seeded_store(3);

        let list = store.list(10, 0).unwrap();
        let names: Vec<&str> = list.iter().map(|s| s.product_name.as_str()).collect();

        assert_eq!(names, vec!["Product 2", "Product 1", "Product 0"]);
    }

    #[test]
    fn test_pagination_pages_are_disjoint() {
        let store = seeded_store(5);

        let page1: HashSet<String> = store
            .list(2, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.cache_key)
            .collect();
        let page2: HashSet<String> = store
            .list(2, 2)
            .unwrap()
            .into_iter()
            .map(|s| s.cache_key)
            .collect();
        let all: HashSet<String> = store
            .list(10, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.cache_key)
            .collect();

        assert!(page1.is_disjoint(&page2));
        assert_eq!(page1.union(&page2).count(), 4);
        assert!(page1.is_subset(&all) && page2.is_subset(&all));
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_list_is_restartable() {
        let store = seeded_store(4);
        assert_eq!(store.list(3, 1).unwrap(), store.list(3, 1).unwrap());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({}), &index("FileZilla Client")).unwrap();
        store.put("k2", &json!({}), &index("WinSCP")).unwrap();
        store.put("k3", &json!({}), &index("filezilla server")).unwrap();

        let found = store.search_by_product("ZILLA").unwrap();
        let keys: HashSet<&str> = found.iter().map(|s| s.cache_key.as_str()).collect();

        assert_eq!(keys, HashSet::from(["k1", "k3"]));
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({}), &index("100% Secure")).unwrap();
        store.put("k2", &json!({}), &index("Secure_Box")).unwrap();

        assert_eq!(store.search_by_product("%").unwrap().len(), 1);
        assert_eq!(store.search_by_product("_").unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let store = ResultStore::in_memory().unwrap();
        store.put("k1", &json!({}), &index("Acme")).unwrap();

        assert!(store.delete("k1").unwrap());
        assert!(!store.delete("k1").unwrap());
        assert!(store.get("k1").unwrap().is_none());
    }

    #[test]
    fn test_purge_zero_window_removes_everything() {
        let store = seeded_store(4);

        assert_eq!(store.purge_older_than(chrono::Duration::zero()).unwrap(), 4);
        assert_eq!(store.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn test_purge_keeps_recent_entries() {
        let store = ResultStore::in_memory().unwrap();
        let old = Utc::now() - chrono::Duration::days(45);
        store.put_at("old", &json!({}), &index("Old"), old).unwrap();
        store.put("new", &json!({}), &index("New")).unwrap();

        let removed = store.purge_older_than(chrono::Duration::days(30)).unwrap();

        assert_eq!(removed, 1);
        assert!(store.peek("old").unwrap().is_none());
        assert!(store.peek("new").unwrap().is_some());
    }

    #[test]
    fn test_purge_with_huge_window_keeps_everything() {
        let store = seeded_store(3);

        let removed = store
            .purge_older_than(chrono::Duration::days(i64::from(u32::MAX)))
            .unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.stats().unwrap().total_entries, 3);
    }

    #[test]
    fn test_purge_on_empty_store() {
        let store = ResultStore::in_memory().unwrap();
        assert_eq!(store.purge_older_than(chrono::Duration::days(30)).unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let store = ResultStore::in_memory().unwrap();
        let empty = store.stats().unwrap();
        assert_eq!(empty, CacheStats::default());

        let first = Utc::now() - chrono::Duration::days(2);
        store.put_at("a", &json!({}), &index("A"), first).unwrap();
        store.put("b", &json!({}), &index("B")).unwrap();
        store.get("a").unwrap();
        store.get("a").unwrap();
        store.get("b").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_accesses, 3);
        assert_eq!(timestamp(stats.oldest_entry.unwrap()), timestamp(first));
        assert!(stats.newest_entry.unwrap() > first);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let store = ResultStore::open(&path).unwrap();
            store.put("k1", &json!({"v": 1}), &index("Acme")).unwrap();
        }

        let store = ResultStore::open(&path).unwrap();
        assert_eq!(store.get("k1").unwrap().unwrap().payload, json!({"v": 1}));
    }
}
