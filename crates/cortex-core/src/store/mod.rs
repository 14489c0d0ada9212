//! Store coordinator (§4.I)
//!
//! A single embedded SQLite database behind one process-wide mutex. The
//! straightforward implementation specified in the design notes: the mutex
//! is held across each public call rather than splitting reader/writer
//! connections, since the core's write volume doesn't justify the added
//! complexity.

mod migrations;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::{Edge, EdgeSource, Embedding, Fact, FactType, Memory, MemoryClass, Metadata, RawMemory};

type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of inserting a candidate memory (§4.B, §4.I).
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// A brand-new memory was stored.
    New(Memory),
    /// `content_hash` already existed and the supplied metadata was empty
    /// or identical; nothing changed.
    Unchanged(Memory),
    /// `content_hash` already existed and non-empty metadata replaced the
    /// stored row's metadata.
    Updated(Memory),
}

impl InsertOutcome {
    pub fn memory(&self) -> &Memory {
        match self {
            InsertOutcome::New(m) | InsertOutcome::Unchanged(m) | InsertOutcome::Updated(m) => m,
        }
    }
}

/// Filters accepted by [`Store::list_facts`] (§4.E).
#[derive(Debug, Clone, Default)]
pub struct FactFilter {
    pub subject_contains: Option<String>,
    pub fact_type: Option<FactType>,
    pub active_only: bool,
    pub limit: u32,
}

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if absent) the database at `path`, or the
    /// platform-default data directory when `path` is `None`.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => {
                let dirs = ProjectDirs::from("dev", "cortex", "cortex")
                    .ok_or_else(|| StoreError::Init("could not determine data directory".into()))?;
                let data_dir = dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("cortex.db")
            }
        };
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (tests, short-lived tooling).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::configure_connection(&conn)?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL);",
        )?;
        let current: u32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);
        for migration in migrations::MIGRATIONS {
            if migration.version > current {
                conn.execute_batch(migration.up)?;
            }
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    // ---------------------------------------------------------------- memories

    /// Insert a candidate memory, resolving hash collisions per §4.B/§4.I.
    pub fn insert_memory(&self, raw: &RawMemory) -> Result<InsertOutcome> {
        let conn = self.lock()?;
        let hash = raw.content_hash();
        let now = Utc::now();

        if let Some(existing) = Self::find_by_hash(&conn, &hash)? {
            if raw.metadata.is_empty() {
                return Ok(InsertOutcome::Unchanged(existing));
            }
            conn.execute(
                "UPDATE memories SET metadata = ?1, updated_at = ?2 WHERE id = ?3",
                params![raw.metadata.to_json(), now.to_rfc3339(), existing.id],
            )?;
            let updated = Self::find_by_id(&conn, existing.id)?
                .expect("row updated above must still exist");
            return Ok(InsertOutcome::Updated(updated));
        }

        let inserted = conn.execute(
            "INSERT INTO memories
                (content, source_file, source_line, source_section, content_hash,
                 project, memory_class, metadata, imported_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                raw.content,
                raw.source_file,
                raw.source_line,
                raw.source_section,
                hash,
                raw.project,
                raw.memory_class.map(|c| c.as_str()),
                raw.metadata.to_json(),
                now.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                let memory = Self::find_by_id(&conn, id)?.expect("row just inserted");
                Ok(InsertOutcome::New(memory))
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                // Lost a race against a concurrent identical insert; converge
                // on the now-existing row (§8 scenario 5).
                tracing::debug!(hash = %hash, "lost race on duplicate insert, converging to existing row");
                match Self::find_by_hash(&conn, &hash)? {
                    Some(existing) => Ok(InsertOutcome::Unchanged(existing)),
                    None => Err(StoreError::DuplicateHash),
                }
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    fn find_by_hash(conn: &Connection, hash: &str) -> Result<Option<Memory>> {
        conn.query_row(
            "SELECT id, content, source_file, source_line, source_section, content_hash,
                    project, memory_class, metadata, imported_at, updated_at
             FROM memories WHERE content_hash = ?1",
            params![hash],
            row_to_memory,
        )
        .optional()
        .map_err(StoreError::Database)
    }

    fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Memory>> {
        conn.query_row(
            "SELECT id, content, source_file, source_line, source_section, content_hash,
                    project, memory_class, metadata, imported_at, updated_at
             FROM memories WHERE id = ?1",
            params![id],
            row_to_memory,
        )
        .optional()
        .map_err(StoreError::Database)
    }

    pub fn get_memory(&self, id: i64) -> Result<Option<Memory>> {
        let conn = self.lock()?;
        Self::find_by_id(&conn, id)
    }

    /// Look up a memory by its content hash without inserting anything —
    /// lets callers decide whether to run hygiene filters before the
    /// authoritative insert (§4.C ordering).
    pub fn get_memory_by_hash(&self, hash: &str) -> Result<Option<Memory>> {
        let conn = self.lock()?;
        Self::find_by_hash(&conn, hash)
    }

    /// The most recent `limit` memories by `imported_at` desc — used by
    /// near-duplicate suppression's in-window candidate set (§4.B).
    pub fn recent_memories(&self, limit: u32) -> Result<Vec<Memory>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, source_file, source_line, source_section, content_hash,
                    project, memory_class, metadata, imported_at, updated_at
             FROM memories ORDER BY imported_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], row_to_memory)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_memories(&self) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))
            .map_err(StoreError::Database)
    }

    /// Memory ids that have no embedding row yet (§4.D), oldest first,
    /// bounded by `limit`.
    pub fn memory_ids_without_embedding(&self, limit: u32) -> Result<Vec<i64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT m.id FROM memories m
             LEFT JOIN embeddings e ON e.memory_id = m.id
             WHERE e.memory_id IS NULL
             ORDER BY m.id ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |r| r.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // -------------------------------------------------------------- embeddings

    pub fn insert_embedding(&self, memory_id: i64, vector: &[f32]) -> Result<()> {
        let conn = self.lock()?;
        let embedding = Embedding::new(memory_id, vector.to_vec());
        conn.execute(
            "INSERT INTO embeddings (memory_id, vector, dimensions, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(memory_id) DO UPDATE SET vector = excluded.vector, dimensions = excluded.dimensions",
            params![
                memory_id,
                embedding.to_bytes(),
                vector.len() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The dimension already committed to this store instance, if any row
    /// exists (§3 invariant: fixed dimension per store instance).
    pub fn embedding_dimensions(&self) -> Result<Option<usize>> {
        let conn = self.lock()?;
        conn.query_row("SELECT dimensions FROM embeddings LIMIT 1", [], |r| {
            r.get::<_, i64>(0)
        })
        .optional()
        .map(|o| o.map(|d| d as usize))
        .map_err(StoreError::Database)
    }

    /// All stored embeddings, for brute-force semantic search (§4.G).
    pub fn all_embeddings(&self) -> Result<Vec<Embedding>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT memory_id, vector FROM embeddings")?;
        let rows = stmt
            .query_map([], |r| {
                let memory_id: i64 = r.get(0)?;
                let bytes: Vec<u8> = r.get(1)?;
                Ok((memory_id, bytes))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, bytes)| {
                Embedding::vector_from_bytes(&bytes).map(|v| Embedding::new(id, v))
            })
            .collect())
    }

    // -------------------------------------------------------------------- bm25

    /// Top-`limit` memories by BM25 rank over `query`, optionally scoped to
    /// `project` (§4.G). BM25's raw score is negative-is-better in FTS5; we
    /// negate it so higher is better everywhere else in the engine.
    pub fn search_bm25(&self, query: &str, limit: u32, project: Option<&str>) -> Result<Vec<(Memory, f64)>> {
        let conn = self.lock()?;
        let sql = if project.is_some() {
            "SELECT m.id, m.content, m.source_file, m.source_line, m.source_section, m.content_hash,
                    m.project, m.memory_class, m.metadata, m.imported_at, m.updated_at,
                    bm25(memories_fts) AS rank
             FROM memories_fts
             JOIN memories m ON m.id = memories_fts.rowid
             WHERE memories_fts MATCH ?1 AND m.project = ?2
             ORDER BY rank LIMIT ?3"
        } else {
            "SELECT m.id, m.content, m.source_file, m.source_line, m.source_section, m.content_hash,
                    m.project, m.memory_class, m.metadata, m.imported_at, m.updated_at,
                    bm25(memories_fts) AS rank
             FROM memories_fts
             JOIN memories m ON m.id = memories_fts.rowid
             WHERE memories_fts MATCH ?1
             ORDER BY rank LIMIT ?2"
        };
        let mut stmt = conn.prepare(sql)?;
        let map_row = |r: &rusqlite::Row| -> rusqlite::Result<(Memory, f64)> {
            let memory = row_to_memory(r)?;
            let rank: f64 = r.get(11)?;
            Ok((memory, -rank))
        };
        let rows = if let Some(project) = project {
            stmt.query_map(params![query, project, limit], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![query, limit], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    // ------------------------------------------------------------------ facts

    pub fn insert_fact(&self, fact: &Fact) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO facts
                (memory_id, subject, predicate, object, fact_type, confidence, decay_rate,
                 last_reinforced, superseded_by, source_quote, extraction_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                fact.memory_id,
                fact.subject,
                fact.predicate,
                fact.object,
                fact.fact_type.as_str(),
                fact.confidence,
                fact.decay_rate,
                fact.last_reinforced.to_rfc3339(),
                fact.superseded_by,
                fact.source_quote,
                fact.extraction_method,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_fact(&self, id: i64) -> Result<Option<Fact>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, memory_id, subject, predicate, object, fact_type, confidence, decay_rate,
                    last_reinforced, superseded_by, source_quote, extraction_method
             FROM facts WHERE id = ?1",
            params![id],
            row_to_fact,
        )
        .optional()
        .map_err(StoreError::Database)
    }

    pub fn list_facts(&self, filter: &FactFilter) -> Result<Vec<Fact>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, memory_id, subject, predicate, object, fact_type, confidence, decay_rate,
                    last_reinforced, superseded_by, source_quote, extraction_method
             FROM facts WHERE 1=1",
        );
        if filter.active_only {
            sql.push_str(" AND superseded_by IS NULL");
        }
        if let Some(ft) = filter.fact_type {
            sql.push_str(&format!(" AND fact_type = '{}'", ft.as_str()));
        }
        if let Some(subject) = &filter.subject_contains {
            sql.push_str(&format!(
                " AND subject LIKE '%{}%' ESCAPE '\\'",
                escape_like(subject)
            ));
        }
        sql.push_str(" ORDER BY confidence DESC, id ASC");
        if filter.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", filter.limit));
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_fact)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Facts whose subject matches (case-insensitive, exact) `subject`,
    /// active-only, optionally filtered by `source_file` prefix via the
    /// originating memory, ordered by confidence desc then id asc,
    /// limited to `limit` (§4.F subject-seeded traversal).
    pub fn facts_by_subject(&self, subject: &str, source_file_prefix: Option<&str>, limit: u32) -> Result<Vec<Fact>> {
        let conn = self.lock()?;
        let sql = if source_file_prefix.is_some() {
            "SELECT f.id, f.memory_id, f.subject, f.predicate, f.object, f.fact_type, f.confidence,
                    f.decay_rate, f.last_reinforced, f.superseded_by, f.source_quote, f.extraction_method
             FROM facts f
             LEFT JOIN memories m ON m.id = f.memory_id
             WHERE LOWER(f.subject) = LOWER(?1) AND f.superseded_by IS NULL
                   AND m.source_file LIKE ?2 || '%'
             ORDER BY f.confidence DESC, f.id ASC LIMIT ?3"
        } else {
            "SELECT id, memory_id, subject, predicate, object, fact_type, confidence,
                    decay_rate, last_reinforced, superseded_by, source_quote, extraction_method
             FROM facts
             WHERE LOWER(subject) = LOWER(?1) AND superseded_by IS NULL
             ORDER BY confidence DESC, id ASC LIMIT ?2"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = if let Some(prefix) = source_file_prefix {
            stmt.query_map(params![subject, prefix, limit], row_to_fact)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![subject, limit], row_to_fact)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    pub fn reinforce_fact(&self, id: i64) -> Result<Fact> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE facts SET last_reinforced = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("fact {id}")));
        }
        Self::find_fact(&conn, id)?.ok_or_else(|| StoreError::NotFound(format!("fact {id}")))
    }

    fn find_fact(conn: &Connection, id: i64) -> Result<Option<Fact>> {
        conn.query_row(
            "SELECT id, memory_id, subject, predicate, object, fact_type, confidence, decay_rate,
                    last_reinforced, superseded_by, source_quote, extraction_method
             FROM facts WHERE id = ?1",
            params![id],
            row_to_fact,
        )
        .optional()
        .map_err(StoreError::Database)
    }

    /// Point `old_id.superseded_by` at `new_id`, rejecting cycles (§4.E,
    /// §8 invariant 6).
    pub fn supersede_fact(&self, old_id: i64, new_id: i64) -> Result<()> {
        let conn = self.lock()?;
        if old_id == new_id {
            return Err(StoreError::Init("a fact cannot supersede itself".into()));
        }
        // Walk new_id's existing supersession chain; if it reaches old_id,
        // setting old_id -> new_id would close a cycle.
        let mut cursor = Some(new_id);
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = cursor {
            if !seen.insert(current) {
                break; // defensive: an existing cycle shouldn't happen, but don't loop forever
            }
            if current == old_id {
                tracing::warn!(old_id, new_id, "rejected supersession that would create a cycle");
                return Err(StoreError::Init("supersession would create a cycle".into()));
            }
            cursor = conn
                .query_row(
                    "SELECT superseded_by FROM facts WHERE id = ?1",
                    params![current],
                    |r| r.get::<_, Option<i64>>(0),
                )
                .optional()?
                .flatten();
        }
        conn.execute(
            "UPDATE facts SET superseded_by = ?1 WHERE id = ?2",
            params![new_id, old_id],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------ edges

    /// Idempotent on `(source, target, type)` (§4.F).
    pub fn add_edge(&self, edge: &Edge) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO edges (source_fact_id, target_fact_id, edge_type, confidence, source)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(source_fact_id, target_fact_id, edge_type)
             DO UPDATE SET confidence = excluded.confidence, source = excluded.source",
            params![
                edge.source_fact_id,
                edge.target_fact_id,
                edge.edge_type,
                edge.confidence,
                edge.source.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Outgoing and incoming edges touching `fact_id`.
    pub fn edges_for_fact(&self, fact_id: i64) -> Result<Vec<Edge>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT source_fact_id, target_fact_id, edge_type, confidence, source
             FROM edges WHERE source_fact_id = ?1 OR target_fact_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![fact_id], row_to_edge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --------------------------------------------------------------- clusters

    pub fn clusters_table_has_rows(&self) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM clusters", [], |r| r.get(0))
            .unwrap_or(0);
        Ok(count > 0)
    }

    pub fn list_clusters(&self, limit: u32) -> Result<Vec<crate::model::Cluster>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, aliases, cohesion, fact_count, avg_confidence
             FROM clusters ORDER BY fact_count DESC, cohesion DESC, name ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |r| {
                let aliases_json: String = r.get(2)?;
                let aliases: Vec<String> = serde_json::from_str(&aliases_json).unwrap_or_default();
                Ok(crate::model::Cluster {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    aliases,
                    cohesion: r.get(3)?,
                    fact_count: r.get(4)?,
                    avg_confidence: r.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Up to 5 top subjects by fact count within `cluster_id` (§4.H).
    pub fn top_subjects_for_cluster(&self, cluster_id: i64, limit: u32) -> Result<Vec<crate::model::ClusterSubject>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT LOWER(f.subject) AS subj, COUNT(*) AS c
             FROM fact_cluster_associations a
             JOIN facts f ON f.id = a.fact_id
             WHERE a.cluster_id = ?1
             GROUP BY LOWER(f.subject)
             ORDER BY c DESC, subj ASC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![cluster_id, limit], |r| {
                Ok(crate::model::ClusterSubject {
                    subject: r.get(0)?,
                    fact_count: r.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn row_to_memory(row: &rusqlite::Row) -> rusqlite::Result<Memory> {
    let metadata_json: String = row.get(8)?;
    let memory_class: Option<String> = row.get(7)?;
    let imported_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(Memory {
        id: row.get(0)?,
        content: row.get(1)?,
        source_file: row.get(2)?,
        source_line: row.get(3)?,
        source_section: row.get(4)?,
        content_hash: row.get(5)?,
        project: row.get(6)?,
        memory_class: memory_class.and_then(|s| MemoryClass::parse(&s)),
        metadata: Metadata::from_json(&metadata_json),
        imported_at: parse_timestamp(&imported_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn row_to_fact(row: &rusqlite::Row) -> rusqlite::Result<Fact> {
    let fact_type: String = row.get(5)?;
    let last_reinforced: String = row.get(8)?;
    Ok(Fact {
        id: row.get(0)?,
        memory_id: row.get(1)?,
        subject: row.get(2)?,
        predicate: row.get(3)?,
        object: row.get(4)?,
        fact_type: FactType::parse_or_kv(&fact_type),
        confidence: row.get(6)?,
        decay_rate: row.get(7)?,
        last_reinforced: parse_timestamp(&last_reinforced),
        superseded_by: row.get(9)?,
        source_quote: row.get(10)?,
        extraction_method: row.get(11)?,
    })
}

fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<Edge> {
    let source: String = row.get(4)?;
    Ok(Edge {
        source_fact_id: row.get(0)?,
        target_fact_id: row.get(1)?,
        edge_type: row.get(2)?,
        confidence: row.get(3)?,
        source: EdgeSource::parse(&source),
    })
}

fn parse_timestamp(s: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;

    fn raw(content: &str, source: &str) -> RawMemory {
        RawMemory {
            content: content.to_string(),
            source_file: source.to_string(),
            source_line: 1,
            source_section: String::new(),
            project: None,
            memory_class: None,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn insert_then_reinsert_is_unchanged() {
        let store = Store::open_in_memory().unwrap();
        let r = raw("hello world", "a.md");
        let first = store.insert_memory(&r).unwrap();
        assert!(matches!(first, InsertOutcome::New(_)));
        let second = store.insert_memory(&r).unwrap();
        assert!(matches!(second, InsertOutcome::Unchanged(_)));
        assert_eq!(store.count_memories().unwrap(), 1);
    }

    #[test]
    fn metadata_update_on_hash_collision() {
        let store = Store::open_in_memory().unwrap();
        let mut r = raw("hello world", "a.md");
        store.insert_memory(&r).unwrap();
        r.metadata.insert("title", "X");
        let outcome = store.insert_memory(&r).unwrap();
        assert!(matches!(outcome, InsertOutcome::Updated(_)));
        assert_eq!(outcome.memory().metadata.get("title"), Some("X"));
    }

    #[test]
    fn bm25_search_finds_inserted_content() {
        let store = Store::open_in_memory().unwrap();
        store.insert_memory(&raw("the quick brown fox", "a.md")).unwrap();
        store.insert_memory(&raw("an unrelated sentence", "b.md")).unwrap();
        let results = store.search_bm25("fox", 10, None).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].0.content.contains("fox"));
    }

    fn sample_fact(memory_id: i64) -> Fact {
        Fact {
            id: 0,
            memory_id,
            subject: "q".into(),
            predicate: "likes".into(),
            object: "rust".into(),
            fact_type: FactType::Preference,
            confidence: 0.9,
            decay_rate: 0.0,
            last_reinforced: Utc::now(),
            superseded_by: None,
            source_quote: None,
            extraction_method: None,
        }
    }

    #[test]
    fn supersede_rejects_self_cycle() {
        let store = Store::open_in_memory().unwrap();
        let memory = store.insert_memory(&raw("q likes rust", "a.md")).unwrap();
        let id = store.insert_fact(&sample_fact(memory.memory().id)).unwrap();
        assert!(store.supersede_fact(id, id).is_err());
    }

    #[test]
    fn supersede_rejects_transitive_cycle() {
        let store = Store::open_in_memory().unwrap();
        let memory = store.insert_memory(&raw("q likes rust", "a.md")).unwrap();
        let mid = memory.memory().id;
        let a = store.insert_fact(&sample_fact(mid)).unwrap();
        let b = store.insert_fact(&sample_fact(mid)).unwrap();
        store.supersede_fact(a, b).unwrap();
        assert!(store.supersede_fact(b, a).is_err());
    }
}
