//! Database migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions, applied in order against `schema_version`.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema: memories, embeddings, facts, edges, clusters",
    up: MIGRATION_V1_UP,
}];

/// A database migration.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    source_file TEXT NOT NULL,
    source_line INTEGER NOT NULL DEFAULT 0,
    source_section TEXT NOT NULL DEFAULT '',
    content_hash TEXT NOT NULL UNIQUE,
    project TEXT,
    memory_class TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    imported_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_imported_at ON memories(imported_at);
CREATE INDEX IF NOT EXISTS idx_memories_project ON memories(project);
CREATE INDEX IF NOT EXISTS idx_memories_source_file ON memories(source_file);

CREATE TABLE IF NOT EXISTS embeddings (
    memory_id INTEGER PRIMARY KEY REFERENCES memories(id) ON DELETE CASCADE,
    vector BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    content,
    content='memories',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
    INSERT INTO memories_fts(rowid, content) VALUES (NEW.id, NEW.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content) VALUES ('delete', OLD.id, OLD.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content) VALUES ('delete', OLD.id, OLD.content);
    INSERT INTO memories_fts(rowid, content) VALUES (NEW.id, NEW.content);
END;

CREATE TABLE IF NOT EXISTS facts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    memory_id INTEGER NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
    subject TEXT NOT NULL,
    predicate TEXT NOT NULL,
    object TEXT NOT NULL,
    fact_type TEXT NOT NULL DEFAULT 'kv',
    confidence REAL NOT NULL DEFAULT 0.7,
    decay_rate REAL NOT NULL DEFAULT 0.0,
    last_reinforced TEXT NOT NULL,
    superseded_by INTEGER REFERENCES facts(id),
    source_quote TEXT,
    extraction_method TEXT
);

CREATE INDEX IF NOT EXISTS idx_facts_subject ON facts(subject);
CREATE INDEX IF NOT EXISTS idx_facts_superseded_by ON facts(superseded_by);
CREATE INDEX IF NOT EXISTS idx_facts_fact_type ON facts(fact_type);

CREATE TABLE IF NOT EXISTS edges (
    source_fact_id INTEGER NOT NULL REFERENCES facts(id) ON DELETE CASCADE,
    target_fact_id INTEGER NOT NULL REFERENCES facts(id) ON DELETE CASCADE,
    edge_type TEXT NOT NULL,
    confidence REAL NOT NULL DEFAULT 1.0,
    source TEXT NOT NULL DEFAULT 'inferred',
    PRIMARY KEY (source_fact_id, target_fact_id, edge_type)
);

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_fact_id);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_fact_id);

CREATE TABLE IF NOT EXISTS clusters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    aliases TEXT NOT NULL DEFAULT '[]',
    cohesion REAL NOT NULL DEFAULT 0.0,
    fact_count INTEGER NOT NULL DEFAULT 0,
    avg_confidence REAL NOT NULL DEFAULT 0.0
);

CREATE TABLE IF NOT EXISTS fact_cluster_associations (
    fact_id INTEGER NOT NULL REFERENCES facts(id) ON DELETE CASCADE,
    cluster_id INTEGER NOT NULL REFERENCES clusters(id) ON DELETE CASCADE,
    relevance REAL NOT NULL DEFAULT 0.0,
    PRIMARY KEY (fact_id, cluster_id)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;
