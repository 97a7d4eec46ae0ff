use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use metatag_core::model::DefaultsRecord;
use metatag_core::store::{DefaultsStore, StoreError, validate_record};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::error::SqliteStoreError;

pub struct SqliteDefaultsStore {
    conn: Connection,
}

const SCHEMA_VERSION: i64 = 1;

impl SqliteDefaultsStore {
    pub fn open(path: &Path) -> Result<Self, SqliteStoreError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, SqliteStoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta(\
                key TEXT PRIMARY KEY,\
                value INTEGER NOT NULL\
            );",
        )?;
        let version: Option<i64> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(version) = version {
            if version != SCHEMA_VERSION {
                warn!(
                    found = version,
                    expected = SCHEMA_VERSION,
                    "defaults store schema version mismatch, recreating tables"
                );
                conn.execute_batch(
                    "DROP TABLE IF EXISTS tags;\
                    DROP TABLE IF EXISTS defaults;\
                    DROP TABLE IF EXISTS meta;",
                )?;
            }
        }
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load(&self, id: &str) -> Result<Option<DefaultsRecord>, SqliteStoreError> {
        let row: Option<(String, bool)> = self
            .conn
            .query_row(
                "SELECT label, enabled FROM defaults WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((label, enabled)) = row else {
            return Ok(None);
        };
        Ok(Some(DefaultsRecord {
            id: id.to_string(),
            label,
            enabled,
            tags: self.load_tags(id)?,
        }))
    }

    fn load_tags(&self, id: &str) -> Result<BTreeMap<String, String>, SqliteStoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM tags WHERE record_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut tags = BTreeMap::new();
        for row in rows {
            let (name, value): (String, String) = row?;
            tags.insert(name, value);
        }
        Ok(tags)
    }

    fn load_all(&self) -> Result<Vec<DefaultsRecord>, SqliteStoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label, enabled FROM defaults ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, label, enabled) = row?;
            let tags = self.load_tags(&id)?;
            records.push(DefaultsRecord {
                id,
                label,
                enabled,
                tags,
            });
        }
        Ok(records)
    }

    fn upsert(&mut self, record: &DefaultsRecord) -> Result<(), SqliteStoreError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO defaults (id, label, enabled, updated_utc)\n\
                VALUES (?1, ?2, ?3, ?4)\n\
                ON CONFLICT(id) DO UPDATE SET\n\
                    label = excluded.label,\n\
                    enabled = excluded.enabled,\n\
                    updated_utc = excluded.updated_utc",
            params![record.id, record.label, record.enabled, now],
        )?;
        tx.execute("DELETE FROM tags WHERE record_id = ?1", params![record.id])?;
        if !record.tags.is_empty() {
            let mut stmt =
                tx.prepare("INSERT INTO tags (record_id, name, value) VALUES (?1, ?2, ?3)")?;
            for (name, value) in &record.tags {
                stmt.execute(params![record.id, name, value])?;
            }
        }
        tx.commit()?;
        debug!(id = %record.id, tags = record.tags.len(), "saved defaults record");
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, SqliteStoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM defaults WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

fn create_schema(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta(\
            key TEXT PRIMARY KEY,\
            value INTEGER NOT NULL\
        );\
        CREATE TABLE IF NOT EXISTS defaults(\
            id TEXT PRIMARY KEY,\
            label TEXT NOT NULL,\
            enabled INTEGER NOT NULL,\
            updated_utc INTEGER NULL\
        );\
        CREATE TABLE IF NOT EXISTS tags(\
            record_id TEXT NOT NULL,\
            name TEXT NOT NULL,\
            value TEXT NOT NULL,\
            PRIMARY KEY(record_id, name),\
            FOREIGN KEY(record_id) REFERENCES defaults(id) ON DELETE CASCADE\
        );",
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

impl DefaultsStore for SqliteDefaultsStore {
    fn get(&self, id: &str) -> Result<Option<DefaultsRecord>, StoreError> {
        Ok(self.load(id)?)
    }

    fn list(&self) -> Result<Vec<DefaultsRecord>, StoreError> {
        Ok(self.load_all()?)
    }

    fn save(&mut self, record: DefaultsRecord) -> Result<(), StoreError> {
        validate_record(&record)?;
        Ok(self.upsert(&record)?)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.remove(id)?)
    }
}
