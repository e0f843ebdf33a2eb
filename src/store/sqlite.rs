// src/store/sqlite.rs

//! SQLite-backed storage and tenant directory
//!
//! The CLI keeps the add-on's state in a small SQLite database: one
//! `options` row per tenant holding the serialized record, and a `tenants`
//! table describing the deployment with the standard exclusion flags
//! (archived, spam, deleted). The schema is versioned so it can evolve.

use crate::error::Result;
use crate::options::OptionsRecord;
use crate::store::OptionsStore;
use crate::tenant::{TenantDirectory, TenantId};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current = get_schema_version(conn)?;
    debug!("Current schema version: {}", current);

    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    if current < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS options (
                tenant_id INTEGER PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS tenants (
                id INTEGER PRIMARY KEY,
                domain TEXT NOT NULL DEFAULT '',
                archived INTEGER NOT NULL DEFAULT 0,
                spam INTEGER NOT NULL DEFAULT 0,
                deleted INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        set_schema_version(conn, 1)?;
        info!("Applied schema migration to version 1");
    }

    Ok(())
}

/// Initialize the database at the given path, creating parent directories
/// and seeding the primary tenant
pub fn init(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = open(path)?;
    migrate(&conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO tenants (id, domain) VALUES (?1, '')",
        [TenantId::PRIMARY.0],
    )?;

    Ok(())
}

/// Open the database with the standard pragmas
pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// SQLite implementation of the options storage contract
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store over an existing database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = open(path)?;
        migrate(&conn)?;
        Ok(Self { conn })
    }
}

impl OptionsStore for SqliteStore {
    fn load(&self, tenant: TenantId) -> Result<Option<OptionsRecord>> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM options WHERE tenant_id = ?1",
                [tenant.0],
                |row| row.get(0),
            )
            .optional()?;

        match blob {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn create(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<bool> {
        let json = serde_json::to_string(record)?;
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO options (tenant_id, record) VALUES (?1, ?2)",
            params![tenant.0, json],
        )?;
        Ok(changed == 1)
    }

    fn save(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO options (tenant_id, record) VALUES (?1, ?2)
             ON CONFLICT(tenant_id) DO UPDATE
             SET record = excluded.record, updated_at = CURRENT_TIMESTAMP",
            params![tenant.0, json],
        )?;
        Ok(())
    }

    fn delete(&mut self, tenant: TenantId) -> Result<()> {
        self.conn
            .execute("DELETE FROM options WHERE tenant_id = ?1", [tenant.0])?;
        Ok(())
    }
}

/// One row of the tenants table
#[derive(Debug, Clone)]
pub struct TenantRow {
    pub id: TenantId,
    pub domain: String,
    pub archived: bool,
    pub spam: bool,
    pub deleted: bool,
}

impl TenantRow {
    /// An active tenant with no exclusion flags set
    pub fn active(id: TenantId, domain: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
            archived: false,
            spam: false,
            deleted: false,
        }
    }
}

/// SQLite implementation of the tenant directory
///
/// The exclusion filters are applied in SQL, so archived, spam, and deleted
/// tenants never reach the lifecycle fan-out.
pub struct SqliteDirectory {
    conn: Connection,
}

impl SqliteDirectory {
    /// Open a directory over an existing database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = open(path)?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Insert or replace a tenant row
    pub fn register(&self, row: &TenantRow) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tenants (id, domain, archived, spam, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.id.0, row.domain, row.archived, row.spam, row.deleted],
        )?;
        Ok(())
    }
}

impl TenantDirectory for SqliteDirectory {
    fn active_tenants(&self) -> Result<Vec<TenantId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM tenants
             WHERE archived = 0 AND spam = 0 AND deleted = 0
             ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| row.get::<_, u64>(0))?;

        let mut tenants = Vec::new();
        for id in rows {
            tenants.push(TenantId(id?));
        }
        Ok(tenants)
    }
}
