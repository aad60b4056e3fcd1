use std::path::PathBuf;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use crate::parser;
use crate::script::{Scene, VideoScript};

pub const DB_PATH: &str = "data/prospectclip.sqlite";

/// SQLite-backed store for prospects and their generated video scripts.
/// Holds only the database path; every operation opens its own connection,
/// runs its statements, and drops the connection.
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let store = Store { path };
        init_schema(&store.conn()?)?;
        Ok(store)
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }

    // ── Writes ──

    /// Store person + company data parsed from the summary.
    /// Upserts on email: re-running for the same email updates all fields
    /// but leaves created_at alone. Returns the prospect row id.
    pub fn save_prospect(
        &self,
        email: &str,
        raw_research: &serde_json::Value,
        summary: &str,
        pitch: &str,
    ) -> Result<i64> {
        let fields = parser::parse_summary(summary);
        let domain = email.split_once('@').map(|(_, d)| d).unwrap_or("");

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO prospects
                (email, name, title, seniority,
                 company_name, company_domain, industry, company_what,
                 company_size, company_funding, company_hq, recent_news,
                 pain_points, talking_points,
                 summary, pitch, raw_research, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17, datetime('now'))
             ON CONFLICT(email) DO UPDATE SET
                name            = excluded.name,
                title           = excluded.title,
                seniority       = excluded.seniority,
                company_name    = excluded.company_name,
                company_domain  = excluded.company_domain,
                industry        = excluded.industry,
                company_what    = excluded.company_what,
                company_size    = excluded.company_size,
                company_funding = excluded.company_funding,
                company_hq      = excluded.company_hq,
                recent_news     = excluded.recent_news,
                pain_points     = excluded.pain_points,
                talking_points  = excluded.talking_points,
                summary         = excluded.summary,
                pitch           = excluded.pitch,
                raw_research    = excluded.raw_research,
                updated_at      = datetime('now')",
            params![
                email,
                fields.name,
                fields.title,
                fields.seniority,
                fields.company_name,
                domain,
                fields.industry,
                fields.company_what,
                fields.company_size,
                fields.company_funding,
                fields.company_hq,
                fields.recent_news,
                serde_json::to_string(&fields.pain_points)?,
                serde_json::to_string(&fields.talking_points)?,
                summary,
                pitch,
                raw_research.to_string(),
            ],
        )?;

        // last_insert_rowid is 0 when the conflict branch ran (fresh
        // connection, nothing inserted), so fall back to a lookup
        let id = conn.last_insert_rowid();
        if id != 0 {
            return Ok(id);
        }
        let id = conn.query_row(
            "SELECT id FROM prospects WHERE email = ?1",
            [email],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Store a generated video script. Each run appends a new row; history
    /// is preserved. Fails if prospect_id does not reference a stored row.
    pub fn save_script(
        &self,
        prospect_id: i64,
        email: &str,
        sender: &str,
        product: &str,
        script: &VideoScript,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO scripts (prospect_id, email, sender, product, scenes, full_narration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                prospect_id,
                email,
                sender,
                product,
                serde_json::to_string(&script.scenes)?,
                script.full_narration,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ── Reads ──

    /// Fetch a stored prospect by email.
    pub fn get_prospect(&self, email: &str) -> Result<Option<Prospect>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, email, name, title, seniority,
                        company_name, company_domain, industry, company_what,
                        company_size, company_funding, company_hq, recent_news,
                        pain_points, talking_points,
                        summary, pitch, raw_research, created_at, updated_at
                 FROM prospects WHERE email = ?1",
                [email],
                |row| {
                    Ok(Prospect {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        title: row.get(3)?,
                        seniority: row.get(4)?,
                        company_name: row.get(5)?,
                        company_domain: row.get(6)?,
                        industry: row.get(7)?,
                        company_what: row.get(8)?,
                        company_size: row.get(9)?,
                        company_funding: row.get(10)?,
                        company_hq: row.get(11)?,
                        recent_news: row.get(12)?,
                        pain_points: JsonList::parse(row.get::<_, Option<String>>(13)?),
                        talking_points: JsonList::parse(row.get::<_, Option<String>>(14)?),
                        summary: row.get(15)?,
                        pitch: row.get(16)?,
                        raw_research: row.get(17)?,
                        created_at: row.get(18)?,
                        updated_at: row.get(19)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Summary rows for all stored prospects, in creation order.
    pub fn list_prospects(&self) -> Result<Vec<ProspectSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, name, title, company_name, created_at
             FROM prospects ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProspectSummary {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    name: row.get(2)?,
                    title: row.get(3)?,
                    company_name: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All video scripts stored for an email, oldest first.
    pub fn scripts_for(&self, email: &str) -> Result<Vec<StoredScript>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, prospect_id, email, sender, product, scenes, full_narration, created_at
             FROM scripts WHERE email = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([email], |row| {
                Ok(StoredScript {
                    id: row.get(0)?,
                    prospect_id: row.get(1)?,
                    email: row.get(2)?,
                    sender: row.get(3)?,
                    product: row.get(4)?,
                    scenes: JsonList::parse(row.get::<_, Option<String>>(5)?),
                    full_narration: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prospects (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            email           TEXT    UNIQUE NOT NULL,
            -- Person info
            name            TEXT,
            title           TEXT,
            seniority       TEXT,
            -- Company info
            company_name    TEXT,
            company_domain  TEXT,
            industry        TEXT,
            company_what    TEXT,
            company_size    TEXT,
            company_funding TEXT,
            company_hq      TEXT,
            recent_news     TEXT,
            -- Insights
            pain_points     TEXT,       -- JSON array of strings
            talking_points  TEXT,       -- JSON array of strings
            -- Full text fields
            summary         TEXT,
            pitch           TEXT,
            raw_research    TEXT,
            created_at      TEXT        DEFAULT (datetime('now')),
            updated_at      TEXT        DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS scripts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            prospect_id     INTEGER NOT NULL REFERENCES prospects(id),
            email           TEXT    NOT NULL,
            sender          TEXT,
            product         TEXT,
            scenes          TEXT    NOT NULL,   -- JSON array of scene objects
            full_narration  TEXT    NOT NULL,
            created_at      TEXT    DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_scripts_email ON scripts(email);
        ",
    )?;
    Ok(())
}

// ── Row types ──

/// A JSON-text column deserialized on read. Values that fail to parse are
/// surfaced as the raw stored string instead of an error.
#[derive(Debug, Clone)]
pub enum JsonList<T> {
    Items(Vec<T>),
    Raw(String),
}

impl<T: DeserializeOwned> JsonList<T> {
    fn parse(stored: Option<String>) -> Self {
        let raw = stored.unwrap_or_default();
        match serde_json::from_str(&raw) {
            Ok(items) => JsonList::Items(items),
            Err(_) => JsonList::Raw(raw),
        }
    }
}

impl<T> JsonList<T> {
    pub fn items(&self) -> &[T] {
        match self {
            JsonList::Items(v) => v,
            JsonList::Raw(_) => &[],
        }
    }
}

#[derive(Debug)]
pub struct Prospect {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub seniority: Option<String>,
    pub company_name: Option<String>,
    pub company_domain: Option<String>,
    pub industry: Option<String>,
    pub company_what: Option<String>,
    pub company_size: Option<String>,
    pub company_funding: Option<String>,
    pub company_hq: Option<String>,
    pub recent_news: Option<String>,
    pub pain_points: JsonList<String>,
    pub talking_points: JsonList<String>,
    pub summary: Option<String>,
    pub pitch: Option<String>,
    pub raw_research: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct ProspectSummary {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug)]
pub struct StoredScript {
    pub id: i64,
    pub prospect_id: i64,
    pub email: String,
    pub sender: Option<String>,
    pub product: Option<String>,
    pub scenes: JsonList<Scene>,
    pub full_narration: String,
    pub created_at: String,
}

// ── Tests ──
