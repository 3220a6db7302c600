use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::db::{open_read_only, row_to_json_map};

// one row per sequenced individual of the cohort
pub struct SampleDb {
    conn: Connection,
}

impl SampleDb {
    pub fn new(conn: Connection) -> SampleDb {
        SampleDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<SampleDb> {
        Ok(SampleDb::new(open_read_only(path)?))
    }

    pub fn sample(&self, sample: &str)
        -> rusqlite::Result<Option<serde_json::Map<String, Value>>>
    {
        self.conn.query_row("SELECT * FROM samples WHERE sample = ?1", [sample],
                            row_to_json_map)
            .optional()
    }
}
