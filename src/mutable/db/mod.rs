use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};

use crate::bio::aa_change::first_digits;
use crate::types::ResidueNumber;

pub mod annotation;
pub mod gene;
pub mod dnv;
pub mod distance;
pub mod scores;
pub mod sample;
pub mod scratch;

// the reference databases are built elsewhere and never written here
pub fn open_read_only(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY |
                                      OpenFlags::SQLITE_OPEN_NO_MUTEX)
}

pub fn placeholders(count: usize) -> String {
    itertools::join(std::iter::repeat_n("?", count), ", ")
}

// positions are stored as integers, reals or text depending on which
// pipeline made the table
pub fn value_to_residue_number(value: ValueRef<'_>) -> Option<ResidueNumber> {
    match value {
        ValueRef::Integer(i) => ResidueNumber::try_from(i).ok(),
        ValueRef::Real(f) if f.fract() == 0.0 => Some(f as ResidueNumber),
        ValueRef::Text(text) => {
            let text = std::str::from_utf8(text).ok()?;
            first_digits(text)?.parse().ok()
        },
        _ => None,
    }
}

pub fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(text) | ValueRef::Blob(text) =>
            Some(String::from_utf8_lossy(text).into_owned()),
    }
}

pub fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Value::from(f),
        ValueRef::Text(text) | ValueRef::Blob(text) =>
            serde_json::Value::from(String::from_utf8_lossy(text).into_owned()),
    }
}

// all columns of a row, keyed by column name
pub fn row_to_json_map(row: &Row<'_>) -> rusqlite::Result<serde_json::Map<String, serde_json::Value>> {
    let mut map = serde_json::Map::new();

    for (index, column_name) in row.as_ref().column_names().iter().enumerate() {
        map.insert(column_name.to_string(), value_to_json(row.get_ref(index)?));
    }

    Ok(map)
}
