use std::fmt;

use crate::constants::INVALID_FILE_MESSAGE;

// columns an upload may be rejected for, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredColumn {
    Consequence,
    Chromosome,
    Position,
    Ref,
    Alt,
    Gene,
}

impl fmt::Display for RequiredColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredColumn::Consequence => "consequence",
            RequiredColumn::Chromosome => "CHROM",
            RequiredColumn::Position => "POS",
            RequiredColumn::Ref => "REF",
            RequiredColumn::Alt => "ALT",
            RequiredColumn::Gene => "gene",
        };
        write!(f, "{}", name)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Data should include {0} column.")]
    MissingColumn(RequiredColumn),

    #[error("File format not supported")]
    UnsupportedFormat(String),
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MutableError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} '{id}' not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    #[error("no variants left after reading the upload")]
    NoVariants,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl MutableError {
    pub fn not_found(entity: &'static str, id: &str) -> MutableError {
        MutableError::NotFound {
            entity,
            id: id.to_owned(),
        }
    }

    // validation and lookup failures get their own message, everything
    // else is reported as an invalid file
    pub fn user_message(&self) -> String {
        match self {
            MutableError::Validation(err) => err.to_string(),
            MutableError::NotFound { .. } => self.to_string(),
            _ => INVALID_FILE_MESSAGE.to_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MutableError>;
