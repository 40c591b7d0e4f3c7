use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("Connection failed: {0}")]
    Connectivity(#[source] rusqlite::Error),

    #[error("Query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Table '{table}' returned no rows")]
    EmptyInput { table: String },

    #[error("Column '{column}' missing from '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("Duplicate join key '{key}' on '{table}'")]
    DuplicateJoinKey { table: String, key: String },

    #[error("Amount column has zero variance; z-score is undefined")]
    ZeroVariance,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LensResult<T> = Result<T, LensError>;
