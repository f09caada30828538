use std::{error::Error as StdError, fmt};

/// Raised when a [`crate::Table`]/[`crate::Column`]/[`crate::Constraint`] value
/// violates a structural invariant the model assumes holds (never raised for
/// anything a caller could trigger by passing an unusual-but-valid schema).
#[derive(Debug)]
#[allow(dead_code)]
pub enum ModelError {
    DuplicateConstraintKey { table: String, key: String },
    DuplicateIndexName { table: String, name: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateConstraintKey { table, key } => {
                write!(f, "table `{table}` has two constraints with key `{key}`")
            }
            Self::DuplicateIndexName { table, name } => {
                write!(f, "table `{table}` has two indexes named `{name}`")
            }
        }
    }
}

impl StdError for ModelError {}

#[derive(Debug)]
#[allow(dead_code)]
pub enum DiffError {
    TableComparison { table: String, reason: String },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableComparison { table, reason } => {
                write!(f, "diff table `{table}` failed: {reason}")
            }
        }
    }
}

impl StdError for DiffError {}

#[derive(Debug)]
#[allow(dead_code)]
pub enum RenameError {
    AmbiguousMatch { table: String, name: String },
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousMatch { table, name } => {
                write!(f, "rename detection for `{table}`.`{name}` is ambiguous")
            }
        }
    }
}

impl StdError for RenameError {}

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    Model(ModelError),
    Diff(DiffError),
    Rename(RenameError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(error) => write!(f, "model error: {error}"),
            Self::Diff(error) => write!(f, "diff error: {error}"),
            Self::Rename(error) => write!(f, "rename error: {error}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Model(error) => Some(error),
            Self::Diff(error) => Some(error),
            Self::Rename(error) => Some(error),
        }
    }
}

impl From<ModelError> for Error {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<DiffError> for Error {
    fn from(value: DiffError) -> Self {
        Self::Diff(value)
    }
}

impl From<RenameError> for Error {
    fn from(value: RenameError) -> Self {
        Self::Rename(value)
    }
}

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Error>;
