mod diff;
mod error;
mod migration;
mod model;

pub use diff::{
    ColumnChange, ColumnRename, ConstraintChange, DiffOptions, Differ, FieldChange, IndexChange,
    SchemaDiff, TableDiff, TableOptionChange, detect_renames, mark_constraint_rebuilds,
};
pub use error::{DiffError, Error, ModelError, RenameError, Result};
pub use migration::{BreakingChange, Migration, Operation, Severity};
pub use model::{
    Column, Constraint, Database, Index, IndexColumn, IndexKind, IndexVisibility, SortOrder, Table,
    TableOptionKey, TableOptions, normalize_type,
};
