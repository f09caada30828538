mod engine;
mod rebuild;
mod rename;
mod types;

pub use engine::{DiffOptions, Differ};
pub use rebuild::mark_constraint_rebuilds;
pub use rename::detect_renames;
pub use types::{
    ColumnChange, ColumnRename, ConstraintChange, FieldChange, IndexChange, SchemaDiff, TableDiff,
    TableOptionChange,
};
