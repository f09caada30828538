use crate::model::{Column, Constraint, Index};

/// One named attribute that differs between two versions of the same
/// entity, e.g. `nullable: true -> false` on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChange {
    pub name: String,
    pub before: Column,
    pub after: Column,
    pub fields: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
    pub before: Column,
    pub after: Column,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintChange {
    pub key: String,
    pub before: Constraint,
    pub after: Constraint,
    /// Set by the constraint rebuild marker, not the differ itself.
    pub rebuild_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexChange {
    pub name: String,
    pub before: Index,
    pub after: Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptionChange {
    pub key: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Everything that changed about one table that exists in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDiff {
    pub table: String,
    pub added_columns: Vec<Column>,
    pub removed_columns: Vec<Column>,
    pub changed_columns: Vec<ColumnChange>,
    pub renamed_columns: Vec<ColumnRename>,
    pub added_constraints: Vec<Constraint>,
    pub removed_constraints: Vec<Constraint>,
    pub changed_constraints: Vec<ConstraintChange>,
    pub added_indexes: Vec<Index>,
    pub removed_indexes: Vec<Index>,
    pub changed_indexes: Vec<IndexChange>,
    pub option_changes: Vec<TableOptionChange>,
    pub comment_change: Option<FieldChange>,
}

impl TableDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.changed_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.added_constraints.is_empty()
            && self.removed_constraints.is_empty()
            && self.changed_constraints.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.option_changes.is_empty()
            && self.comment_change.is_none()
    }
}

/// The full result of comparing two [`crate::Database`] snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaDiff {
    pub added_tables: Vec<crate::model::Table>,
    pub removed_tables: Vec<crate::model::Table>,
    pub changed_tables: Vec<TableDiff>,
    /// Non-fatal observations surfaced to the caller instead of an error,
    /// e.g. an unrecognized table option key encountered during comparison.
    pub warnings: Vec<String>,
}

impl SchemaDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.changed_tables.iter().all(TableDiff::is_empty)
    }
}
