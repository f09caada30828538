use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A full schema snapshot: every table known at a point in time, keyed by
/// table name for deterministic iteration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Database {
    pub tables: BTreeMap<String, Table>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
    pub options: TableOptions,
    pub comment: Option<String>,
}

impl Table {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Raw type text as written in the source schema, e.g. `"varchar(255)"`.
    pub type_raw: String,
    /// Normalized base type, e.g. `"varchar"`, derived from `type_raw`.
    pub type_normalized: String,
    /// Declared length/precision, when the raw type carries one.
    pub length: Option<u64>,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub on_update: Option<String>,
    pub auto_increment: bool,
    /// `AUTO_RANDOM` shard-bit width; `0` means absent.
    pub auto_random: u64,
    pub generation_expression: Option<String>,
    pub generated_stored: bool,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub column_format: Option<String>,
    pub storage: Option<String>,
    pub comment: Option<String>,
    pub ordinal_position: usize,
}

impl Column {
    /// Builds a column, deriving `type_normalized`/`length` from `type_raw`.
    #[must_use]
    pub fn new(name: impl Into<String>, type_raw: impl Into<String>) -> Self {
        let type_raw = type_raw.into();
        let (type_normalized, length) = normalize_type(&type_raw);
        Self {
            name: name.into(),
            type_raw,
            type_normalized,
            length,
            nullable: true,
            default_value: None,
            on_update: None,
            auto_increment: false,
            auto_random: 0,
            generation_expression: None,
            generated_stored: false,
            charset: None,
            collation: None,
            column_format: None,
            storage: None,
            comment: None,
            ordinal_position: 0,
        }
    }
}

/// Splits a raw MySQL column type into its base keyword and an optional
/// length/precision, e.g. `"varchar(255)"` -> `("varchar", Some(255))`.
#[must_use]
pub fn normalize_type(type_raw: &str) -> (String, Option<u64>) {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        regex::Regex::new(r"^([A-Za-z_][A-Za-z0-9_ ]*?)\s*(?:\(\s*(\d+)(?:\s*,\s*\d+)?\s*\))?\s*$")
            .expect("normalize_type pattern is a fixed, valid regex")
    });
    match pattern.captures(type_raw.trim()) {
        Some(captures) => {
            let base = captures
                .get(1)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            let length = captures
                .get(2)
                .and_then(|m| m.as_str().parse::<u64>().ok());
            (base, length)
        }
        None => (type_raw.trim().to_ascii_lowercase(), None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
        on_delete: Option<String>,
        on_update: Option<String>,
    },
    Check {
        name: Option<String>,
        check_expression: String,
    },
}

impl Constraint {
    /// The key the differ and rebuild marker use to match a constraint
    /// across two schema snapshots: the lowercased explicit name if one is
    /// given, otherwise a positional key derived from kind and columns.
    #[must_use]
    pub fn constraint_key(&self) -> String {
        match self {
            Self::PrimaryKey { name, columns } => {
                keyed("primary_key", name.as_deref(), columns)
            }
            Self::Unique { name, columns } => keyed("unique", name.as_deref(), columns),
            Self::ForeignKey { name, columns, .. } => {
                keyed("foreign_key", name.as_deref(), columns)
            }
            Self::Check { name, .. } => keyed("check", name.as_deref(), &[]),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        match self {
            Self::PrimaryKey { columns, .. }
            | Self::Unique { columns, .. }
            | Self::ForeignKey { columns, .. } => columns,
            Self::Check { .. } => &[],
        }
    }
}

fn keyed(kind: &str, name: Option<&str>, columns: &[String]) -> String {
    match name {
        Some(name) => name.to_ascii_lowercase(),
        None => format!(
            "{kind}:{}",
            columns
                .iter()
                .map(|c| c.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub prefix_length: Option<u32>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    #[default]
    BTree,
    Hash,
    FullText,
    Spatial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexVisibility {
    #[default]
    Visible,
    Invisible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<IndexColumn>,
    pub kind: IndexKind,
    pub comment: Option<String>,
    pub visibility: IndexVisibility,
}

/// The closed set of `CREATE TABLE` option keys this model understands.
/// Unknown option names encountered while building a [`Table`] are kept
/// verbatim in [`TableOptions::unknown`] rather than rejected, so that a
/// schema carrying an option this registry doesn't name still round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableOptionKey {
    Engine,
    AutoIncrement,
    AvgRowLength,
    CharacterSet,
    Checksum,
    Collate,
    Comment,
    Compression,
    Connection,
    DataDirectory,
    DelayKeyWrite,
    Encryption,
    IndexDirectory,
    InsertMethod,
    KeyBlockSize,
    MaxRows,
    MinRows,
    PackKeys,
    Password,
    RowFormat,
    StatsAutoRecalc,
    StatsPersistent,
    StatsSamplePages,
    Tablespace,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub known: BTreeMap<TableOptionKey, String>,
    /// Option names not in [`TableOptionKey`], kept by canonical uppercase
    /// name so the differ can still compare them and the generator can warn
    /// about them (see the "unknown option keys" decision in `SPEC_FULL.md`).
    pub unknown: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_type_splits_base_and_length() {
        assert_eq!(
            normalize_type("varchar(255)"),
            ("varchar".to_string(), Some(255))
        );
    }

    #[test]
    fn normalize_type_handles_precision_and_scale() {
        let (base, length) = normalize_type("decimal(10,2)");
        assert_eq!(base, "decimal");
        assert_eq!(length, Some(10));
    }

    #[test]
    fn normalize_type_without_length() {
        assert_eq!(normalize_type("bigint"), ("bigint".to_string(), None));
    }

    #[test]
    fn constraint_key_uses_explicit_name_when_present() {
        let constraint = Constraint::Unique {
            name: Some("UQ_Email".to_string()),
            columns: vec!["email".to_string()],
        };
        assert_eq!(constraint.constraint_key(), "uq_email");
    }

    #[test]
    fn constraint_key_falls_back_to_kind_and_columns() {
        let constraint = Constraint::Unique {
            name: None,
            columns: vec!["Email".to_string(), "Tenant".to_string()],
        };
        assert_eq!(constraint.constraint_key(), "unique:email,tenant");
    }
}
