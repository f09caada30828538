use std::collections::BTreeMap;

use crate::model::{Column, Constraint, Database, Index, Table};

use super::types::{ColumnChange, FieldChange, IndexChange, SchemaDiff, TableDiff, TableOptionChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Minimum similarity score (see `rename::similarity_score`) for a
    /// dropped/added column pair to be treated as a rename instead of a
    /// remove+add.
    pub rename_score_threshold: u32,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            rename_score_threshold: 12,
        }
    }
}

/// Compares two [`Database`] snapshots and produces a [`SchemaDiff`] tree.
/// Pure function: no I/O, no mutation of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ {
    pub options: DiffOptions,
}

impl Differ {
    #[must_use]
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn diff(&self, old: &Database, new: &Database) -> SchemaDiff {
        let mut warnings = Vec::new();
        let old_keys = name_key_map(&old.tables, "old schema table names", &mut warnings);
        let new_keys = name_key_map(&new.tables, "new schema table names", &mut warnings);

        let mut added_tables = Vec::new();
        let mut removed_tables = Vec::new();
        let mut changed_tables = Vec::new();

        for (key, name) in &new_keys {
            if !old_keys.contains_key(key) {
                added_tables.push(new.tables[name].clone());
            }
        }
        for (key, name) in &old_keys {
            if !new_keys.contains_key(key) {
                removed_tables.push(old.tables[name].clone());
            }
        }
        for (key, old_name) in &old_keys {
            if let Some(new_name) = new_keys.get(key) {
                let old_table = &old.tables[old_name];
                let new_table = &new.tables[new_name];
                let table_diff = self.diff_table(old_table, new_table, &mut warnings);
                if !table_diff.is_empty() {
                    changed_tables.push(table_diff);
                }
            }
        }

        added_tables.sort_by(|a, b| a.name.cmp(&b.name));
        removed_tables.sort_by(|a, b| a.name.cmp(&b.name));
        changed_tables.sort_by(|a, b| a.table.cmp(&b.table));

        SchemaDiff {
            added_tables,
            removed_tables,
            changed_tables,
            warnings,
        }
    }

    fn diff_table(&self, old: &Table, new: &Table, warnings: &mut Vec<String>) -> TableDiff {
        let (added_columns, removed_columns, changed_columns) = diff_columns(old, new, warnings);
        let (added_constraints, removed_constraints, changed_constraints) =
            diff_constraints(old, new, warnings);
        let (added_indexes, removed_indexes, changed_indexes) = diff_indexes(old, new, warnings);
        let option_changes = diff_options(old, new, warnings);
        let comment_change = diff_optional_field("comment", &old.comment, &new.comment);

        TableDiff {
            table: new.name.clone(),
            added_columns,
            removed_columns,
            changed_columns,
            renamed_columns: Vec::new(),
            added_constraints,
            removed_constraints,
            changed_constraints,
            added_indexes,
            removed_indexes,
            changed_indexes,
            option_changes,
            comment_change,
        }
    }
}

fn name_key_map<'a>(
    tables: &'a BTreeMap<String, Table>,
    context: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<String, &'a String> {
    let mut map: BTreeMap<String, &'a String> = BTreeMap::new();
    for name in tables.keys() {
        let key = name.to_ascii_lowercase();
        if let Some(existing) = map.get(&key) {
            warnings.push(format!(
                "{context}: `{existing}` and `{name}` collide case-insensitively; keeping `{existing}`"
            ));
            continue;
        }
        map.insert(key, name);
    }
    map
}

fn diff_columns(
    old: &Table,
    new: &Table,
    warnings: &mut Vec<String>,
) -> (Vec<Column>, Vec<Column>, Vec<ColumnChange>) {
    let old_by_name = map_by_key(
        &old.columns,
        |c| c.name.to_ascii_lowercase(),
        &format!("table `{}` old column names", old.name),
        warnings,
    );
    let new_by_name = map_by_key(
        &new.columns,
        |c| c.name.to_ascii_lowercase(),
        &format!("table `{}` new column names", new.name),
        warnings,
    );

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    for (key, column) in &new_by_name {
        if !old_by_name.contains_key(key) {
            added.push((*column).clone());
        }
    }
    for (key, column) in &old_by_name {
        if !new_by_name.contains_key(key) {
            removed.push((*column).clone());
        }
    }
    for (key, before) in &old_by_name {
        if let Some(after) = new_by_name.get(key) {
            let fields = column_field_changes(before, after);
            if !fields.is_empty() {
                changed.push(ColumnChange {
                    name: after.name.clone(),
                    before: (*before).clone(),
                    after: (*after).clone(),
                    fields,
                });
            }
        }
    }

    added.sort_by(|a, b| a.name.cmp(&b.name));
    removed.sort_by(|a, b| a.name.cmp(&b.name));
    changed.sort_by(|a, b| a.name.cmp(&b.name));
    (added, removed, changed)
}

fn column_field_changes(before: &Column, after: &Column) -> Vec<FieldChange> {
    let mut fields = Vec::new();
    macro_rules! push_if_changed {
        ($field:literal, $before:expr, $after:expr) => {
            if $before != $after {
                fields.push(FieldChange {
                    field: $field,
                    before: format!("{:?}", $before),
                    after: format!("{:?}", $after),
                });
            }
        };
    }
    push_if_changed!(
        "type_raw",
        before.type_raw.to_ascii_lowercase(),
        after.type_raw.to_ascii_lowercase()
    );
    push_if_changed!("nullable", before.nullable, after.nullable);
    push_if_changed!(
        "default_value",
        trimmed(&before.default_value),
        trimmed(&after.default_value)
    );
    push_if_changed!("on_update", trimmed(&before.on_update), trimmed(&after.on_update));
    push_if_changed!("auto_increment", before.auto_increment, after.auto_increment);
    push_if_changed!(
        "generation_expression",
        trimmed(&before.generation_expression),
        trimmed(&after.generation_expression)
    );
    push_if_changed!("generated_stored", before.generated_stored, after.generated_stored);
    push_if_changed!("auto_random", before.auto_random, after.auto_random);
    push_if_changed!(
        "charset",
        before.charset.as_deref().map(str::to_ascii_lowercase),
        after.charset.as_deref().map(str::to_ascii_lowercase)
    );
    push_if_changed!(
        "collation",
        before.collation.as_deref().map(str::to_ascii_lowercase),
        after.collation.as_deref().map(str::to_ascii_lowercase)
    );
    push_if_changed!(
        "column_format",
        before.column_format.as_deref().map(str::to_ascii_lowercase),
        after.column_format.as_deref().map(str::to_ascii_lowercase)
    );
    push_if_changed!(
        "storage",
        before.storage.as_deref().map(str::to_ascii_lowercase),
        after.storage.as_deref().map(str::to_ascii_lowercase)
    );
    push_if_changed!("comment", trimmed(&before.comment), trimmed(&after.comment));
    fields
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).map(str::to_string)
}

fn diff_constraints(
    old: &Table,
    new: &Table,
    warnings: &mut Vec<String>,
) -> (Vec<Constraint>, Vec<Constraint>, Vec<super::types::ConstraintChange>) {
    let old_by_key = map_by_key(
        &old.constraints,
        Constraint::constraint_key,
        &format!("table `{}` old constraint keys", old.name),
        warnings,
    );
    let new_by_key = map_by_key(
        &new.constraints,
        Constraint::constraint_key,
        &format!("table `{}` new constraint keys", new.name),
        warnings,
    );

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    for (key, constraint) in &new_by_key {
        if !old_by_key.contains_key(key) {
            added.push((*constraint).clone());
        }
    }
    for (key, constraint) in &old_by_key {
        if !new_by_key.contains_key(key) {
            removed.push((*constraint).clone());
        }
    }
    for (key, before) in &old_by_key {
        if let Some(after) = new_by_key.get(key) {
            if *before != *after {
                changed.push(super::types::ConstraintChange {
                    key: key.clone(),
                    before: (*before).clone(),
                    after: (*after).clone(),
                    rebuild_required: false,
                });
            }
        }
    }

    added.sort_by_key(Constraint::constraint_key);
    removed.sort_by_key(Constraint::constraint_key);
    changed.sort_by(|a, b| a.key.cmp(&b.key));
    (added, removed, changed)
}

fn diff_indexes(
    old: &Table,
    new: &Table,
    warnings: &mut Vec<String>,
) -> (Vec<Index>, Vec<Index>, Vec<IndexChange>) {
    let old_by_name = map_by_key(
        &old.indexes,
        |i| i.name.to_ascii_lowercase(),
        &format!("table `{}` old index names", old.name),
        warnings,
    );
    let new_by_name = map_by_key(
        &new.indexes,
        |i| i.name.to_ascii_lowercase(),
        &format!("table `{}` new index names", new.name),
        warnings,
    );

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    for (key, index) in &new_by_name {
        if !old_by_name.contains_key(key) {
            added.push((*index).clone());
        }
    }
    for (key, index) in &old_by_name {
        if !new_by_name.contains_key(key) {
            removed.push((*index).clone());
        }
    }
    for (key, before) in &old_by_name {
        if let Some(after) = new_by_name.get(key) {
            if *before != *after {
                changed.push(IndexChange {
                    name: after.name.clone(),
                    before: (*before).clone(),
                    after: (*after).clone(),
                });
            }
        }
    }

    added.sort_by(|a, b| a.name.cmp(&b.name));
    removed.sort_by(|a, b| a.name.cmp(&b.name));
    changed.sort_by(|a, b| a.name.cmp(&b.name));
    (added, removed, changed)
}

fn diff_options(old: &Table, new: &Table, warnings: &mut Vec<String>) -> Vec<TableOptionChange> {
    let mut changes = Vec::new();

    let mut keys: Vec<_> = old
        .options
        .known
        .keys()
        .chain(new.options.known.keys())
        .copied()
        .collect();
    keys.sort();
    keys.dedup();
    for key in keys {
        let before = old.options.known.get(&key).cloned();
        let after = new.options.known.get(&key).cloned();
        if before != after {
            changes.push(TableOptionChange {
                key: format!("{key:?}"),
                before,
                after,
            });
        }
    }

    let mut unknown_keys: Vec<_> = old
        .options
        .unknown
        .keys()
        .chain(new.options.unknown.keys())
        .cloned()
        .collect();
    unknown_keys.sort();
    unknown_keys.dedup();
    for key in unknown_keys {
        let before = old.options.unknown.get(&key).cloned();
        let after = new.options.unknown.get(&key).cloned();
        if before != after {
            warnings.push(format!(
                "table `{}`: comparing unrecognized table option `{key}`",
                new.name
            ));
            changes.push(TableOptionChange { key, before, after });
        }
    }

    changes.sort_by(|a, b| a.key.cmp(&b.key));
    changes
}

fn diff_optional_field(
    field: &'static str,
    before: &Option<String>,
    after: &Option<String>,
) -> Option<FieldChange> {
    if trimmed(before) == trimmed(after) {
        return None;
    }
    Some(FieldChange {
        field,
        before: before.clone().unwrap_or_default(),
        after: after.clone().unwrap_or_default(),
    })
}

/// Builds a key -> item map, pushing a warning (instead of silently letting
/// the later item win) whenever two items collide on the same key.
fn map_by_key<'a, T, K: Ord + std::fmt::Display, F: Fn(&T) -> K>(
    items: &'a [T],
    key_fn: F,
    context: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<K, &'a T> {
    let mut map: BTreeMap<K, &'a T> = BTreeMap::new();
    for item in items {
        let key = key_fn(item);
        if map.contains_key(&key) {
            warnings.push(format!("{context}: `{key}` collides with a previous entry; keeping the first"));
            continue;
        }
        map.insert(key, item);
    }
    map
}
