use std::fmt::Write as _;

use smf_core::{Constraint, Migration, Operation, SchemaDiff, Table, TableDiff};

use crate::breaking;
use crate::column_def::{render_column_definition, render_column_definition_named};
use crate::quoting::{quote_ident, safe_backup_name};
use crate::table_options::{option_keyword, option_takes_string_literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateOptions {
    /// When set, a dropped table/index/constraint/column is renamed to a
    /// deterministic backup name instead of being dropped outright, so the
    /// down migration can always restore it (see `quoting::safe_backup_name`).
    pub safe_mode: bool,
}

/// Turns a [`SchemaDiff`] into a [`Migration`]: one [`Operation`] per
/// schema-level change, table-scoped operations in the fixed phase order
/// from `SPEC_FULL.md` §4.5.1, with foreign-key `ADD CONSTRAINT`
/// statements collected and emitted once at the very end of the whole
/// plan so every referenced table already exists by the time they run.
#[must_use]
pub fn generate(diff: &SchemaDiff, options: GenerateOptions) -> Migration {
    let mut migration = Migration::new();
    let mut pending_foreign_keys = Vec::new();

    // Step 1: breaking-change analysis, with per-signal data-migration tips,
    // happens before any SQL is emitted.
    for change in breaking::analyze(diff) {
        let table = Some(change.table.clone());
        migration.push(Operation::Breaking {
            table: table.clone(),
            message: format!(
                "{:?} {}{}: {}",
                change.severity,
                change.table,
                change.object.as_deref().map(|o| format!(".{o}")).unwrap_or_default(),
                change.reason
            ),
        });
        if let Some(tip) = data_migration_tip(&change.reason) {
            migration.push(Operation::Note { table, message: tip });
        }
    }

    // Step 2: standing safe-mode note.
    if options.safe_mode {
        migration.push(Operation::Note {
            table: None,
            message: "safe mode: drops are replaced by renames to a `__smf_backup_<hash>` name so data is recoverable"
                .to_string(),
        });
    }

    // Step 3: added tables.
    for table in &diff.added_tables {
        migration.push(create_table_operation(table));
    }

    // Step 4: modified tables.
    for table_diff in &diff.changed_tables {
        generate_alter_table(table_diff, options, &mut migration, &mut pending_foreign_keys);
    }

    // Step 5: pending FK pass.
    for operation in pending_foreign_keys {
        migration.push(operation);
    }

    // Step 6: removed tables.
    for table in &diff.removed_tables {
        migration.push(drop_table_operation(table, options));
    }

    // Step 7: lock-time advisory.
    apply_lock_advisory(&mut migration);

    // Step 8: dedupe.
    migration.dedupe();
    migration
}

/// Matches a breaking-change reason against known substrings and returns a
/// concrete data-migration suggestion, or `None` if the reason carries no
/// actionable tip.
fn data_migration_tip(reason: &str) -> Option<String> {
    let lower = reason.to_ascii_lowercase();
    if lower.contains("becomes not null") {
        Some("backfill existing NULL values before applying, or the ALTER will fail".to_string())
    } else if lower.contains("length shrinks") {
        Some("verify no existing value exceeds the new length before applying, or it will be truncated".to_string())
    } else if lower.contains("column will be dropped") {
        Some("export the column's data first if it is needed after this migration".to_string())
    } else {
        None
    }
}

/// Sets `requires_lock` on every `Sql` operation whose `up_sql` starts with
/// `ALTER TABLE`, `CREATE INDEX`, or `DROP INDEX`, and appends a single
/// standing note if any statement qualified.
fn apply_lock_advisory(migration: &mut Migration) {
    const LOCKING_PREFIXES: &[&str] = &["ALTER TABLE", "CREATE INDEX", "DROP INDEX"];
    let mut any_locking = false;
    for operation in migration.operations_mut() {
        if let Operation::Sql { up_sql, requires_lock, .. } = operation {
            let trimmed = up_sql.trim_start();
            if LOCKING_PREFIXES
                .iter()
                .any(|prefix| trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix))
            {
                *requires_lock = true;
                any_locking = true;
            }
        }
    }
    if any_locking {
        migration.push(Operation::Note {
            table: None,
            message: "one or more statements in this plan may acquire table-level locks while running".to_string(),
        });
    }
}

fn create_table_operation(table: &Table) -> Operation {
    let mut up = String::new();
    write!(up, "CREATE TABLE {} (\n", quote_ident(&table.name)).expect("write to String");
    let mut column_lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| format!("  {}", render_column_definition(column)))
        .collect();
    for constraint in &table.constraints {
        column_lines.push(format!("  {}", render_constraint_clause(constraint)));
    }
    up.push_str(&column_lines.join(",\n"));
    up.push_str("\n)");
    if let Some(trailer) = render_table_options_trailer(table) {
        write!(up, " {trailer}").expect("write to String");
    }
    up.push(';');

    Operation::sql(table.name.clone(), up, format!("DROP TABLE {};", quote_ident(&table.name)))
}

fn drop_table_operation(table: &Table, options: GenerateOptions) -> Operation {
    if options.safe_mode {
        let backup = safe_backup_name(&table.name, &table.name);
        Operation::sql(
            table.name.clone(),
            format!("RENAME TABLE {} TO {};", quote_ident(&table.name), quote_ident(&backup)),
            format!("RENAME TABLE {} TO {};", quote_ident(&backup), quote_ident(&table.name)),
        )
    } else {
        Operation::sql(
            table.name.clone(),
            format!("DROP TABLE {};", quote_ident(&table.name)),
            format!("-- cannot auto-restore table `{}`", table.name),
        )
    }
}

fn generate_alter_table(
    table_diff: &TableDiff,
    options: GenerateOptions,
    migration: &mut Migration,
    pending_foreign_keys: &mut Vec<Operation>,
) {
    let table = quote_ident(&table_diff.table);

    // Phase 1: drop constraints being removed or rebuilt (non-FK first,
    // FK drops happen here too since the referencing side always owns them).
    for constraint in &table_diff.removed_constraints {
        migration.push(drop_constraint_operation(&table_diff.table, constraint, None));
    }
    for change in &table_diff.changed_constraints {
        if change.rebuild_required {
            migration.push(drop_constraint_operation(
                &table_diff.table,
                &change.before,
                Some(&change.after),
            ));
        }
    }

    // Phase 2: drop indexes being removed or rebuilt.
    for index in &table_diff.removed_indexes {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} DROP INDEX {};", quote_ident(&index.name)),
            format!("ALTER TABLE {table} ADD {};", render_index_clause(index)),
        ));
    }
    for change in &table_diff.changed_indexes {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} DROP INDEX {};", quote_ident(&change.before.name)),
            format!("ALTER TABLE {table} ADD {};", render_index_clause(&change.before)),
        ));
    }

    // Phase 3: rename columns via CHANGE COLUMN, carrying the new definition.
    for rename in &table_diff.renamed_columns {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!(
                "ALTER TABLE {table} CHANGE COLUMN {} {};",
                quote_ident(&rename.from),
                render_column_definition_named(&rename.to, &rename.after)
            ),
            format!(
                "ALTER TABLE {table} CHANGE COLUMN {} {};",
                quote_ident(&rename.to),
                render_column_definition_named(&rename.from, &rename.before)
            ),
        ));
    }

    // Phase 4: add columns.
    for column in &table_diff.added_columns {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} ADD COLUMN {};", render_column_definition(column)),
            format!("ALTER TABLE {table} DROP COLUMN {};", quote_ident(&column.name)),
        ));
    }

    // Phase 5: modify columns.
    for change in &table_diff.changed_columns {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} MODIFY COLUMN {};", render_column_definition(&change.after)),
            format!("ALTER TABLE {table} MODIFY COLUMN {};", render_column_definition(&change.before)),
        ));
    }

    // Phase 6: remove columns; safe mode preserves data via CHANGE COLUMN
    // to a backup name instead of DROP COLUMN.
    for column in &table_diff.removed_columns {
        if options.safe_mode {
            let backup = safe_backup_name(&table_diff.table, &column.name);
            migration.push(Operation::sql(
                table_diff.table.clone(),
                format!(
                    "ALTER TABLE {table} CHANGE COLUMN {} {};",
                    quote_ident(&column.name),
                    render_column_definition_named(&backup, column)
                ),
                format!(
                    "ALTER TABLE {table} CHANGE COLUMN {} {};",
                    quote_ident(&backup),
                    render_column_definition_named(&column.name, column)
                ),
            ));
        } else {
            migration.push(Operation::sql(
                table_diff.table.clone(),
                format!("ALTER TABLE {table} DROP COLUMN {};", quote_ident(&column.name)),
                format!("ALTER TABLE {table} ADD COLUMN {};", render_column_definition(column)),
            ));
        }
    }

    // Phase 7: table options.
    for option_change in &table_diff.option_changes {
        if is_unknown_option_key(&option_change.key) {
            migration.push(Operation::Note {
                table: Some(table_diff.table.clone()),
                message: format!("ignoring unknown table option '{}' on `{}`", option_change.key, table_diff.table),
            });
            continue;
        }
        let keyword = crate::table_options::keyword_for_debug_name(&option_change.key);
        let (up_value, down_value) = (
            option_change.after.clone().unwrap_or_default(),
            option_change.before.clone().unwrap_or_default(),
        );
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} {keyword} = {up_value};"),
            format!("ALTER TABLE {table} {keyword} = {down_value};"),
        ));
    }

    // Phase 8: add indexes (new or rebuilt).
    for index in &table_diff.added_indexes {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} ADD {};", render_index_clause(index)),
            format!("ALTER TABLE {table} DROP INDEX {};", quote_ident(&index.name)),
        ));
    }
    for change in &table_diff.changed_indexes {
        migration.push(Operation::sql(
            table_diff.table.clone(),
            format!("ALTER TABLE {table} ADD {};", render_index_clause(&change.after)),
            format!("ALTER TABLE {table} DROP INDEX {};", quote_ident(&change.after.name)),
        ));
    }

    // Phase 9: add constraints. Foreign keys are deferred to the end of
    // the whole plan; everything else is emitted immediately.
    for constraint in &table_diff.added_constraints {
        push_add_constraint(table_diff, constraint, migration, pending_foreign_keys);
    }
    for change in &table_diff.changed_constraints {
        if change.rebuild_required {
            push_add_constraint(table_diff, &change.after, migration, pending_foreign_keys);
        }
    }
}

fn push_add_constraint(
    table_diff: &TableDiff,
    constraint: &Constraint,
    migration: &mut Migration,
    pending_foreign_keys: &mut Vec<Operation>,
) {
    let table = quote_ident(&table_diff.table);
    let operation = Operation::sql(
        table_diff.table.clone(),
        format!("ALTER TABLE {table} ADD {};", render_constraint_clause(constraint)),
        format!("ALTER TABLE {table} DROP {};", drop_constraint_clause(constraint)),
    );
    if matches!(constraint, Constraint::ForeignKey { .. }) {
        pending_foreign_keys.push(operation);
    } else {
        migration.push(operation);
    }
}

fn drop_constraint_operation(table: &str, constraint: &Constraint, replacement: Option<&Constraint>) -> Operation {
    let table_ident = quote_ident(table);
    let down_sql = match replacement {
        Some(replacement) => format!("ALTER TABLE {table_ident} ADD {};", render_constraint_clause(replacement)),
        None => format!("ALTER TABLE {table_ident} ADD {};", render_constraint_clause(constraint)),
    };
    Operation::sql(
        table.to_string(),
        format!("ALTER TABLE {table_ident} DROP {};", drop_constraint_clause(constraint)),
        down_sql,
    )
}

fn render_constraint_clause(constraint: &Constraint) -> String {
    match constraint {
        Constraint::PrimaryKey { columns, .. } => {
            format!("PRIMARY KEY ({})", join_idents(columns))
        }
        Constraint::Unique { name, columns } => match name {
            Some(name) => format!("CONSTRAINT {} UNIQUE ({})", quote_ident(name), join_idents(columns)),
            None => format!("UNIQUE ({})", join_idents(columns)),
        },
        Constraint::ForeignKey {
            name,
            columns,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
        } => {
            let mut clause = match name {
                Some(name) => format!("CONSTRAINT {} FOREIGN KEY ({})", quote_ident(name), join_idents(columns)),
                None => format!("FOREIGN KEY ({})", join_idents(columns)),
            };
            let _ = write!(
                clause,
                " REFERENCES {} ({})",
                quote_ident(referenced_table),
                join_idents(referenced_columns)
            );
            if let Some(action) = on_delete {
                let _ = write!(clause, " ON DELETE {action}");
            }
            if let Some(action) = on_update {
                let _ = write!(clause, " ON UPDATE {action}");
            }
            clause
        }
        Constraint::Check { name, check_expression } => match name {
            Some(name) => format!("CONSTRAINT {} CHECK ({check_expression})", quote_ident(name)),
            None => format!("CHECK ({check_expression})"),
        },
    }
}

fn drop_constraint_clause(constraint: &Constraint) -> String {
    match constraint {
        Constraint::PrimaryKey { .. } => "PRIMARY KEY".to_string(),
        Constraint::Unique { name, .. } => match name {
            Some(name) => format!("INDEX {}", quote_ident(name)),
            None => "INDEX".to_string(),
        },
        Constraint::ForeignKey { name, .. } => match name {
            Some(name) => format!("FOREIGN KEY {}", quote_ident(name)),
            None => "FOREIGN KEY".to_string(),
        },
        Constraint::Check { name, .. } => match name {
            Some(name) => format!("CHECK {}", quote_ident(name)),
            None => "CHECK".to_string(),
        },
    }
}

fn render_index_clause(index: &smf_core::Index) -> String {
    let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
    let columns = index
        .columns
        .iter()
        .map(|column| {
            let mut rendered = quote_ident(&column.name);
            if let Some(prefix) = column.prefix_length {
                let _ = write!(rendered, "({prefix})");
            }
            if column.order == smf_core::SortOrder::Desc {
                rendered.push_str(" DESC");
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{kind} {} ({columns})", quote_ident(&index.name))
}

fn render_table_options_trailer(table: &Table) -> Option<String> {
    if table.options.known.is_empty() {
        return None;
    }
    let clauses: Vec<String> = table
        .options
        .known
        .iter()
        .map(|(key, value)| {
            if option_takes_string_literal(*key) {
                format!("{} = {}", option_keyword(*key), crate::quoting::quote_string(value))
            } else {
                format!("{} = {value}", option_keyword(*key))
            }
        })
        .collect();
    Some(clauses.join(" "))
}

/// An option key came from the model's closed `TableOptionKey` registry
/// (rendered via `{key:?}`, CamelCase) or from its verbatim-unknown
/// passthrough map (canonical uppercase, e.g. `"MY_CUSTOM_OPTION"`).
fn is_unknown_option_key(key: &str) -> bool {
    key.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
}

fn join_idents(names: &[String]) -> String {
    names.iter().map(|n| quote_ident(n)).collect::<Vec<_>>().join(", ")
}

/// Pull the `up_sql` of every `Sql` operation out of a migration, in order;
/// used by tests that only care about the emitted DDL, not the notes.
#[cfg(test)]
fn up_sql_statements(migration: &Migration) -> Vec<&str> {
    migration
        .operations()
        .iter()
        .filter_map(|operation| match operation {
            Operation::Sql { up_sql, .. } if !up_sql.trim().is_empty() => Some(up_sql.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smf_core::{Column, Database, Differ};

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            name: name.to_string(),
            columns,
            constraints: Vec::new(),
            indexes: Vec::new(),
            options: Default::default(),
            comment: None,
        }
    }

    #[test]
    fn added_table_generates_create_and_drop() {
        let mut new = Database::new();
        new.tables
            .insert("users".to_string(), table("users", vec![Column::new("id", "int")]));
        let diff = Differ::default().diff(&Database::new(), &new);

        let migration = generate(&diff, GenerateOptions::default());
        let statements = up_sql_statements(&migration);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("CREATE TABLE `users`"));
    }

    #[test]
    fn added_column_generates_add_and_drop() {
        let mut old = Database::new();
        old.tables
            .insert("users".to_string(), table("users", vec![Column::new("id", "int")]));
        let mut new = Database::new();
        new.tables.insert(
            "users".to_string(),
            table(
                "users",
                vec![Column::new("id", "int"), Column::new("email", "varchar(255)")],
            ),
        );
        let diff = Differ::default().diff(&old, &new);

        let migration = generate(&diff, GenerateOptions::default());
        let Operation::Sql { up_sql, down_sql, .. } = migration
            .operations()
            .iter()
            .find(|op| matches!(op, Operation::Sql { .. }))
            .unwrap()
        else {
            unreachable!()
        };
        assert_eq!(up_sql, "ALTER TABLE `users` ADD COLUMN `email` varchar(255) NULL;");
        assert_eq!(down_sql, "ALTER TABLE `users` DROP COLUMN `email`;");
    }

    #[test]
    fn safe_mode_renames_dropped_table_instead_of_dropping() {
        let mut old = Database::new();
        old.tables
            .insert("legacy".to_string(), table("legacy", vec![Column::new("id", "int")]));
        let diff = Differ::default().diff(&old, &Database::new());

        let migration = generate(&diff, GenerateOptions { safe_mode: true });
        let statements = up_sql_statements(&migration);
        assert!(statements.iter().any(|s| s.starts_with("RENAME TABLE `legacy` TO `__smf_backup_")));
        assert!(migration.info_notes().iter().any(|n| n.contains("safe mode")));
    }

    #[test]
    fn safe_mode_never_emits_drop_table_or_drop_column() {
        let mut old = Database::new();
        old.tables.insert(
            "legacy".to_string(),
            table("legacy", vec![Column::new("id", "int"), Column::new("notes", "text")]),
        );
        let mut new = Database::new();
        new.tables
            .insert("legacy".to_string(), table("legacy", vec![Column::new("id", "int")]));
        let diff = Differ::default().diff(&old, &new);

        let migration = generate(&diff, GenerateOptions { safe_mode: true });
        for statement in up_sql_statements(&migration) {
            assert!(!statement.starts_with("DROP TABLE"));
            assert!(!statement.contains("DROP COLUMN"));
        }
    }

    #[test]
    fn rename_emits_change_column_with_full_definition() {
        let mut old = Database::new();
        let mut before_column = Column::new("user_identifier", "int");
        before_column.nullable = false;
        old.tables
            .insert("t".to_string(), table("t", vec![before_column]));
        let mut new = Database::new();
        let mut after_column = Column::new("user_id", "int");
        after_column.nullable = false;
        new.tables.insert("t".to_string(), table("t", vec![after_column]));

        let diff = Differ::default().diff(&old, &new);
        assert_eq!(diff.changed_tables[0].renamed_columns.len(), 1);

        let migration = generate(&diff, GenerateOptions::default());
        let statements = up_sql_statements(&migration);
        assert!(statements
            .iter()
            .any(|s| *s == "ALTER TABLE `t` CHANGE COLUMN `user_identifier` `user_id` int NOT NULL;"));
    }

    #[test]
    fn unsafe_drop_table_rollback_is_a_comment() {
        let mut old = Database::new();
        old.tables
            .insert("posts".to_string(), table("posts", vec![Column::new("id", "int")]));
        let diff = Differ::default().diff(&old, &Database::new());

        let migration = generate(&diff, GenerateOptions::default());
        let Operation::Sql { down_sql, .. } = migration
            .operations()
            .iter()
            .find(|op| matches!(op, Operation::Sql { up_sql, .. } if up_sql.starts_with("DROP TABLE")))
            .unwrap()
        else {
            unreachable!()
        };
        assert!(down_sql.starts_with("-- cannot auto-restore"));
    }

    #[test]
    fn foreign_key_additions_are_deferred_to_the_end_of_the_plan() {
        let mut old = Database::new();
        old.tables
            .insert("users".to_string(), table("users", vec![Column::new("id", "int")]));
        old.tables
            .insert("orders".to_string(), table("orders", vec![Column::new("id", "int")]));
        let mut new = old.clone();
        let orders = new.tables.get_mut("orders").unwrap();
        orders.columns.push(Column::new("user_id", "int"));
        orders.constraints.push(Constraint::ForeignKey {
            name: Some("fk_orders_users".to_string()),
            columns: vec!["user_id".to_string()],
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: None,
            on_update: None,
        });

        let diff = Differ::default().diff(&old, &new);
        let migration = generate(&diff, GenerateOptions::default());
        let statements = up_sql_statements(&migration);
        let fk_index = statements.iter().position(|s| s.contains("FOREIGN KEY")).unwrap();
        let add_column_index = statements.iter().position(|s| s.contains("ADD COLUMN")).unwrap();
        assert!(fk_index > add_column_index);
    }

    #[test]
    fn lock_advisory_note_is_emitted_for_alter_table_statements() {
        let mut old = Database::new();
        old.tables
            .insert("users".to_string(), table("users", vec![Column::new("id", "int")]));
        let mut new = Database::new();
        new.tables.insert(
            "users".to_string(),
            table(
                "users",
                vec![Column::new("id", "int"), Column::new("email", "varchar(255)")],
            ),
        );
        let diff = Differ::default().diff(&old, &new);
        let migration = generate(&diff, GenerateOptions::default());
        assert!(migration.info_notes().iter().any(|n| n.contains("table-level locks")));
    }

    #[test]
    fn breaking_analysis_produces_notes_before_sql() {
        let mut old = Database::new();
        old.tables
            .insert("users".to_string(), table("users", vec![Column::new("id", "int")]));
        let diff = Differ::default().diff(&old, &Database::new());
        let migration = generate(&diff, GenerateOptions::default());
        let first_index = migration.operations().iter().position(|op| matches!(op, Operation::Breaking { .. }));
        let sql_index = migration.operations().iter().position(|op| matches!(op, Operation::Sql { .. }));
        assert!(first_index.unwrap() < sql_index.unwrap());
    }
}
