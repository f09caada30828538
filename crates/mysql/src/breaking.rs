use smf_core::Severity;
use smf_core::{BreakingChange, Constraint, SchemaDiff};

use crate::type_category::{Widening, compare_widening};

/// Walks a [`SchemaDiff`] and classifies every change that could affect a
/// consumer of the schema, per the severity rules in `SPEC_FULL.md` §4.7.
/// `Critical` marks changes that destroy data or change a type's category
/// outright (dropped tables/columns, cross-rank or cross-category type
/// changes); `Breaking` marks changes a consumer must account for but that
/// don't lose data by themselves (renames, new `NOT NULL` requirements,
/// VARCHAR-length shrinks, added unique constraints); `Warning` and `Info`
/// are progressively softer observations.
#[must_use]
pub fn analyze(diff: &SchemaDiff) -> Vec<BreakingChange> {
    let mut findings = Vec::new();

    for table in &diff.removed_tables {
        findings.push(BreakingChange {
            table: table.name.clone(),
            object: None,
            severity: Severity::Critical,
            reason: "table dropped".to_string(),
        });
    }

    for table_diff in &diff.changed_tables {
        for column in &table_diff.removed_columns {
            findings.push(BreakingChange {
                table: table_diff.table.clone(),
                object: Some(column.name.clone()),
                severity: Severity::Critical,
                reason: "column will be dropped".to_string(),
            });
        }

        for rename in &table_diff.renamed_columns {
            findings.push(BreakingChange {
                table: table_diff.table.clone(),
                object: Some(rename.from.clone()),
                severity: Severity::Breaking,
                reason: format!("column renamed to `{}`", rename.to),
            });
        }

        for change in &table_diff.changed_columns {
            findings.extend(classify_column_change(&table_diff.table, change));
        }

        for column in &table_diff.added_columns {
            if !column.nullable && column.default_value.is_none() {
                findings.push(BreakingChange {
                    table: table_diff.table.clone(),
                    object: Some(column.name.clone()),
                    severity: Severity::Breaking,
                    reason: "new NOT NULL column added without a default".to_string(),
                });
            }
        }

        for constraint in &table_diff.added_constraints {
            if matches!(constraint, Constraint::Unique { .. }) {
                findings.push(BreakingChange {
                    table: table_diff.table.clone(),
                    object: Some(constraint.constraint_key()),
                    severity: Severity::Breaking,
                    reason: "unique constraint added; existing duplicate values will reject inserts/updates"
                        .to_string(),
                });
            }
            if matches!(constraint, Constraint::Check { .. }) {
                findings.push(BreakingChange {
                    table: table_diff.table.clone(),
                    object: Some(constraint.constraint_key()),
                    severity: Severity::Info,
                    reason: "check constraint added".to_string(),
                });
            }
        }

        for constraint_change in &table_diff.changed_constraints {
            if let (Constraint::PrimaryKey { columns: before, .. }, Constraint::PrimaryKey { columns: after, .. }) =
                (&constraint_change.before, &constraint_change.after)
            {
                if before != after {
                    findings.push(BreakingChange {
                        table: table_diff.table.clone(),
                        object: Some(constraint_change.key.clone()),
                        severity: Severity::Breaking,
                        reason: "primary key membership changed".to_string(),
                    });
                }
            }
        }

        for constraint in &table_diff.removed_constraints {
            findings.push(constraint_removal_finding(&table_diff.table, constraint));
        }

        for index in &table_diff.added_indexes {
            if index.unique {
                findings.push(BreakingChange {
                    table: table_diff.table.clone(),
                    object: Some(index.name.clone()),
                    severity: Severity::Breaking,
                    reason: "unique index added; existing duplicate values will reject inserts/updates"
                        .to_string(),
                });
            }
        }

        for index in &table_diff.removed_indexes {
            findings.push(BreakingChange {
                table: table_diff.table.clone(),
                object: Some(index.name.clone()),
                severity: Severity::Warning,
                reason: format!("index `{}` dropped", index.name),
            });
        }

        for option_change in &table_diff.option_changes {
            if option_change.key == "Engine" {
                findings.push(BreakingChange {
                    table: table_diff.table.clone(),
                    object: None,
                    severity: Severity::Breaking,
                    reason: format!(
                        "storage engine changes from `{}` to `{}`",
                        option_change.before.as_deref().unwrap_or("(default)"),
                        option_change.after.as_deref().unwrap_or("(default)")
                    ),
                });
            }
        }

        if let Some(comment_change) = &table_diff.comment_change {
            findings.push(BreakingChange {
                table: table_diff.table.clone(),
                object: None,
                severity: Severity::Info,
                reason: format!(
                    "table comment changes from `{}` to `{}`",
                    comment_change.before, comment_change.after
                ),
            });
        }
    }

    findings
}

fn constraint_removal_finding(table: &str, constraint: &Constraint) -> BreakingChange {
    let severity = match constraint {
        Constraint::PrimaryKey { .. } => Severity::Critical,
        Constraint::Unique { .. } => Severity::Breaking,
        Constraint::ForeignKey { .. } => Severity::Warning,
        Constraint::Check { .. } => Severity::Info,
    };
    BreakingChange {
        table: table.to_string(),
        object: None,
        severity,
        reason: format!("constraint `{}` dropped", constraint.constraint_key()),
    }
}

fn classify_column_change(table: &str, change: &smf_core::ColumnChange) -> Vec<BreakingChange> {
    let mut findings = Vec::new();
    let before = &change.before;
    let after = &change.after;

    let became_not_null = before.nullable && !after.nullable;
    if became_not_null {
        if after.default_value.is_none() {
            findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Breaking,
                reason: "column becomes NOT NULL without a default".to_string(),
            });
        } else {
            findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Breaking,
                reason: "column becomes NOT NULL".to_string(),
            });
        }
    }

    let type_changed = !before.type_normalized.eq_ignore_ascii_case(&after.type_normalized)
        || before.length != after.length;
    if type_changed {
        match compare_widening(&before.type_normalized, before.length, &after.type_normalized, after.length) {
            Widening::NarrowsRank => findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Critical,
                reason: format!("type narrows from `{}` to `{}`", before.type_raw, after.type_raw),
            }),
            Widening::NarrowsLength => findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Breaking,
                reason: format!("declared length shrinks from `{}` to `{}`", before.type_raw, after.type_raw),
            }),
            Widening::Widens => findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Info,
                reason: format!("type widens from `{}` to `{}`", before.type_raw, after.type_raw),
            }),
            Widening::Incomparable => findings.push(BreakingChange {
                table: table.to_string(),
                object: Some(change.name.clone()),
                severity: Severity::Critical,
                reason: format!(
                    "type changes across incompatible families from `{}` to `{}`",
                    before.type_raw, after.type_raw
                ),
            }),
        }
    }

    if before.generation_expression != after.generation_expression {
        findings.push(BreakingChange {
            table: table.to_string(),
            object: Some(change.name.clone()),
            severity: Severity::Breaking,
            reason: "generated column expression changed".to_string(),
        });
    }

    if before.auto_increment && !after.auto_increment {
        findings.push(BreakingChange {
            table: table.to_string(),
            object: Some(change.name.clone()),
            severity: Severity::Warning,
            reason: "AUTO_INCREMENT removed".to_string(),
        });
    }

    if before.charset != after.charset || before.collation != after.collation {
        findings.push(BreakingChange {
            table: table.to_string(),
            object: Some(change.name.clone()),
            severity: Severity::Warning,
            reason: "character set or collation changed".to_string(),
        });
    }

    if before.default_value != after.default_value && !became_not_null {
        findings.push(BreakingChange {
            table: table.to_string(),
            object: Some(change.name.clone()),
            severity: Severity::Warning,
            reason: "default value changed".to_string(),
        });
    }

    if before.comment != after.comment {
        findings.push(BreakingChange {
            table: table.to_string(),
            object: Some(change.name.clone()),
            severity: Severity::Info,
            reason: "column comment changed".to_string(),
        });
    }

    findings
}
