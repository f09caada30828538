use std::collections::BTreeSet;

use crate::model::Database;

use super::types::{ConstraintChange, SchemaDiff};

/// Flags constraints whose columns were renamed or had a type/nullability
/// change as needing a drop-and-recreate instead of an in-place ALTER,
/// since MySQL's inline `CHANGE COLUMN` syntax cannot update a constraint
/// definition that references the column by its old name or old type.
///
/// Constraints already listed in `changed_constraints` are flagged in
/// place; constraints whose own definition is unchanged but which
/// reference an affected column are added with `before == after` so the
/// generator still knows to rebuild them.
pub fn mark_constraint_rebuilds(diff: &mut SchemaDiff, new: &Database) {
    for table_diff in &mut diff.changed_tables {
        let Some(table) = new.tables.get(&table_diff.table) else {
            continue;
        };

        let mut affected: BTreeSet<String> = BTreeSet::new();
        for change in &table_diff.changed_columns {
            affected.insert(change.name.to_ascii_lowercase());
        }
        for rename in &table_diff.renamed_columns {
            affected.insert(rename.to.to_ascii_lowercase());
        }
        if affected.is_empty() {
            continue;
        }

        let mut flagged_keys: BTreeSet<String> = BTreeSet::new();
        for change in &mut table_diff.changed_constraints {
            if constraint_touches(&change.after, &affected) {
                change.rebuild_required = true;
                flagged_keys.insert(change.key.clone());
            }
        }

        for constraint in &table.constraints {
            let key = constraint.constraint_key();
            if flagged_keys.contains(&key) {
                continue;
            }
            if table_diff
                .changed_constraints
                .iter()
                .any(|change| change.key == key)
            {
                continue;
            }
            if constraint_touches(constraint, &affected) {
                table_diff.changed_constraints.push(ConstraintChange {
                    key,
                    before: constraint.clone(),
                    after: constraint.clone(),
                    rebuild_required: true,
                });
            }
        }

        table_diff.changed_constraints.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

fn constraint_touches(constraint: &crate::model::Constraint, affected: &BTreeSet<String>) -> bool {
    constraint
        .columns()
        .iter()
        .any(|column| affected.contains(&column.to_ascii_lowercase()))
}
