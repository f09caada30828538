#[path = "support/mod.rs"]
mod support;

use smf_core::{DiffOptions, Differ, detect_renames, mark_constraint_rebuilds};
use support::{column, database, empty_table, foreign_key};

#[test]
fn rename_detector_matches_renamed_column_and_clears_add_remove() {
    let mut old_users = empty_table("users");
    old_users.columns.push(column("user_email", "varchar(255)"));
    let old = database(vec![old_users]);

    let mut new_users = empty_table("users");
    new_users.columns.push(column("email_address", "varchar(255)"));
    let new = database(vec![new_users]);

    let mut diff = Differ::default().diff(&old, &new);
    assert_eq!(diff.changed_tables.len(), 1);
    assert_eq!(diff.changed_tables[0].added_columns.len(), 1);
    assert_eq!(diff.changed_tables[0].removed_columns.len(), 1);

    detect_renames(&mut diff, DiffOptions::default());

    let table_diff = &diff.changed_tables[0];
    assert!(table_diff.added_columns.is_empty());
    assert!(table_diff.removed_columns.is_empty());
    assert_eq!(table_diff.renamed_columns.len(), 1);
    assert_eq!(table_diff.renamed_columns[0].from, "user_email");
    assert_eq!(table_diff.renamed_columns[0].to, "email_address");
}

#[test]
fn rename_detector_leaves_unrelated_add_remove_alone() {
    let mut old_users = empty_table("users");
    old_users.columns.push(column("legacy_flag", "tinyint"));
    let old = database(vec![old_users]);

    let mut new_users = empty_table("users");
    new_users.columns.push(column("signup_source", "varchar(64)"));
    let new = database(vec![new_users]);

    let mut diff = Differ::default().diff(&old, &new);
    detect_renames(&mut diff, DiffOptions::default());

    let table_diff = &diff.changed_tables[0];
    assert_eq!(table_diff.added_columns.len(), 1);
    assert_eq!(table_diff.removed_columns.len(), 1);
    assert!(table_diff.renamed_columns.is_empty());
}

#[test]
fn rebuild_marker_flags_foreign_key_referencing_retyped_column() {
    let mut old_orders = empty_table("orders");
    old_orders
        .columns
        .push(column("customer_id", "int"));
    old_orders
        .constraints
        .push(foreign_key("fk_customer", &["customer_id"], "customers", &["id"]));
    let old = database(vec![old_orders]);

    let mut new_orders = empty_table("orders");
    new_orders
        .columns
        .push(column("customer_id", "bigint"));
    new_orders
        .constraints
        .push(foreign_key("fk_customer", &["customer_id"], "customers", &["id"]));
    let new = database(vec![new_orders]);

    let mut diff = Differ::default().diff(&old, &new);
    mark_constraint_rebuilds(&mut diff, &new);

    let table_diff = &diff.changed_tables[0];
    assert_eq!(table_diff.changed_constraints.len(), 1);
    assert!(table_diff.changed_constraints[0].rebuild_required);
}
