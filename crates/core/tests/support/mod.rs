use smf_core::{Column, Constraint, Database, Table, TableOptions};

pub fn empty_table(name: &str) -> Table {
    Table {
        name: name.to_string(),
        columns: Vec::new(),
        constraints: Vec::new(),
        indexes: Vec::new(),
        options: TableOptions::default(),
        comment: None,
    }
}

pub fn database(tables: Vec<Table>) -> Database {
    let mut db = Database::new();
    for table in tables {
        db.tables.insert(table.name.clone(), table);
    }
    db
}

pub fn column(name: &str, type_raw: &str) -> Column {
    Column::new(name, type_raw)
}

pub fn foreign_key(name: &str, columns: &[&str], referenced_table: &str, referenced_columns: &[&str]) -> Constraint {
    Constraint::ForeignKey {
        name: Some(name.to_string()),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        referenced_table: referenced_table.to_string(),
        referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
        on_delete: None,
        on_update: None,
    }
}
