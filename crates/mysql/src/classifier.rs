use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// The closed set of statement shapes the executor cares about. Two-word
/// DDL forms keep their MySQL spelling (`DropTable`, not `Drop`) so the
/// classifier can tell `DROP TABLE` apart from `DROP INDEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    DropTable,
    DropDatabase,
    DropIndex,
    CreateTable,
    CreateDatabase,
    CreateIndex,
    CreateView,
    AlterTable,
    AlterDatabase,
    RenameTable,
    TruncateTable,
    Delete,
    Insert,
    Update,
    Select,
    Other,
    /// The statement didn't parse under the MySQL dialect; classified
    /// conservatively from a closed keyword prefix match instead.
    Unparseable,
}

impl StatementType {
    fn is_ddl(self) -> bool {
        matches!(
            self,
            Self::DropTable
                | Self::DropDatabase
                | Self::DropIndex
                | Self::CreateTable
                | Self::CreateDatabase
                | Self::CreateIndex
                | Self::CreateView
                | Self::AlterTable
                | Self::AlterDatabase
                | Self::RenameTable
                | Self::TruncateTable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementInfo {
    pub statement_type: StatementType,
    pub is_blocking: bool,
    pub blocking_reasons: Vec<String>,
    pub is_destructive: bool,
    pub destructive_reason: Option<String>,
    pub is_transaction_safe: bool,
    pub tx_unsafe_reason: Option<String>,
}

/// ALTER TABLE sub-clauses that take a table-level lock while running.
const BLOCKING_ALTER_CLAUSES: &[&str] = &[
    "ADD COLUMN",
    "DROP COLUMN",
    "MODIFY COLUMN",
    "CHANGE COLUMN",
    "ADD INDEX",
    "DROP INDEX",
    "ADD FOREIGN KEY",
    "DROP FOREIGN KEY",
    "DROP PRIMARY KEY",
    "RENAME",
    "FORCE",
    "ADD CONSTRAINT",
];

/// Classifies a single SQL statement per `statement_type`, blocking/
/// destructive/transaction-safety rules. Uses `sqlparser`'s MySQL dialect
/// to confirm the statement actually parses as exactly one statement
/// before trusting its leading keywords; falls back to a closed-keyword
/// prefix match on the raw text when parsing fails or yields something
/// other than one statement, erring toward `is_transaction_safe: false`
/// whenever a DDL keyword is present so a caller never wraps an
/// unrecognized statement in a transaction it can't safely roll back.
#[must_use]
pub fn classify(sql: &str) -> StatementInfo {
    let dialect = MySqlDialect {};
    match Parser::parse_sql(&dialect, sql) {
        Ok(statements) if statements.len() == 1 => {
            classify_text(&statements[0].to_string(), false)
        }
        _ => classify_text(sql, true),
    }
}

fn classify_text(sql: &str, unparseable: bool) -> StatementInfo {
    let words: Vec<String> = sql.trim_start().split_whitespace().map(str::to_ascii_uppercase).collect();
    let first = words.first().map(String::as_str).unwrap_or_default();
    let second = words.get(1).map(String::as_str).unwrap_or_default();

    let statement_type = if unparseable {
        StatementType::Unparseable
    } else {
        classify_keywords(first, second)
    };

    if unparseable {
        let detected_ddl_keyword = DDL_PREFIXES.contains(&first);
        return StatementInfo {
            statement_type,
            is_blocking: false,
            blocking_reasons: Vec::new(),
            is_destructive: false,
            destructive_reason: None,
            is_transaction_safe: !detected_ddl_keyword,
            tx_unsafe_reason: detected_ddl_keyword
                .then(|| format!("unparseable statement begins with DDL keyword `{first}`")),
        };
    }

    let upper_sql = sql.to_ascii_uppercase();
    let (is_blocking, blocking_reasons) = blocking_reasons(statement_type, &upper_sql);
    let (is_destructive, destructive_reason) = destructive_reason(statement_type, &upper_sql);
    let (is_transaction_safe, tx_unsafe_reason) = transaction_safety(statement_type);

    StatementInfo {
        statement_type,
        is_blocking,
        blocking_reasons,
        is_destructive,
        destructive_reason,
        is_transaction_safe,
        tx_unsafe_reason,
    }
}

const DDL_PREFIXES: &[&str] = &["ALTER", "CREATE", "DROP", "RENAME", "TRUNCATE"];

fn classify_keywords(first: &str, second: &str) -> StatementType {
    match (first, second) {
        ("DROP", "TABLE") => StatementType::DropTable,
        ("DROP", "DATABASE") | ("DROP", "SCHEMA") => StatementType::DropDatabase,
        ("DROP", "INDEX") => StatementType::DropIndex,
        ("CREATE", "TABLE") => StatementType::CreateTable,
        ("CREATE", "DATABASE") | ("CREATE", "SCHEMA") => StatementType::CreateDatabase,
        ("CREATE", "INDEX") | ("CREATE", "UNIQUE") => StatementType::CreateIndex,
        ("CREATE", "VIEW") => StatementType::CreateView,
        ("ALTER", "TABLE") => StatementType::AlterTable,
        ("ALTER", "DATABASE") | ("ALTER", "SCHEMA") => StatementType::AlterDatabase,
        ("RENAME", "TABLE") => StatementType::RenameTable,
        ("TRUNCATE", _) => StatementType::TruncateTable,
        ("DELETE", _) => StatementType::Delete,
        ("INSERT", _) => StatementType::Insert,
        ("UPDATE", _) => StatementType::Update,
        ("SELECT", _) => StatementType::Select,
        _ => StatementType::Other,
    }
}

fn blocking_reasons(statement_type: StatementType, upper_sql: &str) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();
    match statement_type {
        StatementType::AlterTable => {
            for clause in BLOCKING_ALTER_CLAUSES {
                if upper_sql.contains(clause) {
                    reasons.push(format!("ALTER TABLE ... {clause}"));
                }
            }
        }
        StatementType::CreateIndex | StatementType::DropIndex | StatementType::RenameTable | StatementType::TruncateTable => {
            reasons.push(format!("{statement_type:?}"));
        }
        _ => {}
    }
    (!reasons.is_empty(), reasons)
}

fn destructive_reason(statement_type: StatementType, upper_sql: &str) -> (bool, Option<String>) {
    match statement_type {
        StatementType::DropTable => (true, Some("DROP TABLE removes the table and all its data".to_string())),
        StatementType::DropDatabase => {
            (true, Some("DROP DATABASE removes every table in the database".to_string()))
        }
        StatementType::TruncateTable => (true, Some("TRUNCATE TABLE removes all rows".to_string())),
        StatementType::Delete => (true, Some("DELETE removes rows matching its WHERE clause".to_string())),
        StatementType::AlterTable if upper_sql.contains("DROP COLUMN") => {
            (true, Some("ALTER TABLE ... DROP COLUMN removes a column and its data".to_string()))
        }
        _ => (false, None),
    }
}

fn transaction_safety(statement_type: StatementType) -> (bool, Option<String>) {
    if statement_type.is_ddl() {
        (
            false,
            Some(format!("{statement_type:?} causes an implicit commit in MySQL")),
        )
    } else {
        (true, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alter_table_is_ddl_blocking_and_transaction_unsafe() {
        let info = classify("ALTER TABLE users ADD COLUMN age int");
        assert_eq!(info.statement_type, StatementType::AlterTable);
        assert!(!info.is_transaction_safe);
        assert!(info.is_blocking);
    }

    #[test]
    fn alter_table_drop_column_is_destructive() {
        let info = classify("ALTER TABLE users DROP COLUMN age");
        assert!(info.is_destructive);
    }

    #[test]
    fn update_is_transaction_safe_and_not_destructive() {
        let info = classify("UPDATE users SET age = 1 WHERE id = 1");
        assert_eq!(info.statement_type, StatementType::Update);
        assert!(info.is_transaction_safe);
        assert!(!info.is_destructive);
    }

    #[test]
    fn delete_is_destructive_but_transaction_safe() {
        let info = classify("DELETE FROM users WHERE id = 1");
        assert_eq!(info.statement_type, StatementType::Delete);
        assert!(info.is_destructive);
        assert!(info.is_transaction_safe);
    }

    #[test]
    fn insert_with_drop_table_in_a_string_literal_is_not_destructive() {
        let info = classify("INSERT INTO logs (message) VALUES ('User tried to DROP TABLE')");
        assert_eq!(info.statement_type, StatementType::Insert);
        assert!(!info.is_destructive);
    }

    #[test]
    fn unparseable_statement_falls_back_conservatively() {
        let info = classify("ALTER TABLE users ADD COLUMN ??? broken");
        assert_eq!(info.statement_type, StatementType::Unparseable);
        assert!(!info.is_transaction_safe);
    }

    #[test]
    fn unrecognized_statement_defaults_to_transaction_safe() {
        let info = classify("EXPLAIN SELECT 1");
        assert_eq!(info.statement_type, StatementType::Other);
        assert!(info.is_transaction_safe);
    }

    #[test]
    fn create_index_is_blocking() {
        let info = classify("CREATE INDEX idx_users_email ON users (email)");
        assert_eq!(info.statement_type, StatementType::CreateIndex);
        assert!(info.is_blocking);
    }
}
