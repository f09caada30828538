use std::collections::BTreeSet;

/// One entry in a [`Migration`] plan. A closed, tagged variant rather than a
/// flat record: `Sql` carries a reversible statement pair, `Note`/`Breaking`
/// carry a message, and `Unresolved` marks a change the generator refused to
/// render rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Sql {
        table: String,
        up_sql: String,
        down_sql: String,
        /// Severity the generator attached to this statement, if any; used
        /// by external formatters to annotate risky statements.
        risk: Option<Severity>,
        /// Set when this statement may acquire table-level locks while
        /// running (`ALTER TABLE`, `CREATE INDEX`, `DROP INDEX`).
        requires_lock: bool,
    },
    Note {
        table: Option<String>,
        message: String,
    },
    Breaking {
        table: Option<String>,
        message: String,
    },
    Unresolved {
        table: Option<String>,
        reason: String,
    },
}

impl Operation {
    #[must_use]
    pub fn sql(table: impl Into<String>, up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        Self::Sql {
            table: table.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
            risk: None,
            requires_lock: false,
        }
    }

    #[must_use]
    pub fn with_risk(mut self, severity: Severity) -> Self {
        if let Self::Sql { risk, .. } = &mut self {
            *risk = Some(severity);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Breaking,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingChange {
    pub table: String,
    /// The column, constraint, or index the finding is about; `None` for a
    /// table-level finding (e.g. a dropped table).
    pub object: Option<String>,
    pub severity: Severity,
    pub reason: String,
}

/// An ordered, deduplicated collection of [`Operation`]s: the output of the
/// MySQL generator and the input to whatever external formatter or
/// executor a caller wires up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Migration {
    operations: Vec<Operation>,
}

impl Migration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Applies the dedup policy in this fixed order: drop `Sql` operations
    /// whose `up_sql` and `down_sql` are both empty; clear (not remove) a
    /// `Sql` operation's `down_sql` when an earlier operation already
    /// emitted that exact rollback; drop exact-message duplicates of
    /// `Note`/`Breaking`/`Unresolved`. The first occurrence of anything kept
    /// stays in its original position.
    pub fn dedupe(&mut self) {
        self.operations.retain(|operation| match operation {
            Operation::Sql { up_sql, down_sql, .. } => {
                !(up_sql.trim().is_empty() && down_sql.trim().is_empty())
            }
            _ => true,
        });

        let mut seen_down_sql: BTreeSet<String> = BTreeSet::new();
        for operation in &mut self.operations {
            if let Operation::Sql { down_sql, .. } = operation {
                let trimmed = down_sql.trim().to_string();
                if trimmed.is_empty() {
                    continue;
                }
                if seen_down_sql.contains(&trimmed) {
                    down_sql.clear();
                } else {
                    seen_down_sql.insert(trimmed);
                }
            }
        }

        let mut seen_messages: BTreeSet<(u8, Option<String>, String)> = BTreeSet::new();
        self.operations.retain(|operation| match operation {
            Operation::Note { table, message } => {
                seen_messages.insert((0, table.clone(), message.clone()))
            }
            Operation::Breaking { table, message } => {
                seen_messages.insert((1, table.clone(), message.clone()))
            }
            Operation::Unresolved { table, reason } => {
                seen_messages.insert((2, table.clone(), reason.clone()))
            }
            Operation::Sql { .. } => true,
        });
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut [Operation] {
        &mut self.operations
    }

    #[must_use]
    pub fn up_statements(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::Sql { up_sql, .. } if !up_sql.trim().is_empty() => Some(up_sql.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn down_statements(&self) -> Vec<&str> {
        self.operations
            .iter()
            .rev()
            .filter_map(|operation| match operation {
                Operation::Sql { down_sql, .. } if !down_sql.trim().is_empty() => {
                    Some(down_sql.as_str())
                }
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn breaking_notes(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::Breaking { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn info_notes(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::Note { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn unresolved_notes(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::Unresolved { reason, .. } => Some(reason.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.operations.iter().any(|operation| match operation {
            Operation::Sql { up_sql, down_sql, .. } => {
                !up_sql.trim().is_empty() || !down_sql.trim().is_empty()
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_drops_empty_sql_operations() {
        let mut migration = Migration::new();
        migration.push(Operation::sql("users", "", ""));
        migration.push(Operation::sql("users", "ALTER TABLE users ADD COLUMN a int", "undo a"));
        migration.dedupe();
        assert_eq!(migration.operations().len(), 1);
    }

    #[test]
    fn dedupe_clears_duplicate_down_sql_but_keeps_the_operation() {
        let mut migration = Migration::new();
        migration.push(Operation::sql("users", "up one", "shared undo"));
        migration.push(Operation::sql("users", "up two", "shared undo"));
        migration.dedupe();
        assert_eq!(migration.operations().len(), 2);
        let Operation::Sql { down_sql, .. } = &migration.operations()[1] else {
            panic!("expected a Sql operation");
        };
        assert!(down_sql.is_empty());
    }

    #[test]
    fn dedupe_drops_duplicate_notes_keeping_first_occurrence() {
        let mut migration = Migration::new();
        migration.push(Operation::Note {
            table: Some("users".to_string()),
            message: "ignoring unknown option".to_string(),
        });
        migration.push(Operation::Note {
            table: Some("users".to_string()),
            message: "ignoring unknown option".to_string(),
        });
        migration.dedupe();
        assert_eq!(migration.info_notes().len(), 1);
    }

    #[test]
    fn down_statements_are_reverse_order() {
        let mut migration = Migration::new();
        migration.push(Operation::sql("users", "one", "undo one"));
        migration.push(Operation::sql("users", "two", "undo two"));
        assert_eq!(migration.down_statements(), vec!["undo two", "undo one"]);
    }

    #[test]
    fn is_empty_ignores_notes() {
        let mut migration = Migration::new();
        migration.push(Operation::Note {
            table: None,
            message: "just a note".to_string(),
        });
        assert!(migration.is_empty());
    }
}
