use std::fmt::Write as _;

use smf_core::Column;

use crate::quoting::{format_value, quote_ident, quote_string};

/// Base types that can legitimately carry `CHARACTER SET`/`COLLATE`. `json`,
/// `binary`, and `varbinary` never do, even if a schema carries a stray
/// `charset`/`collation` value for one (e.g. copied from a sibling column).
const CHARSET_ELIGIBLE_TYPES: &[&str] =
    &["char", "varchar", "tinytext", "text", "mediumtext", "longtext", "enum", "set"];

/// Strips the redundant trailing `BINARY` attribute MySQL reports on
/// `BINARY`/`VARBINARY` columns (e.g. `"binary(16) binary"`): the base type
/// already implies it, so re-emitting it is a no-op at best and a syntax
/// error in some MySQL versions at worst.
#[must_use]
fn effective_type(column: &Column) -> String {
    let raw = column.type_raw.trim();
    let lower = raw.to_ascii_lowercase();
    if (lower.starts_with("binary") || lower.starts_with("varbinary")) && lower.ends_with(" binary") {
        return raw[..raw.len() - " binary".len()].trim_end().to_string();
    }
    raw.to_string()
}

/// Renders a column definition under its own name. See
/// [`render_column_definition_named`] for the rendering order.
#[must_use]
pub fn render_column_definition(column: &Column) -> String {
    render_column_definition_named(&column.name, column)
}

/// Renders a column definition under an explicit name, used both for a
/// plain `ADD COLUMN`/`MODIFY COLUMN` and for `CHANGE COLUMN <old> <new-def>`
/// where the rendered name differs from `column.name`... the caller passes
/// `column.name` directly in that case since `column` already is the target.
///
/// Fixed rendering order: name, effective type, generation expression,
/// nullability, `AUTO_INCREMENT`, `AUTO_RANDOM(n)`, `CHARACTER SET`/`COLLATE`
/// (gated by base type), `DEFAULT`, `ON UPDATE`, `COLUMN_FORMAT`, `STORAGE`,
/// `COMMENT`.
#[must_use]
pub fn render_column_definition_named(name: &str, column: &Column) -> String {
    let mut sql = String::new();
    write!(sql, "{} {}", quote_ident(name), effective_type(column))
        .expect("writing to String should not fail");

    if let Some(expression) = &column.generation_expression {
        write!(
            sql,
            " GENERATED ALWAYS AS ({expression}) {}",
            if column.generated_stored { "STORED" } else { "VIRTUAL" }
        )
        .expect("writing to String should not fail");
    }

    sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });

    if column.auto_increment {
        sql.push_str(" AUTO_INCREMENT");
    }

    if column.auto_random > 0 {
        write!(sql, " AUTO_RANDOM({})", column.auto_random).expect("writing to String should not fail");
    }

    if CHARSET_ELIGIBLE_TYPES.contains(&column.type_normalized.as_str()) {
        if let Some(charset) = &column.charset {
            write!(sql, " CHARACTER SET {charset}").expect("writing to String should not fail");
        }
        if let Some(collation) = &column.collation {
            write!(sql, " COLLATE {collation}").expect("writing to String should not fail");
        }
    }

    if let Some(default) = &column.default_value {
        write!(sql, " DEFAULT {}", format_value(default)).expect("writing to String should not fail");
    }

    if let Some(on_update) = &column.on_update {
        write!(sql, " ON UPDATE {}", format_value(on_update)).expect("writing to String should not fail");
    }

    if let Some(column_format) = &column.column_format {
        write!(sql, " COLUMN_FORMAT {column_format}").expect("writing to String should not fail");
    }

    if let Some(storage) = &column.storage {
        write!(sql, " STORAGE {storage}").expect("writing to String should not fail");
    }

    if let Some(comment) = &column.comment {
        write!(sql, " COMMENT {}", quote_string(comment)).expect("writing to String should not fail");
    }

    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_not_null_and_auto_increment_in_order() {
        let mut column = Column::new("id", "bigint");
        column.nullable = false;
        column.auto_increment = true;
        assert_eq!(
            render_column_definition(&column),
            "`id` bigint NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn renders_generated_column() {
        let mut column = Column::new("full_name", "varchar(255)");
        column.generation_expression = Some("concat(first, ' ', last)".to_string());
        column.generated_stored = true;
        assert_eq!(
            render_column_definition(&column),
            "`full_name` varchar(255) GENERATED ALWAYS AS (concat(first, ' ', last)) STORED NULL"
        );
    }

    #[test]
    fn renders_charset_and_collate_for_text_types() {
        let mut column = Column::new("name", "varchar(255)");
        column.nullable = false;
        column.charset = Some("utf8mb4".to_string());
        column.collation = Some("utf8mb4_unicode_ci".to_string());
        assert_eq!(
            render_column_definition(&column),
            "`name` varchar(255) NOT NULL CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
    }

    #[test]
    fn never_renders_charset_for_json_even_with_a_stray_charset_value() {
        let mut column = Column::new("payload", "json");
        column.charset = Some("binary".to_string());
        assert_eq!(render_column_definition(&column), "`payload` json NULL");
    }

    #[test]
    fn strips_redundant_binary_attribute_from_binary_type() {
        let column = Column::new("token", "binary(16) binary");
        assert_eq!(render_column_definition(&column), "`token` binary(16) NULL");
    }

    #[test]
    fn renders_auto_random_column_format_and_storage() {
        let mut column = Column::new("id", "bigint");
        column.nullable = false;
        column.auto_random = 5;
        column.column_format = Some("COMPACT".to_string());
        column.storage = Some("DISK".to_string());
        assert_eq!(
            render_column_definition(&column),
            "`id` bigint NOT NULL AUTO_RANDOM(5) COLUMN_FORMAT COMPACT STORAGE DISK"
        );
    }

    #[test]
    fn change_column_renders_under_the_new_name() {
        let mut column = Column::new("user_id", "int");
        column.nullable = false;
        assert_eq!(
            render_column_definition_named("user_id", &column),
            "`user_id` int NOT NULL"
        );
    }
}
