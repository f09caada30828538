use smf_core::TableOptionKey;

/// Maps the closed option-key registry to the keyword MySQL's grammar uses
/// for it in a `CREATE`/`ALTER TABLE ... <options>` clause.
#[must_use]
pub fn option_keyword(key: TableOptionKey) -> &'static str {
    match key {
        TableOptionKey::Engine => "ENGINE",
        TableOptionKey::AutoIncrement => "AUTO_INCREMENT",
        TableOptionKey::AvgRowLength => "AVG_ROW_LENGTH",
        TableOptionKey::CharacterSet => "CHARACTER SET",
        TableOptionKey::Checksum => "CHECKSUM",
        TableOptionKey::Collate => "COLLATE",
        TableOptionKey::Comment => "COMMENT",
        TableOptionKey::Compression => "COMPRESSION",
        TableOptionKey::Connection => "CONNECTION",
        TableOptionKey::DataDirectory => "DATA DIRECTORY",
        TableOptionKey::DelayKeyWrite => "DELAY_KEY_WRITE",
        TableOptionKey::Encryption => "ENCRYPTION",
        TableOptionKey::IndexDirectory => "INDEX DIRECTORY",
        TableOptionKey::InsertMethod => "INSERT_METHOD",
        TableOptionKey::KeyBlockSize => "KEY_BLOCK_SIZE",
        TableOptionKey::MaxRows => "MAX_ROWS",
        TableOptionKey::MinRows => "MIN_ROWS",
        TableOptionKey::PackKeys => "PACK_KEYS",
        TableOptionKey::Password => "PASSWORD",
        TableOptionKey::RowFormat => "ROW_FORMAT",
        TableOptionKey::StatsAutoRecalc => "STATS_AUTO_RECALC",
        TableOptionKey::StatsPersistent => "STATS_PERSISTENT",
        TableOptionKey::StatsSamplePages => "STATS_SAMPLE_PAGES",
        TableOptionKey::Tablespace => "TABLESPACE",
        TableOptionKey::Union => "UNION",
    }
}

/// Recovers the SQL keyword for a [`TableOptionKey`] from its `{:?}` name
/// (how `smf_core`'s differ records it in `TableOptionChange::key`, since
/// the differ has no dependency on this dialect-specific keyword table).
#[must_use]
pub fn keyword_for_debug_name(debug_name: &str) -> &'static str {
    const ALL: &[TableOptionKey] = &[
        TableOptionKey::Engine,
        TableOptionKey::AutoIncrement,
        TableOptionKey::AvgRowLength,
        TableOptionKey::CharacterSet,
        TableOptionKey::Checksum,
        TableOptionKey::Collate,
        TableOptionKey::Comment,
        TableOptionKey::Compression,
        TableOptionKey::Connection,
        TableOptionKey::DataDirectory,
        TableOptionKey::DelayKeyWrite,
        TableOptionKey::Encryption,
        TableOptionKey::IndexDirectory,
        TableOptionKey::InsertMethod,
        TableOptionKey::KeyBlockSize,
        TableOptionKey::MaxRows,
        TableOptionKey::MinRows,
        TableOptionKey::PackKeys,
        TableOptionKey::Password,
        TableOptionKey::RowFormat,
        TableOptionKey::StatsAutoRecalc,
        TableOptionKey::StatsPersistent,
        TableOptionKey::StatsSamplePages,
        TableOptionKey::Tablespace,
        TableOptionKey::Union,
    ];
    ALL.iter()
        .find(|key| format!("{key:?}") == debug_name)
        .map(|key| option_keyword(*key))
        .unwrap_or("ENGINE")
}

/// Options whose value is a plain string literal rather than an identifier
/// or bareword in MySQL's grammar.
#[must_use]
pub fn option_takes_string_literal(key: TableOptionKey) -> bool {
    matches!(
        key,
        TableOptionKey::Comment
            | TableOptionKey::DataDirectory
            | TableOptionKey::IndexDirectory
            | TableOptionKey::Password
            | TableOptionKey::Connection
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_keyword_is_bareword_not_string() {
        assert_eq!(option_keyword(TableOptionKey::Engine), "ENGINE");
        assert!(!option_takes_string_literal(TableOptionKey::Engine));
    }

    #[test]
    fn comment_takes_string_literal() {
        assert!(option_takes_string_literal(TableOptionKey::Comment));
    }
}
