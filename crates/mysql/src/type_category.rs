use std::sync::OnceLock;

/// A family of related MySQL column types that can be ranked by capacity,
/// used to decide whether a type change is a safe widening, a potentially
/// lossy narrowing, or a change across families (always breaking).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Text,
    Binary,
    Other,
}

/// Lower rank is a narrower (smaller-capacity) type within its category.
const INTEGER_RANKS: &[&str] = &["tinyint", "smallint", "mediumint", "int", "integer", "bigint"];
const FLOAT_RANKS: &[&str] = &["float", "double", "decimal", "numeric"];
const TEXT_RANKS: &[&str] = &["char", "varchar", "tinytext", "text", "mediumtext", "longtext"];
const BINARY_RANKS: &[&str] = &["binary", "varbinary", "tinyblob", "blob", "mediumblob", "longblob"];

#[must_use]
pub fn categorize(type_normalized: &str) -> TypeCategory {
    if INTEGER_RANKS.contains(&type_normalized) {
        TypeCategory::Integer
    } else if FLOAT_RANKS.contains(&type_normalized) {
        TypeCategory::Float
    } else if TEXT_RANKS.contains(&type_normalized) {
        TypeCategory::Text
    } else if BINARY_RANKS.contains(&type_normalized) {
        TypeCategory::Binary
    } else {
        TypeCategory::Other
    }
}

fn rank(type_normalized: &str) -> Option<(TypeCategory, usize)> {
    let category = categorize(type_normalized);
    let table = match category {
        TypeCategory::Integer => INTEGER_RANKS,
        TypeCategory::Float => FLOAT_RANKS,
        TypeCategory::Text => TEXT_RANKS,
        TypeCategory::Binary => BINARY_RANKS,
        TypeCategory::Other => return None,
    };
    table
        .iter()
        .position(|candidate| *candidate == type_normalized)
        .map(|index| (category, index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widening {
    /// Same category, new rank >= old rank (and, for text/binary, new
    /// length >= old length when both are known).
    Widens,
    /// Same category, new rank < old rank (e.g. `bigint` -> `smallint`):
    /// values that fit the old type can silently overflow the new one.
    NarrowsRank,
    /// Same category and rank, shorter declared length (e.g.
    /// `varchar(255)` -> `varchar(32)`): values can be truncated but the
    /// type family itself hasn't changed.
    NarrowsLength,
    /// Different categories entirely, or one side unrecognized.
    Incomparable,
}

/// Compares an old/new type pair, taking declared VARCHAR-style lengths
/// into account when both types are in the same rank family.
#[must_use]
pub fn compare_widening(
    before_type: &str,
    before_length: Option<u64>,
    after_type: &str,
    after_length: Option<u64>,
) -> Widening {
    let (Some((before_category, before_rank)), Some((after_category, after_rank))) =
        (rank(before_type), rank(after_type))
    else {
        return Widening::Incomparable;
    };
    if before_category != after_category {
        return Widening::Incomparable;
    }
    match before_rank.cmp(&after_rank) {
        std::cmp::Ordering::Less => Widening::Widens,
        std::cmp::Ordering::Greater => Widening::NarrowsRank,
        std::cmp::Ordering::Equal => match (before_length, after_length) {
            (Some(before), Some(after)) if after < before => Widening::NarrowsLength,
            (Some(before), Some(after)) if after > before => Widening::Widens,
            _ => Widening::Widens,
        },
    }
}

/// Extracts `(base, length)` from a raw type string such as
/// `"varchar(255)"`, used by the breaking-change analyzer when it only has
/// the raw text and not an already-normalized `Column`.
#[must_use]
pub fn extract_base_and_length(type_raw: &str) -> (String, Option<u64>) {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| regex::Regex::new(r"^([A-Za-z_]+)\s*\(\s*(\d+)\s*\)$").expect("fixed pattern"));
    match pattern.captures(type_raw.trim()) {
        Some(captures) => (
            captures[1].to_ascii_lowercase(),
            captures[2].parse::<u64>().ok(),
        ),
        None => (type_raw.trim().to_ascii_lowercase(), None),
    }
}
