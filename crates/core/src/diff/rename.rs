use std::collections::BTreeSet;

use crate::model::Column;

use super::engine::DiffOptions;
use super::types::{ColumnRename, SchemaDiff};

/// Converts matching remove+add column pairs inside each [`super::types::TableDiff`]
/// into [`ColumnRename`] entries, removing the matched columns from
/// `added_columns`/`removed_columns`. Greedy, first-come-first-served over
/// the removed columns in their existing (sorted-by-name) order, so the
/// result is deterministic regardless of match order.
pub fn detect_renames(diff: &mut SchemaDiff, options: DiffOptions) {
    for table_diff in &mut diff.changed_tables {
        let mut claimed_added: BTreeSet<String> = BTreeSet::new();
        let mut renames = Vec::new();

        let removed = std::mem::take(&mut table_diff.removed_columns);
        let mut still_removed = Vec::new();

        for before in removed {
            let candidate = table_diff
                .added_columns
                .iter()
                .filter(|after| !claimed_added.contains(&after.name))
                .filter_map(|after| score_pair(&before, after).map(|score| (score, after.clone())))
                .filter(|(score, _)| *score >= options.rename_score_threshold)
                .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.name.cmp(&a.1.name)));

            match candidate {
                Some((score, after)) => {
                    claimed_added.insert(after.name.clone());
                    renames.push(ColumnRename {
                        from: before.name.clone(),
                        to: after.name.clone(),
                        before,
                        after,
                        score,
                    });
                }
                None => still_removed.push(before),
            }
        }

        table_diff.removed_columns = still_removed;
        table_diff
            .added_columns
            .retain(|column| !claimed_added.contains(&column.name));
        renames.sort_by(|a, b| a.from.cmp(&b.from));
        table_diff.renamed_columns = renames;
    }
}

/// Scores a candidate rename pair, returning `None` when the pair fails a
/// hard requirement (type mismatch, no supporting evidence) regardless of
/// score.
fn score_pair(before: &Column, after: &Column) -> Option<u32> {
    if !before.type_raw.eq_ignore_ascii_case(&after.type_raw) {
        return None;
    }

    let before_tokens = tokenize(&before.name);
    let after_tokens = tokenize(&after.name);
    let shared_token = before_tokens.intersection(&after_tokens).next().is_some();
    let same_comment = non_empty_eq(&before.comment, &after.comment);
    let same_generation =
        non_empty_eq(&before.generation_expression, &after.generation_expression);

    if !(shared_token || same_comment || same_generation) {
        return None;
    }

    let mut score = 4; // type_raw already confirmed equal above
    if before.type_normalized == after.type_normalized {
        score += 2;
    }
    if before.nullable == after.nullable {
        score += 1;
    }
    if before.auto_increment == after.auto_increment {
        score += 1;
    }
    if before.charset == after.charset {
        score += 1;
    }
    if before.collation == after.collation {
        score += 1;
    }
    if before.default_value == after.default_value {
        score += 1;
    }
    if same_comment {
        score += 1;
    }
    if same_generation {
        score += 1;
    }
    if shared_token {
        score += before_tokens.intersection(&after_tokens).count() as u32;
    }

    Some(score)
}

fn non_empty_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

/// Splits an identifier into lowercase alphanumeric tokens of at least 3
/// characters, e.g. `"user_email_addr"` -> `{"user", "email", "addr"}`.
fn tokenize(name: &str) -> BTreeSet<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .map(str::to_ascii_lowercase)
        .filter(|token| token.len() >= 3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, type_raw: &str) -> Column {
        Column::new(name, type_raw)
    }

    #[test]
    fn tokenize_splits_on_non_alphanumeric_and_drops_short_tokens() {
        let tokens = tokenize("user_email_addr");
        assert_eq!(
            tokens,
            ["user", "email", "addr"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn type_mismatch_never_scores() {
        let before = column("email", "varchar(255)");
        let after = column("email_address", "int");
        assert_eq!(score_pair(&before, &after), None);
    }

    #[test]
    fn shared_token_with_matching_type_scores_above_threshold() {
        let before = column("user_email", "varchar(255)");
        let after = column("email_address", "varchar(255)");
        let score = score_pair(&before, &after).expect("shares token `email`");
        assert!(score >= 12, "score {score} should clear the threshold");
    }

    #[test]
    fn no_evidence_does_not_score() {
        let before = column("abc", "int");
        let after = column("xyz", "int");
        assert_eq!(score_pair(&before, &after), None);
    }
}
