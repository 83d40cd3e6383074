use std::collections::{HashMap, HashSet};

use sheetsync_core::Table;

use crate::config::ReconConfig;
use crate::error::{MissingColumn, ReconError};

/// Result of one reconciliation pass: the net-new rows plus the counts
/// the service reports in its summary.
#[derive(Debug)]
pub struct ReconOutcome {
    /// Net-new rows: primary columns after pruning, plus the joined
    /// attribute column.
    pub table: Table,
    /// Data rows in the primary table.
    pub input_rows: usize,
    /// Primary rows whose key exists in the reference table.
    pub matched: usize,
    /// Matched rows skipped because their key already exists in the
    /// destination table.
    pub already_present: usize,
}

/// Run the fixed reconciliation shape: schema check → membership filter →
/// positional column prune → attribute join → subtract destination keys.
///
/// Join policy: if a reference key occurs more than once, the first
/// occurrence supplies the attribute value. One output row per retained
/// primary row — duplicates never fan out.
pub fn reconcile(
    primary: &Table,
    reference: &Table,
    destination: &Table,
    config: &ReconConfig,
) -> Result<ReconOutcome, ReconError> {
    // Schema validation first, collecting every missing column.
    let mut missing = Vec::new();
    let main_idx = require(primary, "primary", &config.main_key_column, &mut missing);
    let ref_key_idx = require(reference, "reference", &config.reference_key_column, &mut missing);
    let ref_attr_idx = require(
        reference,
        "reference",
        &config.reference_attribute_column,
        &mut missing,
    );
    let dest_key_idx = require(
        destination,
        "destination",
        &config.destination_key_column,
        &mut missing,
    );
    let (Some(main_idx), Some(ref_key_idx), Some(ref_attr_idx), Some(dest_key_idx)) =
        (main_idx, ref_key_idx, ref_attr_idx, dest_key_idx)
    else {
        return Err(ReconError::MissingColumns(missing));
    };

    // Reference key → attribute value, first occurrence wins.
    let mut attributes: HashMap<&str, &str> = HashMap::new();
    for row in reference.rows() {
        attributes
            .entry(row[ref_key_idx].as_str())
            .or_insert(row[ref_attr_idx].as_str());
    }

    // Membership filter, preserving primary row order.
    let retained: Vec<&Vec<String>> = primary
        .rows()
        .iter()
        .filter(|row| attributes.contains_key(row[main_idx].as_str()))
        .collect();
    let matched = retained.len();

    // Positional prune, clipped to the actual width.
    let drop_end = config.drop_range.end.min(primary.width());
    let dropped = config.drop_range.start..drop_end;
    let kept: Vec<usize> = (0..primary.width()).filter(|i| !dropped.contains(i)).collect();

    let mut columns: Vec<String> = kept.iter().map(|&i| primary.columns()[i].clone()).collect();
    // The attribute lands in an existing column of the same name if one
    // survived the prune, otherwise it is appended.
    let attr_slot = columns
        .iter()
        .position(|c| *c == config.reference_attribute_column);
    if attr_slot.is_none() {
        columns.push(config.reference_attribute_column.clone());
    }

    let dest_keys: HashSet<&str> = destination
        .rows()
        .iter()
        .map(|row| row[dest_key_idx].as_str())
        .collect();

    let mut table = Table::new(columns);
    let mut already_present = 0usize;
    for row in retained {
        let key = row[main_idx].as_str();
        if dest_keys.contains(key) {
            already_present += 1;
            continue;
        }
        let attribute = attributes.get(key).copied().unwrap_or_default();
        let mut out: Vec<String> = kept.iter().map(|&i| row[i].clone()).collect();
        match attr_slot {
            Some(slot) => out[slot] = attribute.to_string(),
            None => out.push(attribute.to_string()),
        }
        table.push_row(out);
    }

    Ok(ReconOutcome {
        table,
        input_rows: primary.len(),
        matched,
        already_present,
    })
}

fn require(
    table: &Table,
    label: &str,
    column: &str,
    missing: &mut Vec<MissingColumn>,
) -> Option<usize> {
    let idx = table.column_index(column);
    if idx.is_none() {
        missing.push(MissingColumn {
            table: label.into(),
            column: column.into(),
        });
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAIN_KEY_COLUMN, REFERENCE_KEY_COLUMN};

    fn table(cells: &[&[&str]]) -> Table {
        Table::from_values(
            cells
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Short-named schema used by most tests.
    fn test_config() -> ReconConfig {
        ReconConfig {
            main_key_column: "ID".into(),
            reference_key_column: "Ref ID".into(),
            reference_attribute_column: "Project".into(),
            destination_key_column: "ID".into(),
            drop_range: 14..21,
        }
    }

    fn primary_a123() -> Table {
        table(&[
            &["ID", "Site"],
            &["A1", "north"],
            &["A2", "south"],
            &["A3", "east"],
        ])
    }

    fn reference_a1_a3() -> Table {
        table(&[&["Ref ID", "Project"], &["A1", "P1"], &["A3", "P3"]])
    }

    #[test]
    fn net_new_row_scenario() {
        let destination = table(&[&["ID"], &["A1"]]);
        let outcome =
            reconcile(&primary_a123(), &reference_a1_a3(), &destination, &test_config()).unwrap();

        assert_eq!(outcome.input_rows, 3);
        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.already_present, 1);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.value(0, "ID"), Some("A3"));
        assert_eq!(outcome.table.value(0, "Project"), Some("P3"));
    }

    #[test]
    fn filter_is_exact_key_membership() {
        let destination = table(&[&["ID"]]);
        let primary = table(&[
            &["ID", "Site"],
            &["A1", "x"],
            &["a1", "case differs"],
            &["A1 ", "trailing space"],
            &["A9", "unmatched"],
        ]);
        let outcome = reconcile(&primary, &reference_a1_a3(), &destination, &test_config()).unwrap();

        // Exact string equality: no case folding, no cell trimming.
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.table.value(0, "Site"), Some("x"));
    }

    #[test]
    fn retained_rows_keep_primary_order() {
        let primary = table(&[
            &["ID", "Site"],
            &["A3", "first"],
            &["A2", "skip"],
            &["A1", "second"],
        ]);
        let destination = table(&[&["ID"]]);
        let outcome = reconcile(&primary, &reference_a1_a3(), &destination, &test_config()).unwrap();

        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.table.value(0, "ID"), Some("A3"));
        assert_eq!(outcome.table.value(1, "ID"), Some("A1"));
    }

    #[test]
    fn schema_error_lists_every_missing_column() {
        let primary = table(&[&["Other"], &["x"]]);
        let reference = table(&[&["Ref ID", "Name"], &["A1", "n"]]);
        let destination = table(&[&["Nope"], &["y"]]);

        let err = reconcile(&primary, &reference, &destination, &test_config()).unwrap_err();
        let ReconError::MissingColumns(missing) = err;
        let pairs: Vec<(String, String)> = missing
            .into_iter()
            .map(|m| (m.table, m.column))
            .collect();
        assert_eq!(
            pairs,
            [
                ("primary".to_string(), "ID".to_string()),
                ("reference".to_string(), "Project".to_string()),
                ("destination".to_string(), "ID".to_string()),
            ]
        );
    }

    #[test]
    fn schema_error_message_names_columns() {
        let primary = table(&[&["Other"], &["x"]]);
        let err = reconcile(&primary, &reference_a1_a3(), &table(&[&["ID"]]), &test_config())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("primary table is missing column 'ID'"), "{msg}");
    }

    #[test]
    fn drop_range_beyond_width_drops_nothing() {
        // 10 columns, drop range [14, 21): nothing to drop, no error.
        let mut header: Vec<&str> = vec!["ID"];
        let extra = ["c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"];
        header.extend(extra);
        let mut row: Vec<&str> = vec!["A1"];
        row.extend(["v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9"]);
        let primary = table(&[&header, &row]);
        let destination = table(&[&["ID"]]);

        let outcome = reconcile(&primary, &reference_a1_a3(), &destination, &test_config()).unwrap();
        // All 10 primary columns survive, plus the joined attribute.
        assert_eq!(outcome.table.width(), 11);
        assert_eq!(outcome.table.value(0, "c9"), Some("v9"));
    }

    #[test]
    fn drop_range_prunes_positional_columns() {
        let primary = table(&[
            &["ID", "keep", "drop1", "drop2", "tail"],
            &["A1", "k", "d1", "d2", "t"],
        ]);
        let destination = table(&[&["ID"]]);
        let config = ReconConfig {
            drop_range: 2..4,
            ..test_config()
        };

        let outcome = reconcile(&primary, &reference_a1_a3(), &destination, &config).unwrap();
        assert_eq!(outcome.table.columns(), ["ID", "keep", "tail", "Project"]);
        assert_eq!(outcome.table.rows()[0], ["A1", "k", "t", "P1"]);
    }

    #[test]
    fn key_captured_before_prune_still_dedups() {
        // The key column itself falls inside the drop range; dedup against
        // the destination must still use it.
        let primary = table(&[&["ID", "Site"], &["A1", "x"], &["A3", "y"]]);
        let destination = table(&[&["ID"], &["A1"]]);
        let config = ReconConfig {
            drop_range: 0..1,
            ..test_config()
        };

        let outcome = reconcile(&primary, &reference_a1_a3(), &destination, &config).unwrap();
        assert_eq!(outcome.table.columns(), ["Site", "Project"]);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.already_present, 1);
        assert_eq!(outcome.table.rows()[0], ["y", "P3"]);
    }

    #[test]
    fn duplicate_reference_keys_do_not_fan_out() {
        let reference = table(&[
            &["Ref ID", "Project"],
            &["A1", "first"],
            &["A1", "second"],
        ]);
        let primary = table(&[&["ID", "Site"], &["A1", "x"]]);
        let destination = table(&[&["ID"]]);

        let outcome = reconcile(&primary, &reference, &destination, &test_config()).unwrap();
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.value(0, "Project"), Some("first"));
    }

    #[test]
    fn existing_attribute_column_is_overwritten_not_duplicated() {
        let primary = table(&[&["ID", "Project"], &["A1", "stale"]]);
        let destination = table(&[&["ID"]]);

        let outcome =
            reconcile(&primary, &reference_a1_a3(), &destination, &test_config()).unwrap();
        assert_eq!(outcome.table.columns(), ["ID", "Project"]);
        assert_eq!(outcome.table.value(0, "Project"), Some("P1"));
    }

    #[test]
    fn everything_already_present_yields_empty_result() {
        let destination = table(&[&["ID"], &["A1"], &["A3"]]);
        let outcome =
            reconcile(&primary_a123(), &reference_a1_a3(), &destination, &test_config()).unwrap();

        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.already_present, 2);
        assert!(outcome.table.is_empty());
    }

    #[test]
    fn default_config_uses_production_column_names() {
        let config = ReconConfig::default();
        assert_eq!(config.main_key_column, MAIN_KEY_COLUMN);
        assert_eq!(config.reference_key_column, REFERENCE_KEY_COLUMN);
        assert_eq!(config.destination_key_column, MAIN_KEY_COLUMN);
        assert_eq!(config.drop_range, 14..21);
    }
}
